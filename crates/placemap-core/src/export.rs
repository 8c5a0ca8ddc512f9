//! Final-output shaping: optional field/item stripping, viewport
//! attachment, and spreadsheet-style CSV rows.
//!
//! Export works on `serde_json::Value` rather than the typed model because
//! field *omission* is the point here — the typed [`Document`] guarantees
//! every field is present, which is exactly what `remove_empty_fields`
//! needs to undo.

use serde_json::{Map, Value};

use crate::document::Document;
use crate::normalize::{clean_tags, clean_text};
use crate::viewport::ViewportConfig;

/// UTF-8 byte-order mark. Spreadsheet apps need it to detect the encoding.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Produces the exportable JSON document.
///
/// Each item's string and tag fields are re-cleaned. With
/// `remove_empty_fields` set, any field whose cleaned value is an empty
/// string or empty list is omitted from that item (the decision is
/// per-field). With `remove_zero_coord_items` set, items still at the
/// `(0, 0)` sentinel are dropped entirely. Items reduced to empty objects
/// are dropped. Metadata and filters pass through unchanged.
#[must_use]
pub fn prepare_export(
    doc: &Document,
    remove_empty_fields: bool,
    remove_zero_coord_items: bool,
) -> Value {
    let mut root = match serde_json::to_value(doc) {
        Ok(Value::Object(map)) => map,
        // Document always serializes to an object; treat anything else as
        // an empty export rather than failing.
        _ => Map::new(),
    };

    let items = match root.remove("data") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    let mut exported = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(fields) = item else { continue };

        if remove_zero_coord_items && is_zero_center(&fields) {
            continue;
        }

        let mut cleaned = Map::new();
        for (key, value) in fields {
            let value = clean_field(&key, value);
            if remove_empty_fields && is_empty_value(&value) {
                continue;
            }
            cleaned.insert(key, value);
        }

        if !cleaned.is_empty() {
            exported.push(Value::Object(cleaned));
        }
    }

    root.insert("data".to_string(), Value::Array(exported));
    Value::Object(root)
}

/// Attaches computed viewport framing (`center`, `zoom`) to an exported
/// document, the shape the map front end loads directly.
#[must_use]
pub fn attach_viewport(mut exported: Value, viewport: &ViewportConfig) -> Value {
    if let Value::Object(root) = &mut exported {
        root.insert(
            "center".to_string(),
            serde_json::json!({ "lat": viewport.center.lat, "lng": viewport.center.lng }),
        );
        root.insert("zoom".to_string(), serde_json::json!(viewport.zoom));
    }
    exported
}

/// Serializes the document's items as CSV, one row per item, tags joined
/// with `", "`. The output starts with a UTF-8 BOM so spreadsheet imports
/// pick the right encoding.
///
/// # Errors
///
/// Returns `csv::Error` if a record fails to serialize (not expected for
/// plain string/number fields).
pub fn to_csv(doc: &Document) -> Result<Vec<u8>, csv::Error> {
    let mut out = Vec::from(UTF8_BOM);
    {
        let mut writer = csv::Writer::from_writer(&mut out);
        writer.write_record([
            "name", "address", "phone", "webName", "webLink", "intro", "tags", "lat", "lng",
        ])?;
        for item in &doc.data {
            writer.write_record([
                item.name.as_str(),
                item.address.as_str(),
                item.phone.as_str(),
                item.web_name.as_str(),
                item.web_link.as_str(),
                item.intro.as_str(),
                &item.tags.join(", "),
                &item.center.lat.to_string(),
                &item.center.lng.to_string(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(out)
}

fn clean_field(key: &str, value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(clean_text(&s)),
        Value::Array(entries) if key == "tags" => {
            let tags: Vec<String> = entries
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect();
            Value::Array(clean_tags(&tags).into_iter().map(Value::String).collect())
        }
        other => other,
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Array(entries) => entries.is_empty(),
        _ => false,
    }
}

fn is_zero_center(fields: &Map<String, Value>) -> bool {
    let lat = fields
        .get("center")
        .and_then(|c| c.get("lat"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let lng = fields
        .get("center")
        .and_then(|c| c.get("lng"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    lat == 0.0 && lng == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{GeoPoint, LocationItem};
    use crate::viewport::default_viewport;

    fn sample_doc() -> Document {
        Document {
            name: "Map".to_string(),
            data: vec![
                LocationItem {
                    name: "Cafe A".to_string(),
                    address: "1 Main St".to_string(),
                    tags: vec!["coffee".to_string()],
                    center: GeoPoint::new(31.2, 121.5),
                    ..LocationItem::default()
                },
                LocationItem {
                    name: "Cafe B".to_string(),
                    ..LocationItem::default()
                },
            ],
            ..Document::default()
        }
    }

    #[test]
    fn prepare_export_keeps_all_fields_by_default() {
        let exported = prepare_export(&sample_doc(), false, false);
        let item = &exported["data"][1];
        assert_eq!(item["phone"], "");
        assert!(item.get("center").is_some());
    }

    #[test]
    fn prepare_export_drops_empty_fields_per_field() {
        let exported = prepare_export(&sample_doc(), true, false);
        let item = &exported["data"][1];
        assert!(item.get("phone").is_none());
        assert!(item.get("tags").is_none());
        assert_eq!(item["name"], "Cafe B");
    }

    #[test]
    fn prepare_export_drops_zero_coordinate_items() {
        let exported = prepare_export(&sample_doc(), false, true);
        let data = exported["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "Cafe A");
    }

    #[test]
    fn prepare_export_recleans_string_fields() {
        let mut doc = sample_doc();
        // Simulate a historical value that predates normalization-on-write.
        doc.data[0].intro = " spaced   out ".to_string();
        let exported = prepare_export(&doc, false, false);
        assert_eq!(exported["data"][0]["intro"], "spaced out");
    }

    #[test]
    fn prepare_export_passes_metadata_through() {
        let exported = prepare_export(&sample_doc(), true, true);
        assert_eq!(exported["name"], "Map");
        assert!(exported.get("filter").is_some());
    }

    #[test]
    fn attach_viewport_adds_center_and_zoom() {
        let doc = sample_doc();
        let exported = attach_viewport(
            prepare_export(&doc, false, false),
            &default_viewport(&doc),
        );
        assert!((exported["center"]["lat"].as_f64().unwrap() - 31.2).abs() < 1e-9);
        assert_eq!(exported["zoom"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn to_csv_starts_with_bom_and_joins_tags() {
        let mut doc = sample_doc();
        doc.data[0].tags = vec!["coffee".to_string(), "wifi".to_string()];
        let bytes = to_csv(&doc).unwrap();
        assert!(bytes.starts_with(b"\xef\xbb\xbf"));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("name,address"));
        assert!(text.contains("\"coffee, wifi\""));
        assert!(text.contains("31.2"));
    }
}
