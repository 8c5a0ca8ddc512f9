//! JSON syntax and document structure validation.
//!
//! Validation is fail-fast with a precise pointer: the first violation found
//! is returned, never an aggregate report. The interactive edit-fix-retry
//! workflow surfaces one actionable message at a time.
//!
//! This is the strict commit boundary. Normalization elsewhere stays
//! lenient so historical OCR/AI output already committed is never lost.

use serde_json::Value;

use crate::document::{Document, LocationItem};
use crate::error::ValidationError;
use crate::normalize::validate_url;

/// Parses raw text as JSON, embedding the parser's own error (position and
/// reason) in the failure so users can locate the syntax problem.
///
/// # Errors
///
/// Returns [`ValidationError::Syntax`] when the text is not valid JSON.
pub fn parse_json(raw: &str) -> Result<Value, ValidationError> {
    serde_json::from_str(raw).map_err(|e| ValidationError::Syntax(e.to_string()))
}

/// Checks that a parsed JSON value has the expected document shape.
///
/// Short-circuits on the first violation: missing top-level fields, a
/// malformed `filter`, a non-array `data`, or a malformed item (missing
/// `name`, non-numeric coordinates, non-array `tags`, or an invalid
/// non-empty `webLink`).
///
/// # Errors
///
/// Returns [`ValidationError::Structure`] describing the first violation.
pub fn validate_structure(value: &Value) -> Result<(), ValidationError> {
    let structure = |msg: String| Err(ValidationError::Structure(msg));

    let Some(root) = value.as_object() else {
        return structure("document must be a JSON object".to_string());
    };

    for field in ["name", "description", "origin", "filter", "data"] {
        if !root.contains_key(field) {
            return structure(format!("missing required field: {field}"));
        }
    }

    let filter = &root["filter"];
    let Some(filter) = filter.as_object() else {
        return structure("filter must be an object".to_string());
    };
    if !filter.contains_key("inclusive") || !filter.contains_key("exclusive") {
        return structure("filter must contain inclusive and exclusive".to_string());
    }
    if !filter["inclusive"].is_object() || !filter["exclusive"].is_object() {
        return structure("filter.inclusive and filter.exclusive must be objects".to_string());
    }

    let Some(data) = root["data"].as_array() else {
        return structure("data must be an array".to_string());
    };

    for (i, item) in data.iter().enumerate() {
        let n = i + 1;
        let Some(item) = item.as_object() else {
            return structure(format!("item {n} must be an object"));
        };
        if !item.contains_key("name") {
            return structure(format!("item {n} is missing the required name field"));
        }
        if let Some(center) = item.get("center") {
            let Some(center) = center.as_object() else {
                return structure(format!("item {n}: center must be an object"));
            };
            for axis in ["lat", "lng"] {
                if let Some(v) = center.get(axis) {
                    if !v.is_number() {
                        return structure(format!("item {n}: center.{axis} must be a number"));
                    }
                }
            }
        }
        if let Some(tags) = item.get("tags") {
            if !tags.is_array() {
                return structure(format!("item {n}: tags must be an array"));
            }
        }
        if let Some(link) = item.get("webLink").and_then(Value::as_str) {
            if !link.is_empty() {
                if let Err(url_error) = validate_url(link) {
                    return structure(format!("item {n}: invalid webLink: {url_error}"));
                }
            }
        }
    }

    Ok(())
}

/// Per-item commit check, aggregating every problem found.
///
/// Unlike [`validate_structure`] this reports all violations at once,
/// because it backs a form where the user fixes one item in place.
///
/// # Errors
///
/// Returns the list of violations: empty name, malformed link, or
/// out-of-range coordinates.
pub fn validate_item(item: &LocationItem) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if item.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if let Err(url_error) = validate_url(&item.web_link) {
        errors.push(format!("invalid web link: {url_error}"));
    }
    if !(-90.0..=90.0).contains(&item.center.lat) {
        errors.push("latitude must be between -90 and 90".to_string());
    }
    if !(-180.0..=180.0).contains(&item.center.lng) {
        errors.push("longitude must be between -180 and 180".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parses an import payload into a [`Document`].
///
/// Accepts a full document, a bare `{"data": [...]}`, or a bare array
/// (treated as the `data` list). Missing top-level metadata fields are
/// filled with empty defaults before structural validation, so partial
/// imports pass as long as the items themselves are well-formed.
///
/// # Errors
///
/// [`ValidationError::Syntax`] for malformed JSON,
/// [`ValidationError::Structure`] for a shape violation.
pub fn import_document(raw: &str) -> Result<Document, ValidationError> {
    let parsed = parse_json(raw)?;

    let coerced = match parsed {
        Value::Array(items) => serde_json::json!({ "data": items }),
        other => other,
    };

    let mut root = match coerced {
        Value::Object(map) => map,
        _ => return Err(ValidationError::Structure(
            "document must be a JSON object or array".to_string(),
        )),
    };

    for field in ["name", "description", "origin"] {
        root.entry(field).or_insert_with(|| Value::String(String::new()));
    }
    root.entry("filter")
        .or_insert_with(|| serde_json::json!({ "inclusive": {}, "exclusive": {} }));
    root.entry("data").or_insert_with(|| Value::Array(Vec::new()));

    let value = Value::Object(root);
    validate_structure(&value)?;

    serde_json::from_value(value).map_err(|e| ValidationError::Structure(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::GeoPoint;

    fn valid_doc_json() -> Value {
        serde_json::json!({
            "name": "Map", "description": "", "origin": "",
            "filter": {"inclusive": {}, "exclusive": {}},
            "data": [
                {"name": "Cafe A", "address": "1 Main St",
                 "tags": ["coffee"], "center": {"lat": 31.2, "lng": 121.5}}
            ]
        })
    }

    // -----------------------------------------------------------------------
    // parse_json
    // -----------------------------------------------------------------------

    #[test]
    fn parse_json_embeds_parser_error() {
        let err = parse_json("{\"name\": }").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("column"), "expected parser detail, got: {message}");
    }

    // -----------------------------------------------------------------------
    // validate_structure
    // -----------------------------------------------------------------------

    #[test]
    fn validate_structure_accepts_valid_document() {
        assert!(validate_structure(&valid_doc_json()).is_ok());
    }

    #[test]
    fn validate_structure_reports_first_missing_field() {
        // `data` is missing alongside other defects; the message must still
        // name the first violation in field order.
        let value = serde_json::json!({"name": "x", "description": "", "origin": ""});
        let err = validate_structure(&value).unwrap_err();
        assert!(err.to_string().contains("filter"));

        let mut value = valid_doc_json();
        value.as_object_mut().unwrap().remove("data");
        let err = validate_structure(&value).unwrap_err();
        assert!(err.to_string().contains("data"));
    }

    #[test]
    fn validate_structure_rejects_filter_without_sides() {
        let mut value = valid_doc_json();
        value["filter"] = serde_json::json!({"inclusive": {}});
        let err = validate_structure(&value).unwrap_err();
        assert!(err.to_string().contains("exclusive"));
    }

    #[test]
    fn validate_structure_rejects_non_numeric_coordinates() {
        let mut value = valid_doc_json();
        value["data"][0]["center"]["lat"] = Value::String("31.2".to_string());
        let err = validate_structure(&value).unwrap_err();
        assert!(err.to_string().contains("center.lat"));
    }

    #[test]
    fn validate_structure_rejects_item_without_name() {
        let mut value = valid_doc_json();
        value["data"][0].as_object_mut().unwrap().remove("name");
        let err = validate_structure(&value).unwrap_err();
        assert!(err.to_string().contains("item 1"));
    }

    #[test]
    fn validate_structure_rejects_bad_weblink_with_url_detail() {
        let mut value = valid_doc_json();
        value["data"][0]["webLink"] = Value::String("not-a-url".to_string());
        let err = validate_structure(&value).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("webLink") && message.contains("http"), "{message}");
    }

    #[test]
    fn validate_structure_allows_empty_weblink() {
        let mut value = valid_doc_json();
        value["data"][0]["webLink"] = Value::String(String::new());
        assert!(validate_structure(&value).is_ok());
    }

    // -----------------------------------------------------------------------
    // validate_item
    // -----------------------------------------------------------------------

    #[test]
    fn validate_item_aggregates_all_errors() {
        let item = LocationItem {
            name: "  ".to_string(),
            web_link: "nope".to_string(),
            center: GeoPoint::new(95.0, 181.0),
            ..LocationItem::default()
        };
        let errors = validate_item(&item).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn validate_item_accepts_bare_named_item() {
        let item = LocationItem {
            name: "Cafe A".to_string(),
            ..LocationItem::default()
        };
        assert!(validate_item(&item).is_ok());
    }

    // -----------------------------------------------------------------------
    // import_document
    // -----------------------------------------------------------------------

    #[test]
    fn import_document_accepts_full_document() {
        let doc = import_document(&valid_doc_json().to_string()).unwrap();
        assert_eq!(doc.name, "Map");
        assert_eq!(doc.data.len(), 1);
    }

    #[test]
    fn import_document_accepts_bare_data_object() {
        let doc = import_document(r#"{"data":[{"name":"A"}]}"#).unwrap();
        assert_eq!(doc.data.len(), 1);
        assert_eq!(doc.name, "");
        assert!(doc.filter.inclusive.is_empty());
    }

    #[test]
    fn import_document_accepts_bare_array() {
        let doc = import_document(r#"[{"name":"A"},{"name":"B"}]"#).unwrap();
        assert_eq!(doc.data.len(), 2);
    }

    #[test]
    fn import_document_rejects_scalar_payload() {
        assert!(import_document("42").is_err());
    }
}
