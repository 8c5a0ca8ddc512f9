//! Address resolution over documents: per-item lookup with address
//! preferred and name as fallback, and a batch pass that updates the
//! store incrementally.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use placemap_core::{DocumentStore, Tier};

use crate::client::{GeocodeResult, GeocoderClient};
use crate::error::GeocodeError;

// Listing addresses often trail opening hours or floor hints after the
// house number; everything past the CJK house-number marker only confuses
// the geocoder.
static UP_TO_HOUSE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*?号").expect("static regex"));

/// Outcome of a batch pass over a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    pub resolved: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Truncates an address at the first CJK house-number marker (`号`) when
/// present, otherwise trims it.
#[must_use]
pub fn clean_address(address: &str) -> String {
    UP_TO_HOUSE_NUMBER
        .find(address)
        .map_or_else(|| address.trim().to_string(), |m| m.as_str().to_string())
}

/// Builds the query actually sent to the service: cleaned address with the
/// configured region prefix, when one is set.
#[must_use]
pub fn build_query(address: &str, prefix: &str) -> String {
    let cleaned = clean_address(address);
    if prefix.is_empty() {
        cleaned
    } else {
        format!("{prefix}{cleaned}")
    }
}

/// Resolves one item: the address is tried first, the name is the
/// fallback, and the first success wins.
///
/// # Errors
///
/// Returns the address lookup's error when both queries fail (or the name
/// lookup's error when there was no address to try), so the caller sees
/// the most specific failure.
pub async fn resolve(
    client: &GeocoderClient,
    name: &str,
    address: &str,
    prefix: &str,
) -> Result<GeocodeResult, GeocodeError> {
    let mut first_error = None;

    if !address.trim().is_empty() {
        match client.geocode(&build_query(address, prefix)).await {
            Ok(result) => return Ok(result),
            Err(err) => first_error = Some(err),
        }
    }

    if !name.trim().is_empty() {
        match client.geocode(&build_query(name, prefix)).await {
            Ok(result) => return Ok(result),
            Err(err) => {
                return Err(first_error.unwrap_or(err));
            }
        }
    }

    Err(first_error.unwrap_or_else(|| GeocodeError::NoMatch {
        query: String::new(),
    }))
}

/// Resolves every unresolved item of the given tier, writing each success
/// into the store as it lands.
///
/// Items that already carry coordinates (or have neither name nor
/// address) are skipped. A failed lookup leaves that item's center at the
/// sentinel and the pass continues — there is no multi-item transaction,
/// and every intermediate store state is internally consistent.
///
/// `delay_ms` is slept between requests to stay under service quotas.
pub async fn update_document_coordinates(
    client: &GeocoderClient,
    store: &mut DocumentStore,
    tier: Tier,
    prefix: &str,
    delay_ms: u64,
) -> BatchOutcome {
    let pending: Vec<(usize, String, String)> = store
        .document(tier)
        .data
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.center.is_resolved())
        .map(|(i, item)| (i, item.name.clone(), item.address.clone()))
        .collect();

    let mut outcome = BatchOutcome {
        skipped: store.document(tier).data.len() - pending.len(),
        ..BatchOutcome::default()
    };

    let total = pending.len();
    for (done, (index, name, address)) in pending.into_iter().enumerate() {
        if name.trim().is_empty() && address.trim().is_empty() {
            outcome.skipped += 1;
            continue;
        }

        match resolve(client, &name, &address, prefix).await {
            Ok(result) => {
                store.update_coordinates(tier, index, result.lat, result.lng);
                outcome.resolved += 1;
                tracing::debug!(index, name = %name, lat = result.lat, lng = result.lng, "resolved");
            }
            Err(err) => {
                outcome.failed += 1;
                tracing::warn!(index, name = %name, error = %err, "geocoding failed");
            }
        }

        if delay_ms > 0 && done + 1 < total {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    tracing::info!(
        resolved = outcome.resolved,
        failed = outcome.failed,
        skipped = outcome.skipped,
        "batch geocoding pass finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use placemap_core::{Document, GeoPoint, LocationItem};
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn ok_body(lat: f64, lng: f64) -> serde_json::Value {
        serde_json::json!({
            "status": 0, "message": "ok",
            "result": {"location": {"lat": lat, "lng": lng}}
        })
    }

    fn no_match_body() -> serde_json::Value {
        serde_json::json!({"status": 0, "message": "ok"})
    }

    #[test]
    fn clean_address_truncates_at_house_number_marker() {
        assert_eq!(clean_address("长宁路123号3楼咖啡馆"), "长宁路123号");
    }

    #[test]
    fn clean_address_without_marker_trims() {
        assert_eq!(clean_address("  1 Main St  "), "1 Main St");
    }

    #[test]
    fn build_query_applies_prefix() {
        assert_eq!(build_query("1 Main St", "Springfield "), "Springfield 1 Main St");
        assert_eq!(build_query("1 Main St", ""), "1 Main St");
    }

    #[tokio::test]
    async fn resolve_prefers_address_over_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("address", "1 Main St"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(31.2, 121.5)))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeocoderClient::with_base_url("k", &server.uri()).unwrap();
        let result = resolve(&client, "Cafe A", "1 Main St", "").await.unwrap();
        assert!((result.lat - 31.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn resolve_falls_back_to_name_when_address_misses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("address", "nowhere"))
            .respond_with(ResponseTemplate::new(200).set_body_json(no_match_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("address", "Cafe A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(30.0, 120.0)))
            .mount(&server)
            .await;

        let client = GeocoderClient::with_base_url("k", &server.uri()).unwrap();
        let result = resolve(&client, "Cafe A", "nowhere", "").await.unwrap();
        assert!((result.lng - 120.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn resolve_reports_address_error_when_both_fail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(no_match_body()))
            .mount(&server)
            .await;

        let client = GeocoderClient::with_base_url("k", &server.uri()).unwrap();
        let err = resolve(&client, "Cafe A", "1 Main St", "").await.unwrap_err();
        assert!(matches!(err, GeocodeError::NoMatch { ref query } if query == "1 Main St"));
    }

    #[tokio::test]
    async fn batch_updates_store_and_skips_resolved_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(31.2, 121.5)))
            .mount(&server)
            .await;

        let mut store = DocumentStore::new();
        let doc = Document {
            data: vec![
                LocationItem {
                    name: "Already".to_string(),
                    center: GeoPoint::new(30.0, 120.0),
                    ..LocationItem::default()
                },
                LocationItem {
                    name: "Cafe A".to_string(),
                    address: "1 Main St".to_string(),
                    ..LocationItem::default()
                },
                LocationItem::default(), // nothing to resolve from
            ],
            ..Document::default()
        };
        store.set_saved(&doc);

        let client = GeocoderClient::with_base_url("k", &server.uri()).unwrap();
        let outcome =
            update_document_coordinates(&client, &mut store, Tier::Saved, "", 0).await;

        assert_eq!(outcome.resolved, 1);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(store.saved().data[1].center, GeoPoint::new(31.2, 121.5));
        // Pre-resolved item untouched.
        assert_eq!(store.saved().data[0].center, GeoPoint::new(30.0, 120.0));
    }

    #[tokio::test]
    async fn batch_failure_leaves_sentinel_and_continues() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("address", "bad place"))
            .respond_with(ResponseTemplate::new(200).set_body_json(no_match_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("address", "good place"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(31.0, 121.0)))
            .mount(&server)
            .await;

        let mut store = DocumentStore::new();
        let doc = Document {
            data: vec![
                LocationItem {
                    address: "bad place".to_string(),
                    ..LocationItem::default()
                },
                LocationItem {
                    address: "good place".to_string(),
                    ..LocationItem::default()
                },
            ],
            ..Document::default()
        };
        store.set_saved(&doc);

        let client = GeocoderClient::with_base_url("k", &server.uri()).unwrap();
        let outcome =
            update_document_coordinates(&client, &mut store, Tier::Saved, "", 0).await;

        assert_eq!(outcome.resolved, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(store.saved().data[0].center, GeoPoint::default());
        assert_eq!(store.saved().data[1].center, GeoPoint::new(31.0, 121.0));
    }
}
