//! Map framing from point sets: centroid, bounds, haversine span, and the
//! discrete zoom level derived from it.
//!
//! The zoom-table lookup is reproduced exactly from the map front end this
//! tool feeds: smallest level whose distance capacity still covers the
//! padded diagonal, floored at level 10. Degenerate cases are distinct —
//! no valid point falls back to a default city view, a single point gets a
//! close-in zoom.

use serde::{Deserialize, Serialize};

use crate::document::{Document, GeoPoint};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default view center when no item has resolved coordinates
/// (Shanghai city center).
pub const FALLBACK_CENTER: GeoPoint = GeoPoint {
    lat: 31.230_416,
    lng: 121.473_701,
};

/// Zoom level when the dataset has no resolvable point.
const NO_DATA_ZOOM: u8 = 15;
/// Zoom level when exactly one point resolves.
const SINGLE_POINT_ZOOM: u8 = 16;
/// Multi-point zoom never drops below this level.
const MIN_MULTI_POINT_ZOOM: u8 = 10;

/// Maximum representable span in meters per zoom level, 3 through 20.
/// Larger level, smaller span. Must stay monotonic for the lookup scan.
const ZOOM_DISTANCE_TABLE: &[(u8, f64)] = &[
    (3, 1_000_000.0),
    (4, 500_000.0),
    (5, 200_000.0),
    (6, 100_000.0),
    (7, 50_000.0),
    (8, 25_000.0),
    (9, 20_000.0),
    (10, 10_000.0),
    (11, 5_000.0),
    (12, 2_000.0),
    (13, 1_000.0),
    (14, 500.0),
    (15, 200.0),
    (16, 100.0),
    (17, 50.0),
    (18, 20.0),
    (19, 10.0),
    (20, 5.0),
];

const ZOOM_FLOOR: i16 = 3;
const ZOOM_CEIL: i16 = 20;

/// Axis-aligned bounding box over a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Computed map framing: center plus `[initial, min, max]` zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub center: GeoPoint,
    pub zoom: [u8; 3],
}

fn resolved_points(doc: &Document) -> impl Iterator<Item = GeoPoint> + '_ {
    doc.data
        .iter()
        .map(|item| item.center)
        .filter(GeoPoint::is_resolved)
}

/// Great-circle distance between two points in meters (haversine).
#[must_use]
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Average position of all resolved points, or `None` when no item has
/// valid non-sentinel coordinates.
#[must_use]
pub fn centroid(doc: &Document) -> Option<GeoPoint> {
    let mut count = 0usize;
    let mut lat_sum = 0.0;
    let mut lng_sum = 0.0;
    for p in resolved_points(doc) {
        count += 1;
        lat_sum += p.lat;
        lng_sum += p.lng;
    }
    if count == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = count as f64;
    Some(GeoPoint::new(lat_sum / n, lng_sum / n))
}

/// Bounding box of all resolved points, or `None` when there are none.
#[must_use]
pub fn bounds(doc: &Document) -> Option<Bounds> {
    let mut iter = resolved_points(doc);
    let first = iter.next()?;
    let mut b = Bounds {
        min_lat: first.lat,
        max_lat: first.lat,
        min_lng: first.lng,
        max_lng: first.lng,
    };
    for p in iter {
        b.min_lat = b.min_lat.min(p.lat);
        b.max_lat = b.max_lat.max(p.lat);
        b.min_lng = b.min_lng.min(p.lng);
        b.max_lng = b.max_lng.max(p.lng);
    }
    Some(b)
}

/// Discrete zoom level for the document's point spread.
///
/// Zero resolved points returns the no-data default (15), one point the
/// close-in single-point zoom (16). Otherwise the bounding-box diagonal,
/// padded by `padding_factor`, is matched against the zoom table: the
/// smallest level whose capacity still covers the span wins, floored at
/// level 10.
#[must_use]
pub fn zoom_level(doc: &Document, padding_factor: f64) -> u8 {
    let Some(b) = bounds(doc) else {
        return NO_DATA_ZOOM;
    };
    if resolved_points(doc).count() <= 1 {
        return SINGLE_POINT_ZOOM;
    }

    let diagonal = distance_meters(
        GeoPoint::new(b.min_lat, b.min_lng),
        GeoPoint::new(b.max_lat, b.max_lng),
    );
    let required = diagonal * padding_factor;

    // Scan from the tightest capacity upward: the first level that can
    // still cover the span is the closest usable view.
    for &(level, capacity) in ZOOM_DISTANCE_TABLE.iter().rev() {
        if required <= capacity {
            return level.max(MIN_MULTI_POINT_ZOOM);
        }
    }
    // Span exceeds the widest table entry.
    NO_DATA_ZOOM
}

/// Full viewport: centroid (or the fallback city center) plus the
/// `[initial, min, max]` zoom triple.
///
/// Each level is `base + offset` clamped to `[3, 20]`; min is further
/// clamped to stay at or below initial and max at or above it, so the
/// triple is always ordered `min <= initial <= max`.
#[must_use]
pub fn viewport_config(
    doc: &Document,
    initial_offset: i16,
    min_offset: i16,
    max_offset: i16,
) -> ViewportConfig {
    let center = centroid(doc).unwrap_or(FALLBACK_CENTER);
    let base = i16::from(zoom_level(doc, 1.5));

    let clamp = |z: i16| -> u8 {
        #[allow(clippy::cast_sign_loss)]
        let clamped = z.clamp(ZOOM_FLOOR, ZOOM_CEIL) as u8;
        clamped
    };

    let initial = clamp(base + initial_offset);
    let min = clamp(base + min_offset).min(initial);
    let max = clamp(base + max_offset).max(initial);

    ViewportConfig {
        center,
        zoom: [initial, min, max],
    }
}

/// Viewport with the standard offsets (0, -1, +5).
#[must_use]
pub fn default_viewport(doc: &Document) -> ViewportConfig {
    viewport_config(doc, 0, -1, 5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::LocationItem;

    fn doc_with_points(points: &[(f64, f64)]) -> Document {
        Document {
            data: points
                .iter()
                .map(|&(lat, lng)| LocationItem {
                    name: "p".to_string(),
                    center: GeoPoint::new(lat, lng),
                    ..LocationItem::default()
                })
                .collect(),
            ..Document::default()
        }
    }

    #[test]
    fn distance_between_identical_points_is_zero() {
        let p = GeoPoint::new(31.2, 121.5);
        assert!(distance_meters(p, p).abs() < 1e-9);
    }

    #[test]
    fn distance_one_degree_latitude_is_about_111km() {
        let d = distance_meters(GeoPoint::new(31.0, 121.0), GeoPoint::new(32.0, 121.0));
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn centroid_averages_valid_points_only() {
        let doc = doc_with_points(&[(30.0, 120.0), (32.0, 122.0), (0.0, 0.0), (95.0, 10.0)]);
        let c = centroid(&doc).unwrap();
        assert!((c.lat - 31.0).abs() < 1e-9);
        assert!((c.lng - 121.0).abs() < 1e-9);
    }

    #[test]
    fn centroid_none_when_no_valid_point() {
        let doc = doc_with_points(&[(0.0, 0.0), (100.0, 200.0)]);
        assert!(centroid(&doc).is_none());
    }

    #[test]
    fn bounds_covers_all_valid_points() {
        let doc = doc_with_points(&[(30.0, 122.0), (32.0, 120.0)]);
        let b = bounds(&doc).unwrap();
        assert_eq!(
            b,
            Bounds {
                min_lat: 30.0,
                max_lat: 32.0,
                min_lng: 120.0,
                max_lng: 122.0
            }
        );
    }

    #[test]
    fn zoom_level_no_points_is_default() {
        assert_eq!(zoom_level(&Document::default(), 1.5), 15);
    }

    #[test]
    fn zoom_level_single_point_is_close() {
        assert_eq!(zoom_level(&doc_with_points(&[(31.2, 121.5)]), 1.5), 16);
    }

    #[test]
    fn zoom_level_wide_spread_is_lower_than_tight_spread() {
        // ~100 km apart vs ~100 m apart.
        let wide = doc_with_points(&[(31.0, 121.0), (31.9, 121.0)]);
        let tight = doc_with_points(&[(31.2, 121.5), (31.2009, 121.5)]);
        assert!(zoom_level(&wide, 1.5) < zoom_level(&tight, 1.5));
    }

    #[test]
    fn zoom_level_is_floored_at_10_for_multi_point() {
        // ~20 km apart, padded ~33 km: raw table level is 7 (50 km
        // capacity), which the floor lifts to 10.
        let doc = doc_with_points(&[(31.0, 121.0), (31.18, 121.0)]);
        assert_eq!(zoom_level(&doc, 1.5), 10);
    }

    #[test]
    fn zoom_level_picks_smallest_covering_level() {
        // Diagonal ~111 km, padded ~167 km → first capacity >= required is
        // 200 km at level 5, floored to 10.
        let doc = doc_with_points(&[(31.0, 121.0), (32.0, 121.0)]);
        assert_eq!(zoom_level(&doc, 1.5), 10);
    }

    #[test]
    fn viewport_config_fallback_when_no_points() {
        let v = default_viewport(&Document::default());
        assert_eq!(v.center, FALLBACK_CENTER);
        assert_eq!(v.zoom, [15, 14, 20]);
    }

    #[test]
    fn viewport_config_single_point_centers_on_it() {
        let doc = doc_with_points(&[(31.2, 121.5)]);
        let v = default_viewport(&doc);
        assert_eq!(v.center, GeoPoint::new(31.2, 121.5));
        assert_eq!(v.zoom, [16, 15, 20]);
    }

    #[test]
    fn viewport_zoom_triple_is_ordered() {
        let doc = doc_with_points(&[(31.0, 121.0), (31.9, 121.0)]);
        let v = viewport_config(&doc, 0, 4, -4);
        let [initial, min, max] = v.zoom;
        assert!(min <= initial && initial <= max);
    }

    #[test]
    fn viewport_zoom_clamped_to_table_range() {
        let doc = doc_with_points(&[(31.2, 121.5)]);
        let v = viewport_config(&doc, 10, -30, 10);
        assert_eq!(v.zoom, [20, 3, 20]);
    }
}
