//! Typed document model for place datasets.
//!
//! Every field of a [`LocationItem`] is always present after normalization:
//! empty string, empty list, and the `(0, 0)` sentinel coordinate stand in
//! for "absent". Downstream consumers (statistics, export, viewport) index
//! fields unconditionally and rely on this.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::{clean_tags, clean_text, clean_url};

/// A latitude/longitude pair. `(0, 0)` is the sentinel for "coordinates
/// not yet resolved".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both axes are in range and the point is not the sentinel.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.in_range() && !(self.lat == 0.0 && self.lng == 0.0)
    }

    /// True when lat ∈ [-90, 90] and lng ∈ [-180, 180].
    #[must_use]
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Returns the point unchanged when in range, otherwise the sentinel.
    ///
    /// One out-of-range axis invalidates the whole point. That matches the
    /// historical behavior of datasets produced by this tool; keep it
    /// unless product intent changes.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.in_range() {
            self
        } else {
            Self::default()
        }
    }
}

/// One place entry within a [`Document`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub web_name: String,
    #[serde(default)]
    pub web_link: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub center: GeoPoint,
}

impl LocationItem {
    /// Returns a cleaned copy: strings through `clean_text`, the link
    /// through `clean_url`, tags through `clean_tags`, and the center
    /// reset to the sentinel when out of range.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            name: clean_text(&self.name),
            address: clean_text(&self.address),
            phone: clean_text(&self.phone),
            web_name: clean_text(&self.web_name),
            web_link: clean_url(&self.web_link),
            intro: clean_text(&self.intro),
            tags: clean_tags(&self.tags),
            center: self.center.normalized(),
        }
    }
}

/// Named tag groups used for display-time filtering.
///
/// Both sides are always present as maps, possibly empty — structural
/// validation requires it. `BTreeMap` keeps category order stable across
/// serialization round trips.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub inclusive: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub exclusive: BTreeMap<String, Vec<String>>,
}

/// The full structured dataset: map-level metadata, filters, and the
/// ordered list of location items.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub data: Vec<LocationItem>,
}

impl Document {
    /// Returns a fully normalized copy: metadata strings cleaned and every
    /// item passed through [`LocationItem::normalized`].
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            name: clean_text(&self.name),
            description: clean_text(&self.description),
            origin: clean_text(&self.origin),
            filter: self.filter.clone(),
            data: self.data.iter().map(LocationItem::normalized).collect(),
        }
    }

    /// True when the document holds at least one item.
    #[must_use]
    pub fn has_items(&self) -> bool {
        !self.data.is_empty()
    }
}
