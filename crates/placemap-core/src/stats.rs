//! Pure projections over a document: completeness counts, the aggregate
//! tag set, and heuristic metadata suggestions.
//!
//! Both tiers use the same functions, which is what makes before/after
//! diff display of a pending edit possible.

use std::collections::{BTreeSet, HashMap};

use crate::document::Document;

/// Per-field completeness counts over a document's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    pub total_locations: usize,
    pub has_name: usize,
    pub has_address: usize,
    pub has_coordinates: usize,
    pub has_phone: usize,
    pub has_intro: usize,
    pub has_tags: usize,
    pub has_weblink: usize,
}

/// Counts items whose fields are non-empty after trimming.
/// `has_coordinates` requires both axes to be non-zero.
#[must_use]
pub fn statistics(doc: &Document) -> Statistics {
    let items = &doc.data;
    Statistics {
        total_locations: items.len(),
        has_name: items.iter().filter(|i| !i.name.trim().is_empty()).count(),
        has_address: items.iter().filter(|i| !i.address.trim().is_empty()).count(),
        has_coordinates: items
            .iter()
            .filter(|i| i.center.lat != 0.0 && i.center.lng != 0.0)
            .count(),
        has_phone: items.iter().filter(|i| !i.phone.trim().is_empty()).count(),
        has_intro: items.iter().filter(|i| !i.intro.trim().is_empty()).count(),
        has_tags: items.iter().filter(|i| !i.tags.is_empty()).count(),
        has_weblink: items.iter().filter(|i| !i.web_link.trim().is_empty()).count(),
    }
}

/// The union of every tag in use: filter-category definitions on both
/// sides plus every non-empty per-item tag. Sorted and deduplicated for
/// deterministic display. Cleaning trims but never changes case, so
/// `"A"` and `"a"` stay distinct.
#[must_use]
pub fn all_tags(doc: &Document) -> Vec<String> {
    let mut tags = BTreeSet::new();

    for side in [&doc.filter.inclusive, &doc.filter.exclusive] {
        for category_tags in side.values() {
            for tag in category_tags {
                let tag = tag.trim();
                if !tag.is_empty() {
                    tags.insert(tag.to_string());
                }
            }
        }
    }

    for item in &doc.data {
        for tag in &item.tags {
            let tag = tag.trim();
            if !tag.is_empty() {
                tags.insert(tag.to_string());
            }
        }
    }

    tags.into_iter().collect()
}

/// Suggested map-level metadata derived from the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    pub name: String,
    pub description: String,
    pub origin: String,
}

/// Derives name/description/origin suggestions from the most common tags
/// and web names, for pre-filling the metadata form on a fresh dataset.
#[must_use]
pub fn suggestions(doc: &Document) -> Suggestions {
    let mut suggestions = Suggestions {
        name: "New map".to_string(),
        description: "Curated map of recommended places".to_string(),
        origin: "user collection".to_string(),
    };

    if doc.data.is_empty() {
        return suggestions;
    }
    let total = doc.data.len();

    let common_tags = most_common(doc.data.iter().flat_map(|i| i.tags.iter()), 3);
    if common_tags.is_empty() {
        suggestions.name = format!("Map of {total} selected places");
    } else {
        suggestions.name = format!("{} map", common_tags[..common_tags.len().min(2)].join(", "));
        suggestions.description = format!(
            "Covers {} places tagged {}",
            total,
            common_tags.join(", ")
        );
    }

    // The dominant webName is the best guess at the data's source.
    let web_names = most_common(
        doc.data
            .iter()
            .map(|i| &i.web_name)
            .filter(|n| !n.trim().is_empty()),
        1,
    );
    if let Some(origin) = web_names.into_iter().next() {
        suggestions.origin = origin;
    }

    suggestions
}

/// The `limit` most frequent non-empty values, ties broken by first
/// appearance so the output is deterministic.
fn most_common<'a>(values: impl Iterator<Item = &'a String>, limit: usize) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (order, value) in values.enumerate() {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        let entry = counts.entry(trimmed).or_insert((0, order));
        entry.0 += 1;
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(value, _)| value.to_string())
        .collect()
}
