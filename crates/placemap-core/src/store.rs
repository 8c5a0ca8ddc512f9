//! Three-tier session state: extracted text, saved document, editing document.
//!
//! The saved tier is authoritative. The editing tier only carries meaning
//! between `start_editing` (or an external structuring/edit result landing
//! via `set_editing`) and the following `apply_edits`/`discard_edits`;
//! nothing may assume it mirrors the saved tier at other times.
//!
//! Normalization-on-write is the central correctness guarantee here: every
//! document entering either tier passes through [`Document::normalized`]
//! first, so no caller can inject missing fields, bad types, or
//! out-of-range coordinates. Writes are all-or-nothing — normalize fully,
//! then assign — so readers between operations always observe a complete
//! prior document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::{Document, GeoPoint, LocationItem};
use crate::normalize::clean_text;

/// Serializable image of the session state, for persisting a store across
/// process runs. Documents are re-normalized when the snapshot is loaded,
/// so a hand-edited snapshot file cannot break store invariants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub extracted_text: String,
    #[serde(default)]
    pub saved: Document,
    #[serde(default)]
    pub editing: Document,
    #[serde(default)]
    pub has_pending_edits: bool,
}

/// Which document tier an operation reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Saved,
    Editing,
}

/// Coordinate resolution state of one item, for status listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateState {
    /// Coordinates already present.
    Resolved,
    /// Has an address, coordinates not yet resolved.
    Pending,
    /// No address to resolve from.
    NoAddress,
}

/// One row of the per-item coordinate status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateStatus {
    pub index: usize,
    pub name: String,
    pub address: String,
    pub state: CoordinateState,
}

/// Owner of the single-session document state.
///
/// Constructed at session start and handed to every component; there is no
/// ambient global. All operations run to completion before the next one is
/// processed — the store models no concurrency beyond that sequencing.
#[derive(Debug, Default)]
pub struct DocumentStore {
    extracted_text: String,
    saved: Document,
    editing: Document,
    has_pending_edits: bool,
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a persisted snapshot. Both documents pass
    /// through normalization again on the way in.
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self {
            extracted_text: clean_text(&snapshot.extracted_text),
            saved: snapshot.saved.normalized(),
            editing: snapshot.editing.normalized(),
            has_pending_edits: snapshot.has_pending_edits,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            extracted_text: self.extracted_text.clone(),
            saved: self.saved.clone(),
            editing: self.editing.clone(),
            has_pending_edits: self.has_pending_edits,
        }
    }

    // -- extracted text -----------------------------------------------------

    pub fn set_extracted_text(&mut self, text: &str) {
        self.extracted_text = clean_text(text);
    }

    #[must_use]
    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    #[must_use]
    pub fn has_extracted_text(&self) -> bool {
        !self.extracted_text.is_empty()
    }

    pub fn clear_extracted_text(&mut self) {
        self.extracted_text.clear();
    }

    // -- saved tier (authoritative) -----------------------------------------

    /// Replaces the saved document wholesale with a normalized copy and
    /// clears the pending-edits flag.
    pub fn set_saved(&mut self, doc: &Document) {
        self.saved = doc.normalized();
        self.has_pending_edits = false;
    }

    #[must_use]
    pub fn saved(&self) -> &Document {
        &self.saved
    }

    #[must_use]
    pub fn has_saved(&self) -> bool {
        self.saved.has_items()
    }

    pub fn reset_saved(&mut self) {
        self.saved = Document::default();
        self.has_pending_edits = false;
    }

    // -- editing tier (provisional) -----------------------------------------

    /// Places an externally produced candidate (structuring or AI-edit
    /// result) into the editing tier, normalized, and marks edits pending.
    pub fn set_editing(&mut self, doc: &Document) {
        self.editing = doc.normalized();
        self.has_pending_edits = true;
    }

    #[must_use]
    pub fn editing(&self) -> &Document {
        &self.editing
    }

    #[must_use]
    pub fn has_editing(&self) -> bool {
        self.editing.has_items()
    }

    pub fn reset_editing(&mut self) {
        self.editing = Document::default();
        self.has_pending_edits = false;
    }

    #[must_use]
    pub fn has_pending_edits(&self) -> bool {
        self.has_pending_edits
    }

    #[must_use]
    pub fn document(&self, tier: Tier) -> &Document {
        match tier {
            Tier::Saved => &self.saved,
            Tier::Editing => &self.editing,
        }
    }

    // -- merge operations ---------------------------------------------------

    /// Copies the saved document into the editing tier as a baseline.
    /// Nothing has diverged yet, so pending edits are cleared.
    pub fn start_editing(&mut self) {
        self.editing = self.saved.clone();
        self.has_pending_edits = false;
    }

    /// Commits the editing tier into the saved tier.
    pub fn apply_edits(&mut self) {
        self.saved = self.editing.clone();
        self.has_pending_edits = false;
    }

    /// Reverts the editing tier back to the saved document.
    pub fn discard_edits(&mut self) {
        self.editing = self.saved.clone();
        self.has_pending_edits = false;
    }

    pub fn reset_all(&mut self) {
        self.extracted_text.clear();
        self.saved = Document::default();
        self.editing = Document::default();
        self.has_pending_edits = false;
    }

    // -- editing-tier mutators ----------------------------------------------

    /// Updates map-level metadata on the editing tier. `None` leaves a
    /// field untouched.
    pub fn update_editing_metadata(
        &mut self,
        name: Option<&str>,
        description: Option<&str>,
        origin: Option<&str>,
    ) {
        if let Some(name) = name {
            self.editing.name = clean_text(name);
            self.has_pending_edits = true;
        }
        if let Some(description) = description {
            self.editing.description = clean_text(description);
            self.has_pending_edits = true;
        }
        if let Some(origin) = origin {
            self.editing.origin = clean_text(origin);
            self.has_pending_edits = true;
        }
    }

    pub fn add_editing_item(&mut self, item: &LocationItem) {
        self.editing.data.push(item.normalized());
        self.has_pending_edits = true;
    }

    /// Replaces the item at `index` with a normalized copy. Out-of-bounds
    /// indices are ignored.
    pub fn update_editing_item(&mut self, index: usize, item: &LocationItem) {
        if let Some(slot) = self.editing.data.get_mut(index) {
            *slot = item.normalized();
            self.has_pending_edits = true;
        }
    }

    pub fn remove_editing_item(&mut self, index: usize) {
        if index < self.editing.data.len() {
            self.editing.data.remove(index);
            self.has_pending_edits = true;
        }
    }

    /// Replaces one or both filter sides on the editing tier.
    pub fn update_editing_filters(
        &mut self,
        inclusive: Option<BTreeMap<String, Vec<String>>>,
        exclusive: Option<BTreeMap<String, Vec<String>>>,
    ) {
        if let Some(inclusive) = inclusive {
            self.editing.filter.inclusive = inclusive;
            self.has_pending_edits = true;
        }
        if let Some(exclusive) = exclusive {
            self.editing.filter.exclusive = exclusive;
            self.has_pending_edits = true;
        }
    }

    // -- coordinates --------------------------------------------------------

    /// Writes resolved coordinates onto one item. Out-of-range values are
    /// clamped to the sentinel by normalization, so every intermediate
    /// state of a batch pass stays internally consistent.
    pub fn update_coordinates(&mut self, tier: Tier, index: usize, lat: f64, lng: f64) {
        let doc = match tier {
            Tier::Saved => &mut self.saved,
            Tier::Editing => &mut self.editing,
        };
        if let Some(item) = doc.data.get_mut(index) {
            item.center = GeoPoint::new(lat, lng).normalized();
            if tier == Tier::Editing {
                self.has_pending_edits = true;
            }
        }
    }

    /// Per-item coordinate resolution status, for progress displays.
    #[must_use]
    pub fn coordinate_status(&self, tier: Tier) -> Vec<CoordinateStatus> {
        self.document(tier)
            .data
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let state = if item.center.is_resolved() {
                    CoordinateState::Resolved
                } else if item.address.is_empty() {
                    CoordinateState::NoAddress
                } else {
                    CoordinateState::Pending
                };
                CoordinateStatus {
                    index,
                    name: item.name.clone(),
                    address: item.address.clone(),
                    state,
                }
            })
            .collect()
    }
}
