//! Session persistence: the three-tier store serialized to a JSON file
//! between CLI invocations. One file, one session, one writer.

use std::path::Path;

use anyhow::Context;

use placemap_core::{DocumentStore, SessionSnapshot};

/// Loads the store from `path`, or starts a fresh session when the file
/// does not exist yet.
pub fn load(path: &Path) -> anyhow::Result<DocumentStore> {
    if !path.exists() {
        return Ok(DocumentStore::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session file {}", path.display()))?;
    let snapshot: SessionSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("session file {} is not valid", path.display()))?;
    Ok(DocumentStore::from_snapshot(&snapshot))
}

/// Writes the store back to `path` as pretty-printed JSON.
pub fn save(path: &Path, store: &DocumentStore) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&store.snapshot())?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write session file {}", path.display()))?;
    Ok(())
}
