//! Subcommand handlers. Each one loads the session, runs a single store
//! operation to completion, and persists the result — the store itself
//! never outlives one invocation.

use std::io::Write as _;
use std::path::Path;

use anyhow::{bail, Context};

use placemap_core::stats::{all_tags, statistics, Statistics};
use placemap_core::store::CoordinateState;
use placemap_core::validate::import_document;
use placemap_core::viewport::default_viewport;
use placemap_core::{export, AppConfig, DocumentStore, Tier};
use placemap_extract::ExtractClient;
use placemap_geocode::GeocoderClient;

use crate::session;

pub fn import(store: &mut DocumentStore, file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let doc = import_document(&raw)?;
    store.set_saved(&doc);
    let stats = statistics(store.saved());
    println!(
        "imported {} locations ({} with coordinates)",
        stats.total_locations, stats.has_coordinates
    );
    Ok(())
}

pub fn ingest(store: &mut DocumentStore, file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    store.set_extracted_text(&raw);
    println!("stored {} characters of listing text", store.extracted_text().len());
    Ok(())
}

pub async fn extract(
    store: &mut DocumentStore,
    config: &AppConfig,
    instruction: &str,
) -> anyhow::Result<()> {
    if !store.has_extracted_text() {
        bail!("no ingested text — run `placemap ingest <file>` first");
    }
    let client = extract_client(config)?;
    let candidate = placemap_extract::structure(&client, store.extracted_text(), instruction).await?;
    store.set_editing(&candidate);
    println!(
        "structured {} locations into the editing tier — review with `stats`, then `apply` or `discard`",
        store.editing().data.len()
    );
    Ok(())
}

pub async fn edit(
    store: &mut DocumentStore,
    config: &AppConfig,
    instruction: &str,
) -> anyhow::Result<()> {
    if !store.has_saved() {
        bail!("nothing to edit — import or extract a document first");
    }
    let client = extract_client(config)?;
    let candidate = placemap_extract::edit(&client, store.saved(), instruction).await?;
    store.set_editing(&candidate);
    println!(
        "instruction applied to an editing copy ({} locations) — `apply` to commit, `discard` to drop",
        store.editing().data.len()
    );
    Ok(())
}

pub fn stats(store: &DocumentStore) {
    println!("saved document:");
    print_statistics(&statistics(store.saved()));
    if store.has_pending_edits() {
        println!("\nediting document (pending):");
        print_statistics(&statistics(store.editing()));
    }
}

fn print_statistics(stats: &Statistics) {
    println!("  locations:   {}", stats.total_locations);
    println!("  name:        {}", stats.has_name);
    println!("  address:     {}", stats.has_address);
    println!("  coordinates: {}", stats.has_coordinates);
    println!("  phone:       {}", stats.has_phone);
    println!("  intro:       {}", stats.has_intro);
    println!("  tags:        {}", stats.has_tags);
    println!("  web link:    {}", stats.has_weblink);
}

pub fn tags(store: &DocumentStore) {
    let tags = all_tags(store.saved());
    if tags.is_empty() {
        println!("no tags in use");
        return;
    }
    for tag in tags {
        println!("{tag}");
    }
}

pub fn status(store: &DocumentStore) {
    for row in store.coordinate_status(Tier::Saved) {
        let state = match row.state {
            CoordinateState::Resolved => "resolved",
            CoordinateState::Pending => "pending",
            CoordinateState::NoAddress => "no address",
        };
        let name = if row.name.is_empty() {
            "(unnamed)"
        } else {
            row.name.as_str()
        };
        println!("{:>4}  {:<12} {}", row.index + 1, state, name);
    }
}

pub async fn geocode(
    store: &mut DocumentStore,
    config: &AppConfig,
    editing: bool,
) -> anyhow::Result<()> {
    let Some(api_key) = config.geocoder_api_key.as_deref() else {
        bail!("{}", placemap_geocode::GeocodeError::NotConfigured);
    };
    let client = GeocoderClient::new(
        api_key,
        &config.geocoder_base_url,
        config.geocoder_request_timeout_secs,
        config.geocoder_max_retries,
        config.geocoder_retry_backoff_base_secs,
    )?;
    let tier = if editing { Tier::Editing } else { Tier::Saved };
    let outcome = placemap_geocode::update_document_coordinates(
        &client,
        store,
        tier,
        &config.geocoder_address_prefix,
        config.geocoder_request_delay_ms,
    )
    .await;
    println!(
        "resolved {} locations ({} failed, {} skipped)",
        outcome.resolved, outcome.failed, outcome.skipped
    );
    Ok(())
}

pub fn apply(store: &mut DocumentStore) -> anyhow::Result<()> {
    if !store.has_pending_edits() {
        bail!("no pending edits to apply");
    }
    store.apply_edits();
    println!("edits applied to the saved document");
    Ok(())
}

pub fn discard(store: &mut DocumentStore) {
    store.discard_edits();
    println!("pending edits discarded");
}

pub fn export_command(
    store: &DocumentStore,
    csv: bool,
    remove_empty: bool,
    remove_zero_coords: bool,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let doc = store.saved();

    let bytes = if csv {
        export::to_csv(doc)?
    } else {
        let exported = export::attach_viewport(
            export::prepare_export(doc, remove_empty, remove_zero_coords),
            &default_viewport(doc),
        );
        let mut json = serde_json::to_vec_pretty(&exported)?;
        json.push(b'\n');
        json
    };

    match out {
        Some(path) => {
            std::fs::write(path, bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => std::io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

pub fn reset(session_path: &Path, store: &mut DocumentStore) -> anyhow::Result<()> {
    store.reset_all();
    session::save(session_path, store)?;
    println!("session reset");
    Ok(())
}

fn extract_client(config: &AppConfig) -> anyhow::Result<ExtractClient> {
    let Some(api_key) = config.llm_api_key.as_deref() else {
        bail!("{}", placemap_extract::ExtractError::NotConfigured);
    };
    Ok(ExtractClient::new(
        api_key,
        &config.llm_base_url,
        &config.llm_text_model,
        config.llm_request_timeout_secs,
    )?)
}
