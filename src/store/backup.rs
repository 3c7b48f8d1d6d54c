//! Diary backup bundles.
//!
//! A bundle is one JSON document carrying all three collections. Import is
//! all-or-nothing: the whole document is parsed and checked before any
//! collection is touched, and a document missing `records`, `beans`, or
//! `methods` is rejected outright.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::models::{Bean, BrewMethod, BrewRecord};
use crate::store::DiaryStore;

/// Document format version. Matches the `-v2` generation of the diary's
/// on-disk collections.
pub const BUNDLE_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupBundle {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    pub records: Vec<BrewRecord>,
    pub beans: Vec<Bean>,
    pub methods: Vec<BrewMethod>,
}

fn default_version() -> u32 {
    BUNDLE_VERSION
}

/// What an import replaced, for the confirmation message.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub records: usize,
    pub beans: usize,
    pub methods: usize,
}

/// Serialize the live snapshot into a pretty-printed bundle document.
pub fn export(store: &DiaryStore, exported_at: DateTime<Utc>) -> Result<String> {
    let bundle = BackupBundle {
        version: BUNDLE_VERSION,
        exported_at: Some(exported_at),
        records: store.records(),
        beans: store.beans(),
        methods: store.methods(),
    };
    let serialized = serde_json::to_string_pretty(&bundle)?;
    info!(
        "Exported diary backup ({} records, {} beans, {} methods)",
        bundle.records.len(),
        bundle.beans.len(),
        bundle.methods.len()
    );
    Ok(serialized)
}

/// Parse a bundle document and replace every collection with its contents.
pub fn import(store: &DiaryStore, data: &str) -> Result<ImportSummary> {
    let bundle: BackupBundle = serde_json::from_str(data.trim())
        .context("import failed: not a valid backup document")?;

    let summary = ImportSummary {
        records: bundle.records.len(),
        beans: bundle.beans.len(),
        methods: bundle.methods.len(),
    };

    store.replace_all(bundle.records, bundle.beans, bundle.methods)?;
    info!(
        "Imported diary backup ({} records, {} beans, {} methods)",
        summary.records, summary.beans, summary.methods
    );
    Ok(summary)
}
