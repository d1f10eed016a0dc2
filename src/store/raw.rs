// JSON artifacts: the collected posts and the ranked qualifying set.
//
// Both live at the same path (`data/raw_data.json`); the ranker overwrites the
// collector's output. RankedItem serializes flat, so either file reads back as
// a list of RawItems.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::ensure_parent;
use crate::models::RawItem;

/// Read the collected posts.
pub fn read_raw_items(path: &Path) -> Result<Vec<RawItem>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("{} is not a valid list of posts", path.display()))
}

/// Write a list of records as 2-space pretty JSON, replacing any existing file.
pub fn write_json<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
