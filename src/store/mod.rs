// File-backed stage boundaries.
//
// Stages talk to each other only through these files. Readers validate the
// schema up front so a stale or hand-edited file fails with a clear message
// instead of a half-populated row deep inside a stage.

pub mod raw;
pub mod tables;

use std::path::Path;

use anyhow::{Context, Result};

/// Create the parent directory of `path` if it doesn't exist yet.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}
