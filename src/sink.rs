// SPDX-License-Identifier: PMPL-1.0-or-later

//! Output directory handling for captured artifacts

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Create the output directory (and parents) if missing. Idempotent.
pub fn ensure_output_ready(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))
}

/// Dump captured bytes verbatim, replacing any artifact from an earlier run.
pub fn write_artifact(dir: &Path, file_name: &str, data: &[u8]) -> Result<PathBuf> {
    let path = dir.join(file_name);
    fs::write(&path, data).with_context(|| format!("writing artifact {}", path.display()))?;
    tracing::debug!(artifact = %path.display(), bytes = data.len(), "artifact written");
    Ok(path)
}
