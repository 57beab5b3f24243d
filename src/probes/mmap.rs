// SPDX-License-Identifier: PMPL-1.0-or-later

//! Read of the target through a read-only memory map

use super::{denied_or, Probe};
use crate::sink;
use crate::types::{Outcome, ProbeConfig};
use anyhow::{bail, Context, Result};
use std::fs::File;

pub const ARTIFACT: &str = "mmap.txt";

pub struct Mmap;

impl Probe for Mmap {
    fn run(&self, config: &ProbeConfig) -> Result<Outcome> {
        sink::ensure_output_ready(&config.output_dir)?;

        let data = match map_and_copy(config)? {
            Ok(data) => data,
            Err(denied) => return Ok(denied),
        };

        let artifact = sink::write_artifact(&config.output_dir, ARTIFACT, &data)?;
        Ok(Outcome::Captured {
            bytes: data.len(),
            artifact,
        })
    }
}

/// Map the whole file, copy it out, unmap. The file handle lives only for
/// this scope.
fn map_and_copy(config: &ProbeConfig) -> Result<std::result::Result<Vec<u8>, Outcome>> {
    let file = match denied_or(File::open(&config.target))
        .with_context(|| format!("opening {}", config.target.display()))?
    {
        Ok(file) => file,
        Err(denied) => return Ok(Err(denied)),
    };

    let len = file
        .metadata()
        .with_context(|| format!("reading metadata of {}", config.target.display()))?
        .len();
    if len == 0 {
        bail!("cannot map empty file {}", config.target.display());
    }

    // SAFETY: read-only mapping; the bytes are copied out before unmapping.
    let mapped = match denied_or(unsafe { memmap2::Mmap::map(&file) })
        .with_context(|| format!("mapping {}", config.target.display()))?
    {
        Ok(mapped) => mapped,
        Err(denied) => return Ok(Err(denied)),
    };
    tracing::debug!(len = mapped.len(), "target mapped");

    let data = mapped.to_vec();
    drop(mapped);
    Ok(Ok(data))
}
