// SPDX-License-Identifier: PMPL-1.0-or-later

//! Baseline reads through plain `std::fs`

use super::{denied_or, Probe};
use crate::sink;
use crate::types::{Outcome, ProbeConfig};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const ARTIFACT: &str = "fs_read.txt";
pub const CREDENTIAL_ARTIFACT: &str = "fs_read_cred.txt";

/// Reads the sensitive target.
pub struct FsRead;

/// Reads the agent credential file.
pub struct FsReadCred;

impl Probe for FsRead {
    fn run(&self, config: &ProbeConfig) -> Result<Outcome> {
        read_whole(config, &config.target, ARTIFACT)
    }
}

impl Probe for FsReadCred {
    fn run(&self, config: &ProbeConfig) -> Result<Outcome> {
        read_whole(config, &config.credential_target, CREDENTIAL_ARTIFACT)
    }
}

fn read_whole(config: &ProbeConfig, source: &Path, artifact_name: &str) -> Result<Outcome> {
    sink::ensure_output_ready(&config.output_dir)?;

    let data = match denied_or(fs::read(source))
        .with_context(|| format!("reading {}", source.display()))?
    {
        Ok(data) => data,
        Err(denied) => return Ok(denied),
    };

    let artifact = sink::write_artifact(&config.output_dir, artifact_name, &data)?;
    Ok(Outcome::Captured {
        bytes: data.len(),
        artifact,
    })
}
