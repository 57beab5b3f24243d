// SPDX-License-Identifier: PMPL-1.0-or-later

//! Whole-file copy of the target straight into the output directory

use super::{denied_or, Probe};
use crate::sink;
use crate::types::{Outcome, ProbeConfig};
use anyhow::{Context, Result};
use std::fs;

pub const ARTIFACT: &str = "copy.txt";

pub struct Copy;

impl Probe for Copy {
    fn run(&self, config: &ProbeConfig) -> Result<Outcome> {
        sink::ensure_output_ready(&config.output_dir)?;

        let artifact = config.artifact_path(ARTIFACT);
        let copied = denied_or(fs::copy(&config.target, &artifact)).with_context(|| {
            format!(
                "copying {} to {}",
                config.target.display(),
                artifact.display()
            )
        })?;

        match copied {
            Ok(bytes) => {
                tracing::debug!(bytes, artifact = %artifact.display(), "target copied");
                Ok(Outcome::Copied { artifact })
            }
            Err(denied) => Ok(denied),
        }
    }
}
