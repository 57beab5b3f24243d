// SPDX-License-Identifier: PMPL-1.0-or-later

//! Selector resolution and failure-isolated probe execution

use crate::probes::ProbeKind;
use crate::types::{Outcome, ProbeConfig, ProbeRecord, Verdict};
use anyhow::Result;
use colored::*;
use std::io::{self, Write};

/// Selector that expands to every registered probe.
pub const ALL: &str = "all";

pub struct Dispatcher {
    config: ProbeConfig,
}

impl Dispatcher {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Names a selector stands for: every probe for `all`, otherwise the
    /// selector itself (which may not be registered).
    pub fn resolve(selector: &str) -> Vec<String> {
        if selector == ALL {
            ProbeKind::ALL
                .iter()
                .map(|kind| kind.name().to_string())
                .collect()
        } else {
            vec![selector.to_string()]
        }
    }

    /// Run one probe. Errors are captured in the record, never propagated.
    pub fn run_one(&self, kind: ProbeKind) -> ProbeRecord {
        tracing::debug!(probe = kind.name(), "starting probe");
        let verdict = match kind.probe().run(&self.config) {
            Ok(outcome) => Verdict::Completed(outcome),
            Err(err) => {
                tracing::warn!(probe = kind.name(), error = %err, "probe failed");
                Verdict::Errored(format!("{:#}", err))
            }
        };
        ProbeRecord {
            name: kind.name().to_string(),
            verdict,
        }
    }

    /// Run everything `selector` names, writing one status line per name.
    ///
    /// Only a failure to write to `out` is returned, and only once every
    /// selected probe has run; probe failures end up in the records.
    pub fn run<W: Write>(&self, selector: &str, out: &mut W) -> Result<Vec<ProbeRecord>> {
        let mut records = Vec::new();
        let mut write_error: Option<io::Error> = None;
        for name in Self::resolve(selector) {
            let record = match ProbeKind::from_name(&name) {
                Some(kind) => self.run_one(kind),
                None => ProbeRecord {
                    name,
                    verdict: Verdict::Unknown,
                },
            };
            if let Err(err) = writeln!(out, "{}", render(&record)) {
                tracing::warn!(probe = %record.name, error = %err, "status line not written");
                write_error.get_or_insert(err);
            }
            records.push(record);
        }
        match write_error {
            Some(err) => Err(anyhow::Error::new(err).context("writing status lines")),
            None => Ok(records),
        }
    }
}

/// Status line with color by verdict. The text matches [`ProbeRecord::line`].
pub fn render(record: &ProbeRecord) -> ColoredString {
    let line = record.line();
    match &record.verdict {
        Verdict::Completed(outcome) if outcome.is_breach() => line.green(),
        Verdict::Completed(Outcome::ShortRead { .. }) => line.normal(),
        Verdict::Completed(_) => line.yellow(),
        Verdict::Errored(_) => line.red(),
        Verdict::Unknown => line.dimmed(),
    }
}
