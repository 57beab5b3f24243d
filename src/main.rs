// SPDX-License-Identifier: PMPL-1.0-or-later

//! sandbox-probe CLI
//!
//! Always exits 0. Outcomes are reported as text on stdout, never through
//! the exit status, so the tool can run unattended inside a sandbox.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use sandbox_probe::dispatch::{self, Dispatcher};
use sandbox_probe::ProbeConfig;
use std::env;
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sandbox-probe")]
#[command(version)]
#[command(about = "Try to reach a protected file and the loopback network through alternate code paths")]
#[command(long_about = None)]
struct Cli {
    /// Probe to run (raw_read, raw_connect, dyn_read, copy, mmap, fs_read, fs_read_cred) or "all"
    #[arg(value_name = "PROBE", default_value = dispatch::ALL)]
    probe: String,
}

fn main() {
    init_tracing();

    let selector = match Cli::try_parse() {
        Ok(cli) => cli.probe,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            // Stray flags or extra words: run the first word and ignore the rest.
            let _ = err.print();
            let selector = fallback_selector(
                env::args_os()
                    .skip(1)
                    .map(|arg| arg.to_string_lossy().into_owned()),
            );
            tracing::warn!(%selector, "argument error; running first argument only");
            selector
        }
    };

    if let Err(err) = run(&selector) {
        eprintln!("sandbox-probe: {:#}", err);
    }
}

/// First argument as given, or `all` when there is none.
fn fallback_selector<I: Iterator<Item = String>>(mut args: I) -> String {
    args.next().unwrap_or_else(|| dispatch::ALL.to_string())
}

fn run(selector: &str) -> Result<()> {
    let dispatcher = Dispatcher::new(ProbeConfig::default());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    dispatcher.run(selector, &mut out)?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
