// SPDX-License-Identifier: PMPL-1.0-or-later

//! sandbox-probe: checks whether a sandbox blocks access to a protected file
//! and to the loopback network when the access goes through alternate code
//! paths.
//!
//! PROBES:
//! 1. **raw_read**: `open`/`read` straight through libc.
//! 2. **raw_connect**: `socket`/`connect` with a hand-built `sockaddr_in`.
//! 3. **dyn_read**: libc I/O resolved at run time via `dlopen`/`dlsym`.
//! 4. **copy**: whole-file copy into the output directory.
//! 5. **mmap**: read-only memory map of the target.
//! 6. **fs_read**: plain `std::fs` read, the baseline.
//! 7. **fs_read_cred**: plain `std::fs` read of the agent credential file.
//!
//! Probes are independent and run one after another. A probe that fails is
//! reported and the rest still run.

pub mod dispatch;
pub mod probes;
pub mod sink;
pub mod types;

pub use dispatch::Dispatcher;
pub use probes::{Probe, ProbeKind};
pub use types::{Outcome, ProbeConfig, ProbeRecord, Verdict};
