// SPDX-License-Identifier: PMPL-1.0-or-later

//! Probe registry
//!
//! Each probe tries to reach a protected resource through a different code
//! path. Probes share nothing but the [`ProbeConfig`] and the output
//! directory.

pub mod copy;
pub mod dyn_read;
pub mod fs_read;
pub mod mmap;
pub mod raw_connect;
pub mod raw_read;

use crate::types::{Outcome, ProbeConfig};
use anyhow::Result;
use std::io;

/// A single attempt at one access path.
pub trait Probe {
    /// Run once. Expected failures come back as an [`Outcome`]; anything
    /// else is an error for the dispatcher to report.
    fn run(&self, config: &ProbeConfig) -> Result<Outcome>;
}

/// Every registered probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    RawRead,
    RawConnect,
    DynRead,
    Copy,
    Mmap,
    FsRead,
    FsReadCred,
}

impl ProbeKind {
    /// Registry in run order for `all`.
    pub const ALL: [ProbeKind; 7] = [
        ProbeKind::RawRead,
        ProbeKind::RawConnect,
        ProbeKind::DynRead,
        ProbeKind::Copy,
        ProbeKind::Mmap,
        ProbeKind::FsRead,
        ProbeKind::FsReadCred,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProbeKind::RawRead => "raw_read",
            ProbeKind::RawConnect => "raw_connect",
            ProbeKind::DynRead => "dyn_read",
            ProbeKind::Copy => "copy",
            ProbeKind::Mmap => "mmap",
            ProbeKind::FsRead => "fs_read",
            ProbeKind::FsReadCred => "fs_read_cred",
        }
    }

    /// Exact-name lookup; no case folding.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn probe(&self) -> &'static dyn Probe {
        match self {
            ProbeKind::RawRead => &raw_read::RawRead,
            ProbeKind::RawConnect => &raw_connect::RawConnect,
            ProbeKind::DynRead => &dyn_read::DynRead,
            ProbeKind::Copy => &copy::Copy,
            ProbeKind::Mmap => &mmap::Mmap,
            ProbeKind::FsRead => &fs_read::FsRead,
            ProbeKind::FsReadCred => &fs_read::FsReadCred,
        }
    }
}

/// Descriptor closed on drop, so every exit path releases it.
pub(crate) struct FdGuard(libc::c_int);

impl FdGuard {
    pub(crate) fn raw(&self) -> libc::c_int {
        self.0
    }
}

impl Drop for FdGuard {
    fn drop(&mut self) {
        if self.0 >= 0 {
            unsafe { libc::close(self.0) };
        }
    }
}

/// errno left behind by the last failed libc call.
pub(crate) fn last_errno() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Turn a permission error (`EACCES`, `EPERM`) into [`Outcome::Denied`];
/// pass everything else on.
pub fn denied_or<T>(result: io::Result<T>) -> Result<std::result::Result<T, Outcome>> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => Ok(Err(Outcome::Denied {
            reason: err.to_string(),
        })),
        Err(err) => Err(err.into()),
    }
}
