// SPDX-License-Identifier: PMPL-1.0-or-later

//! File read through direct libc calls, bypassing `std::fs`

use super::{last_errno, FdGuard, Probe};
use crate::sink;
use crate::types::{Outcome, ProbeConfig, READ_CHUNK};
use anyhow::{Context, Result};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;

pub const ARTIFACT: &str = "raw_read.txt";

pub struct RawRead;

impl Probe for RawRead {
    fn run(&self, config: &ProbeConfig) -> Result<Outcome> {
        sink::ensure_output_ready(&config.output_dir)?;

        let c_path = CString::new(config.target.as_os_str().as_bytes())
            .with_context(|| format!("target path contains NUL: {}", config.target.display()))?;

        let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_RDONLY) };
        if fd < 0 {
            let errno = last_errno();
            tracing::debug!(errno, "raw open refused");
            return Ok(Outcome::OpenFailed { errno });
        }
        let fd = FdGuard(fd);

        let mut buf = vec![0u8; READ_CHUNK];
        let n = unsafe { libc::read(fd.raw(), buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        let read_errno = if n < 0 { last_errno() } else { 0 };
        drop(fd);

        if n <= 0 {
            tracing::debug!(result = n, errno = read_errno, "raw read returned nothing");
            return Ok(Outcome::ShortRead { result: n });
        }

        let bytes = n as usize;
        let artifact = sink::write_artifact(&config.output_dir, ARTIFACT, &buf[..bytes])?;
        Ok(Outcome::Captured { bytes, artifact })
    }
}
