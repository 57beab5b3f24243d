// SPDX-License-Identifier: PMPL-1.0-or-later

//! File read through I/O entry points resolved at run time
//!
//! The C library is opened by name with `dlopen` and `open`/`read`/`close`
//! are looked up with `dlsym`, so no direct reference to the I/O functions
//! exists in this code path.

use super::{denied_or, Probe};
use crate::sink;
use crate::types::{Outcome, ProbeConfig, READ_CHUNK};
use anyhow::{anyhow, bail, Context, Result};
use std::ffi::{CStr, CString};
use std::io;
use std::os::raw::{c_char, c_int, c_void};
use std::os::unix::ffi::OsStrExt;

pub const ARTIFACT: &str = "dyn_read.txt";

type OpenFn = unsafe extern "C" fn(*const c_char, c_int, ...) -> c_int;
type ReadFn = unsafe extern "C" fn(c_int, *mut c_void, usize) -> isize;
type CloseFn = unsafe extern "C" fn(c_int) -> c_int;

pub struct DynRead;

impl Probe for DynRead {
    fn run(&self, config: &ProbeConfig) -> Result<Outcome> {
        sink::ensure_output_ready(&config.output_dir)?;

        let library = Library::open(&config.loader_library)?;
        let file_io = FileIo::resolve(&library)?;

        let c_path = CString::new(config.target.as_os_str().as_bytes())
            .with_context(|| format!("target path contains NUL: {}", config.target.display()))?;

        let data = match denied_or(file_io.read_file(&c_path))
            .with_context(|| format!("reading {}", config.target.display()))?
        {
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

/// `dlopen` handle, closed on drop.
struct Library {
    handle: *mut c_void,
}

impl Library {
    fn open(name: &str) -> Result<Self> {
        let c_name = CString::new(name).context("library name contains NUL")?;
        let handle = unsafe {
            libc::dlerror();
            libc::dlopen(c_name.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL)
        };
        if handle.is_null() {
            bail!("dlopen {} failed: {}", name, dl_error());
        }
        tracing::debug!(library = name, "library loaded");
        Ok(Self { handle })
    }

    fn symbol(&self, name: &str) -> Result<*mut c_void> {
        let c_name = CString::new(name).context("symbol name contains NUL")?;
        let sym = unsafe {
            libc::dlerror();
            libc::dlsym(self.handle, c_name.as_ptr())
        };
        if sym.is_null() {
            return Err(anyhow!("dlsym {} failed: {}", name, dl_error()));
        }
        Ok(sym)
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        unsafe { libc::dlclose(self.handle) };
    }
}

fn dl_error() -> String {
    let err = unsafe { libc::dlerror() };
    if err.is_null() {
        "unknown error".to_string()
    } else {
        unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned()
    }
}

/// Entry points borrowed from a loaded [`Library`].
struct FileIo<'lib> {
    open: OpenFn,
    read: ReadFn,
    close: CloseFn,
    _library: &'lib Library,
}

impl<'lib> FileIo<'lib> {
    fn resolve(library: &'lib Library) -> Result<Self> {
        // SAFETY: the symbols are the C library's open/read/close, whose
        // signatures match the aliases above.
        unsafe {
            Ok(Self {
                open: std::mem::transmute::<*mut c_void, OpenFn>(library.symbol("open")?),
                read: std::mem::transmute::<*mut c_void, ReadFn>(library.symbol("read")?),
                close: std::mem::transmute::<*mut c_void, CloseFn>(library.symbol("close")?),
                _library: library,
            })
        }
    }

    /// One open, one read of up to [`READ_CHUNK`] bytes, one close.
    fn read_file(&self, path: &CStr) -> io::Result<Vec<u8>> {
        let fd = unsafe { (self.open)(path.as_ptr(), libc::O_RDONLY) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }

        let mut buf = vec![0u8; READ_CHUNK];
        let n = unsafe { (self.read)(fd, buf.as_mut_ptr() as *mut c_void, buf.len()) };
        let read_err = io::Error::last_os_error();
        unsafe { (self.close)(fd) };

        if n < 0 {
            return Err(read_err);
        }
        buf.truncate(n as usize);
        Ok(buf)
    }
}
