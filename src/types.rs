// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for sandbox-probe

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::PathBuf;

/// Sensitive file every read probe goes after.
pub const DEFAULT_TARGET: &str = "/etc/shadow";

/// Agent credential store the credential read probe goes after.
pub const DEFAULT_CREDENTIAL_TARGET: &str =
    "/home/openclaw/.openclaw/agents/main/agent/auth-profiles.json";

/// Shared directory for captured artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "/tmp/sandbox-probe";

/// Loopback port the connect probe dials.
pub const DEFAULT_CONNECT_PORT: u16 = 19999;

/// Upper bound for a single raw read.
pub const READ_CHUNK: usize = 8192;

/// C library resolved by name for the dynamic-loading probe.
#[cfg(target_os = "linux")]
pub const DEFAULT_LOADER_LIBRARY: &str = "libc.so.6";
#[cfg(target_os = "macos")]
pub const DEFAULT_LOADER_LIBRARY: &str = "libSystem.B.dylib";
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub const DEFAULT_LOADER_LIBRARY: &str = "libc.so";

/// Fixed inputs for one run.
///
/// The binary always uses [`ProbeConfig::default`]; the library API lets
/// callers point the probes somewhere harmless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// File the read probes try to capture
    pub target: PathBuf,
    /// Credential file for `fs_read_cred`
    pub credential_target: PathBuf,
    /// Directory artifacts are written into
    pub output_dir: PathBuf,
    /// Address the connect probe dials
    pub connect_addr: SocketAddrV4,
    /// Shared library the dynamic-loading probe opens by name
    pub loader_library: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target: PathBuf::from(DEFAULT_TARGET),
            credential_target: PathBuf::from(DEFAULT_CREDENTIAL_TARGET),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            connect_addr: SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_CONNECT_PORT),
            loader_library: DEFAULT_LOADER_LIBRARY.to_string(),
        }
    }
}

impl ProbeConfig {
    /// Path of the artifact a probe writes, e.g. `<output_dir>/raw_read.txt`.
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

/// Locally handled result of a probe invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Bytes were read and dumped to an artifact
    Captured { bytes: usize, artifact: PathBuf },
    /// The target was copied wholesale; no byte count is available
    Copied { artifact: PathBuf },
    /// `open` succeeded but `read` returned zero or a negative value
    ShortRead { result: isize },
    /// Raw `open` failed
    OpenFailed { errno: i32 },
    /// Raw `socket` failed
    SocketFailed { errno: i32 },
    /// Raw `connect` failed; expected when nothing listens
    ConnectFailed { errno: i32, addr: SocketAddrV4 },
    /// Raw `connect` succeeded
    Connected { addr: SocketAddrV4 },
    /// Access control stopped the probe
    Denied { reason: String },
}

impl Outcome {
    /// Whether the probe got past the sandbox.
    pub fn is_breach(&self) -> bool {
        matches!(
            self,
            Outcome::Captured { .. } | Outcome::Copied { .. } | Outcome::Connected { .. }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Captured { bytes, artifact } => {
                write!(f, "wrote {} bytes to {}", bytes, artifact.display())
            }
            Outcome::Copied { artifact } => write!(f, "copied to {}", artifact.display()),
            Outcome::ShortRead { result } => write!(f, "read returned {}", result),
            Outcome::OpenFailed { errno } => write!(f, "open failed (errno {})", errno),
            Outcome::SocketFailed { errno } => write!(f, "socket failed (errno {})", errno),
            Outcome::ConnectFailed { errno, .. } => write!(
                f,
                "connect failed (errno {}), expected if no listener",
                errno
            ),
            Outcome::Connected { addr } => write!(f, "connected to {}", addr),
            Outcome::Denied { reason } => write!(f, "permission denied: {}", reason),
        }
    }
}

/// What the dispatcher observed for one selected name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Completed(Outcome),
    /// The probe returned an error the probe itself did not handle
    Errored(String),
    /// The name is not registered
    Unknown,
}

/// One dispatcher entry: the selected name and what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRecord {
    pub name: String,
    pub verdict: Verdict,
}

impl ProbeRecord {
    /// Plain status line, without color.
    pub fn line(&self) -> String {
        match &self.verdict {
            Verdict::Completed(outcome) => format!("[{}] {}", self.name, outcome),
            Verdict::Errored(message) => format!("[{}] error: {}", self.name, message),
            Verdict::Unknown => format!("Unknown attack: {}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_fixed_locations() {
        let config = ProbeConfig::default();
        assert_eq!(config.target, PathBuf::from("/etc/shadow"));
        assert_eq!(config.connect_addr.to_string(), "127.0.0.1:19999");
        assert_eq!(
            config.artifact_path("mmap.txt"),
            PathBuf::from("/tmp/sandbox-probe/mmap.txt")
        );
    }

    #[test]
    fn record_lines_carry_the_probe_tag() {
        let record = ProbeRecord {
            name: "raw_read".to_string(),
            verdict: Verdict::Completed(Outcome::OpenFailed { errno: 13 }),
        };
        assert_eq!(record.line(), "[raw_read] open failed (errno 13)");

        let errored = ProbeRecord {
            name: "copy".to_string(),
            verdict: Verdict::Errored("No such file or directory".to_string()),
        };
        assert_eq!(errored.line(), "[copy] error: No such file or directory");

        let unknown = ProbeRecord {
            name: "nope".to_string(),
            verdict: Verdict::Unknown,
        };
        assert_eq!(unknown.line(), "Unknown attack: nope");

        let denied = ProbeRecord {
            name: "mmap".to_string(),
            verdict: Verdict::Completed(Outcome::Denied {
                reason: "Permission denied (os error 13)".to_string(),
            }),
        };
        assert_eq!(
            denied.line(),
            "[mmap] permission denied: Permission denied (os error 13)"
        );
    }

    #[test]
    fn connect_failure_is_not_a_breach() {
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 1);
        assert!(!Outcome::ConnectFailed { errno: 111, addr }.is_breach());
        assert!(Outcome::Connected { addr }.is_breach());
    }
}
