// SPDX-License-Identifier: PMPL-1.0-or-later

//! TCP connect through direct libc calls with a hand-built `sockaddr_in`

use super::{last_errno, FdGuard, Probe};
use crate::types::{Outcome, ProbeConfig};
use anyhow::Result;
use std::mem;
use std::net::SocketAddrV4;

pub struct RawConnect;

impl Probe for RawConnect {
    fn run(&self, config: &ProbeConfig) -> Result<Outcome> {
        let addr = config.connect_addr;

        let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_STREAM, 0) };
        if fd < 0 {
            return Ok(Outcome::SocketFailed { errno: last_errno() });
        }
        let fd = FdGuard(fd);

        let sa = sockaddr_in(&addr);
        let ret = unsafe {
            libc::connect(
                fd.raw(),
                &sa as *const libc::sockaddr_in as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
            )
        };

        if ret < 0 {
            let errno = last_errno();
            tracing::debug!(%addr, errno, "raw connect failed");
            Ok(Outcome::ConnectFailed { errno, addr })
        } else {
            Ok(Outcome::Connected { addr })
        }
    }
}

/// Family, port in network order, 4-byte address, zero padding.
fn sockaddr_in(addr: &SocketAddrV4) -> libc::sockaddr_in {
    // Zeroing first covers sin_zero and any platform-specific fields.
    let mut sa: libc::sockaddr_in = unsafe { mem::zeroed() };
    #[cfg(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    ))]
    {
        sa.sin_len = mem::size_of::<libc::sockaddr_in>() as u8;
    }
    sa.sin_family = libc::AF_INET as libc::sa_family_t;
    sa.sin_port = addr.port().to_be();
    sa.sin_addr = libc::in_addr {
        s_addr: u32::from_ne_bytes(addr.ip().octets()),
    };
    sa
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn sockaddr_layout_is_network_order() {
        let sa = sockaddr_in(&SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 19999));
        assert_eq!(sa.sin_family, libc::AF_INET as libc::sa_family_t);
        assert_eq!(sa.sin_port.to_ne_bytes(), 19999u16.to_be_bytes());
        assert_eq!(sa.sin_addr.s_addr.to_ne_bytes(), [127, 0, 0, 1]);
        assert_eq!(sa.sin_zero, [0; 8]);
    }
}
