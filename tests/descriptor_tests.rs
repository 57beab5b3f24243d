// SPDX-License-Identifier: PMPL-1.0-or-later

//! Repeated runs must not leak file descriptors.
//!
//! Kept in its own test binary with a single test so no other test opens
//! descriptors while the table is being counted.

#![cfg(target_os = "linux")]

use sandbox_probe::{Outcome, ProbeConfig, ProbeKind};
use std::fs;
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};
use tempfile::TempDir;

const ROUNDS: usize = 32;

fn open_fds() -> usize {
    fs::read_dir("/proc/self/fd").unwrap().count()
}

fn run_rounds(kind: ProbeKind, config: &ProbeConfig, mut after_each: impl FnMut(&Outcome)) {
    for _ in 0..ROUNDS {
        let outcome = kind.probe().run(config).unwrap();
        after_each(&outcome);
    }
}

#[test]
fn test_repeated_runs_release_descriptors() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("secret.txt");
    fs::write(&target, b"daemon:*:19000:0:99999:7:::\n").unwrap();

    let free_port = {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        listener.local_addr().unwrap().port()
    };
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let listening_port = listener.local_addr().unwrap().port();

    let mut config = ProbeConfig {
        target: target.clone(),
        credential_target: target,
        output_dir: dir.path().join("out"),
        connect_addr: SocketAddrV4::new(Ipv4Addr::LOCALHOST, free_port),
        ..ProbeConfig::default()
    };

    // Warm up once so lazily opened descriptors (dynamic loader, etc.) are
    // already counted in the baseline.
    for kind in ProbeKind::ALL {
        kind.probe().run(&config).unwrap();
    }
    let baseline = open_fds();

    run_rounds(ProbeKind::RawConnect, &config, |outcome| {
        assert!(matches!(outcome, Outcome::ConnectFailed { .. }), "{:?}", outcome);
    });
    assert_eq!(open_fds(), baseline, "raw_connect leaked without a listener");

    config.connect_addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, listening_port);
    run_rounds(ProbeKind::RawConnect, &config, |outcome| {
        assert!(matches!(outcome, Outcome::Connected { .. }), "{:?}", outcome);
        drop(listener.accept().unwrap());
    });
    assert_eq!(open_fds(), baseline, "raw_connect leaked with a listener");

    for kind in [ProbeKind::RawRead, ProbeKind::DynRead, ProbeKind::Mmap] {
        run_rounds(kind, &config, |outcome| {
            assert!(outcome.is_breach(), "{:?}", outcome);
        });
        assert_eq!(open_fds(), baseline, "{} leaked", kind.name());
    }

    config.target = dir.path().join("missing");
    run_rounds(ProbeKind::RawRead, &config, |outcome| {
        assert!(matches!(outcome, Outcome::OpenFailed { .. }), "{:?}", outcome);
    });
    assert_eq!(open_fds(), baseline, "raw_read leaked on open failure");
}
