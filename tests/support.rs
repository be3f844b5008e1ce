// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared black-box test harness: spawns a real `patsupd` against a
//! throwaway manifest directory and port range, and drives it through the
//! `patsup` CLI exactly the way an operator would.

use assert_cmd::Command;
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::Child;
use std::time::{Duration, Instant};

pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// Poll `predicate` until it's true or `max_ms` elapses, returning whether
/// it ever succeeded.
pub fn wait_for(max_ms: u64, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if predicate() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Grab an ephemeral port from the OS by binding and immediately releasing
/// it. Racy against other processes in principle; good enough for tests
/// serialized with `#[serial]`.
pub fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .expect("local_addr")
        .port()
}

fn patsupd_binary() -> PathBuf {
    assert_cmd::cargo::cargo_bin("patsupd")
}

/// Absolute path to the built `echo-health` fixture binary, for embedding
/// into generated pattern manifests.
pub fn echo_health_binary() -> PathBuf {
    assert_cmd::cargo::cargo_bin("echo-health")
}

/// A running `patsupd` instance bound to its own loopback port with its own
/// manifest directory. Killed on drop.
pub struct Daemon {
    child: Child,
    addr: String,
    _manifest_dir: tempfile::TempDir,
}

impl Daemon {
    /// Start a daemon whose manifest directory contains one `<name>.hcl`
    /// file per `(name, body)` pair in `patterns`.
    pub fn start(patterns: &[(&str, String)]) -> Self {
        let manifest_dir = tempfile::tempdir().expect("manifest tempdir");
        for (name, body) in patterns {
            std::fs::write(manifest_dir.path().join(format!("{name}.hcl")), body)
                .expect("write pattern manifest");
        }

        let bind_port = free_port();
        let addr = format!("127.0.0.1:{bind_port}");
        let port_range_start = free_port();
        let port_range_end = port_range_start.saturating_add(20);

        let child = std::process::Command::new(patsupd_binary())
            .env("PATSUP_MANIFEST_DIR", manifest_dir.path())
            .env("PATSUP_BIND_ADDR", &addr)
            .env("PATSUP_PORT_RANGE_START", port_range_start.to_string())
            .env("PATSUP_PORT_RANGE_END", port_range_end.to_string())
            .env("PATSUP_DRAIN_TIMEOUT_MS", "200")
            .env("PATSUP_RECONCILE_TICK_MS", "20")
            .env("RUST_LOG", "warn")
            .spawn()
            .expect("spawn patsupd");

        let daemon = Self { child, addr, _manifest_dir: manifest_dir };

        let listening = wait_for(SPEC_WAIT_MAX_MS, || TcpStream::connect(&daemon.addr).is_ok());
        assert!(listening, "patsupd never started listening on {}", daemon.addr);
        daemon
    }

    /// A `patsup` CLI invocation pre-pointed at this daemon.
    pub fn patsup(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("patsup"));
        cmd.arg("--addr").arg(format!("http://{}", self.addr));
        cmd
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A minimal `echo-health` pattern manifest body. `mode` sets
/// `ECHO_HEALTH_MODE` for the spawned fixture; `None` leaves it at the
/// fixture's own `healthy` default.
pub fn echo_pattern_hcl(name: &str, isolation: &str, mode: Option<&str>) -> String {
    let env_block = match mode {
        Some(mode) => format!("\n  env = {{\n    ECHO_HEALTH_MODE = \"{mode}\"\n  }}"),
        None => String::new(),
    };
    format!(
        r#"pattern "{name}" {{
  command   = "{command}"
  isolation = "{isolation}"{env_block}

  probe {{
    endpoint           = "127.0.0.1:{{port}}"
    initial_delay_ms   = 50
    interval_ms        = 50
    timeout_ms         = 200
    failure_threshold  = 2
    success_threshold  = 1
    terminal_threshold = 4
  }}
}}
"#,
        command = echo_health_binary().display(),
    )
}
