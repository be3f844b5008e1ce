// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Directory scanned for `*.hcl` pattern manifests.
/// `PATSUP_MANIFEST_DIR` > `XDG_CONFIG_HOME/patsup/patterns` > `~/.config/patsup/patterns`.
pub fn manifest_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PATSUP_MANIFEST_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("patsup/patterns");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/root".to_string());
    PathBuf::from(home).join(".config/patsup/patterns")
}

/// Address the gRPC control plane binds to.
pub fn bind_addr() -> SocketAddr {
    std::env::var("PATSUP_BIND_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| "127.0.0.1:7600".parse().expect("default bind addr is valid"))
}

/// Low end of the port range handed to spawned children.
pub fn port_range_start() -> u16 {
    std::env::var("PATSUP_PORT_RANGE_START").ok().and_then(|s| s.parse().ok()).unwrap_or(50100)
}

/// High end (inclusive) of the port range handed to spawned children.
pub fn port_range_end() -> u16 {
    std::env::var("PATSUP_PORT_RANGE_END").ok().and_then(|s| s.parse().ok()).unwrap_or(50999)
}

/// Grace period between SIGTERM and SIGKILL on `Terminate`.
pub fn drain_timeout() -> Duration {
    std::env::var("PATSUP_DRAIN_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

/// How long a terminal process record survives before it's garbage collected.
pub fn terminal_retention() -> Duration {
    std::env::var("PATSUP_TERMINAL_RETENTION_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(24 * 3600))
}

/// How often the reconcile loop wakes up even with no known deadline, so a
/// stuck clock or missed wakeup can't wedge the daemon indefinitely.
pub fn reconcile_tick() -> Duration {
    std::env::var("PATSUP_RECONCILE_TICK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(250))
}
