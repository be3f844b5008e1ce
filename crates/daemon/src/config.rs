// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-wide configuration, assembled from `env` at startup. Kept as one
//! immutable value handed to every subsystem rather than re-reading env
//! vars scattered through the codebase.

use crate::env;
use patsup_engine::EngineConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub manifest_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub engine: EngineConfig,
    pub reconcile_tick: std::time::Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            manifest_dir: env::manifest_dir(),
            bind_addr: env::bind_addr(),
            engine: EngineConfig {
                port_range: env::port_range_start()..=env::port_range_end(),
                drain_timeout: env::drain_timeout(),
                terminal_retention: env::terminal_retention(),
                ..EngineConfig::default()
            },
            reconcile_tick: env::reconcile_tick(),
        }
    }
}
