// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders shared by this crate's own tests and by downstream crates'
//! test-support features. Gated the same way the teacher gates its adapter
//! fakes: behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::isolation::{IsolationKey, IsolationLevel};
use crate::pattern::{Pattern, ProbeConfig, ResourceHints};
use crate::process::ProcessRecord;
use crate::ProcessId;
use std::time::Duration;

/// A minimal, deterministic pattern for unit tests: no isolation, a short
/// probe interval, a bounded restart budget.
pub fn sample_pattern(name: &str) -> Pattern {
    Pattern {
        name: name.to_string(),
        command: "/bin/true".to_string(),
        args: Vec::new(),
        env_extra: Vec::new(),
        working_dir: None,
        isolation: IsolationLevel::None,
        probe: ProbeConfig {
            endpoint_template: "127.0.0.1:{port}".to_string(),
            initial_delay: Duration::from_millis(10),
            interval: Duration::from_millis(50),
            timeout: Duration::from_millis(20),
            failure_threshold: 1,
            success_threshold: 1,
            terminal_threshold: 3,
        },
        resource_hints: ResourceHints::default(),
        max_restart_attempts: Some(3),
    }
}

pub fn sample_record(name: &str) -> ProcessRecord {
    let key = IsolationKey {
        pattern_name: name.to_string(),
        namespace: None,
        session_id: None,
        level: IsolationLevel::None,
    };
    ProcessRecord::new(ProcessId::new(format!("shared:{name}")), name, key, 1_000)
}
