// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pattern data model: an immutable, registry-loaded description of a
//! runnable child process template. Patterns are never mutated at runtime —
//! editing a manifest and reloading the registry produces a new `Pattern`
//! value entirely.

use crate::isolation::IsolationLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A health-probe configuration: how the supervisor decides a started child
/// is actually ready to serve traffic, and how it keeps checking afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// gRPC target the health probe dials, e.g. `127.0.0.1:{port}`.
    pub endpoint_template: String,
    pub initial_delay: Duration,
    pub interval: Duration,
    pub timeout: Duration,
    /// Consecutive probe failures before a `Running` process is marked
    /// `Degraded` (`F_degraded` in spec terms).
    pub failure_threshold: u32,
    /// Consecutive probe successes before a `Degraded` process recovers to
    /// `Running`. Spec default is 1 (a single success suffices); raising it
    /// is a per-pattern policy knob.
    pub success_threshold: u32,
    /// Consecutive probe failures, from any live state, before the circuit
    /// breaker forces a stop (`F_terminal` in spec terms). Must be
    /// `>= failure_threshold` to have any effect.
    pub terminal_threshold: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            endpoint_template: "127.0.0.1:{port}".to_string(),
            initial_delay: Duration::from_secs(1),
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(5),
            failure_threshold: 1,
            success_threshold: 1,
            terminal_threshold: 5,
        }
    }
}

/// Declarative resource hints passed through to the spawner. The supervisor
/// does not enforce cgroup limits itself (no-goal); these are surfaced to
/// the child via environment variables and to operators via `List`/`Health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceHints {
    pub cpu_millis: Option<u32>,
    pub memory_mb: Option<u32>,
}

/// An immutable pattern template loaded from a manifest directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment variables merged over the supervisor's own base
    /// environment; later entries win on key collision.
    pub env_extra: Vec<(String, String)>,
    pub working_dir: Option<String>,
    pub isolation: IsolationLevel,
    pub probe: ProbeConfig,
    pub resource_hints: ResourceHints,
    /// Maximum consecutive restart attempts before the process is parked in
    /// a terminal `CrashLoop` state; `None` means unlimited.
    pub max_restart_attempts: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_config_default_thresholds_are_sane() {
        let probe = ProbeConfig::default();
        assert!(probe.failure_threshold >= 1);
        assert!(probe.success_threshold >= 1);
        assert!(probe.terminal_threshold >= probe.failure_threshold);
        assert!(probe.timeout < probe.interval);
    }
}
