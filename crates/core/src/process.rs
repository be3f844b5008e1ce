// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process record and state machine.

use crate::ids::ProcessId;
use crate::isolation::IsolationKey;
use serde::{Deserialize, Serialize};

/// Why a process record reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    /// Stopped on an explicit `Terminate` call.
    Requested,
    /// `spawn_attempts` reached the pattern's `max_restart_attempts` before a
    /// single successful probe.
    SpawnExhausted,
    /// The spawn failed in a way no retry could fix (binary missing,
    /// permission denied). Reached directly from `Pending`, no backoff.
    SpawnPermanent,
    /// `consecutive_probe_failures` reached the pattern's terminal threshold
    /// (`F_terminal`) while `Running` or `Degraded`.
    HealthCircuitOpen,
    /// The OS process exited on its own while the record was live.
    ChildExited,
    /// The registry no longer carries a manifest for this pattern. Not
    /// reachable today (no hot-reload in scope) but kept as a backstop for a
    /// lookup that should never fail.
    PatternRemoved,
    /// The supervisor process itself is shutting down; the child was given
    /// its configured grace period.
    SupervisorShutdown,
    /// The supervisor is shutting down and this record's stop did not
    /// complete within the hard shutdown deadline; abandoned rather than
    /// awaited further.
    SupervisorShutdownForce,
}

impl TerminalReason {
    /// The wire/log string spec.md uses for each reason, e.g. `"spawn-exhausted"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalReason::Requested => "requested",
            TerminalReason::SpawnExhausted => "spawn-exhausted",
            TerminalReason::SpawnPermanent => "spawn-permanent",
            TerminalReason::HealthCircuitOpen => "health-circuit-open",
            TerminalReason::ChildExited => "child-exited",
            TerminalReason::PatternRemoved => "pattern-removed",
            TerminalReason::SupervisorShutdown => "supervisor-shutdown",
            TerminalReason::SupervisorShutdownForce => "supervisor-shutdown-force",
        }
    }
}

/// The process lifecycle state machine. `Terminal` carries the reason it
/// stopped; every other state is reachable from the reconciler's normal
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProcessState {
    /// Accepted by the manager, not yet handed to the spawner.
    Pending,
    /// Spawn in flight; the OS process may or may not exist yet.
    Starting,
    /// Child is alive and has either passed its first probe or has no probe
    /// configured.
    Running,
    /// Child is alive but has failed `failure_threshold` consecutive probes.
    Degraded,
    /// A stop sequence (SIGTERM, then SIGKILL after the drain timeout) is in
    /// flight.
    Terminating,
    /// No further transitions occur; retained until garbage-collected.
    Terminal { reason: TerminalReason },
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Terminal { .. })
    }

    pub fn is_running_or_degraded(&self) -> bool {
        matches!(self, ProcessState::Running | ProcessState::Degraded)
    }

    /// Live states carry a `child_handle`/`health_port` per the data-model
    /// invariants: `Starting`, `Running`, `Degraded`, `Terminating`.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            ProcessState::Starting
                | ProcessState::Running
                | ProcessState::Degraded
                | ProcessState::Terminating
        )
    }
}

/// The full mutable record the manager holds for one logical process.
/// Concurrent readers only ever see this via a `ProcessSnapshot` copy taken
/// under the manager's lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub process_id: ProcessId,
    pub pattern_name: String,
    pub isolation_key: IsolationKey,
    pub state: ProcessState,
    pub os_pid: Option<u32>,
    pub assigned_port: Option<u16>,
    /// Consecutive failed `Spawn` attempts since the last successful
    /// `Running` transition; reset to 0 on entering `Running`.
    pub spawn_attempts: u32,
    pub consecutive_probe_failures: u32,
    pub consecutive_probe_successes: u32,
    pub created_at_epoch_ms: u64,
    pub updated_at_epoch_ms: u64,
    pub started_at_epoch_ms: Option<u64>,
    pub last_probe_ok_at_epoch_ms: Option<u64>,
    /// Most recent error message observed for this process (spawn failure,
    /// probe failure, or unexpected exit); cleared on a successful probe.
    pub last_error: Option<String>,
    /// Set when a stop sequence begins (`Terminating`); carries the reason
    /// the eventual `Terminal` transition should record. `WorkItem`s have no
    /// payload beyond `(process_id, action)`, so the reason rides on the
    /// record instead of the queued `Stop` tick.
    pub pending_stop_reason: Option<TerminalReason>,
}

impl ProcessRecord {
    pub fn new(
        process_id: ProcessId,
        pattern_name: impl Into<String>,
        isolation_key: IsolationKey,
        now_epoch_ms: u64,
    ) -> Self {
        Self {
            process_id,
            pattern_name: pattern_name.into(),
            isolation_key,
            state: ProcessState::Pending,
            os_pid: None,
            assigned_port: None,
            spawn_attempts: 0,
            consecutive_probe_failures: 0,
            consecutive_probe_successes: 0,
            created_at_epoch_ms: now_epoch_ms,
            updated_at_epoch_ms: now_epoch_ms,
            started_at_epoch_ms: None,
            last_probe_ok_at_epoch_ms: None,
            last_error: None,
            pending_stop_reason: None,
        }
    }
}
