// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serializable views over the generated proto types. The generated structs
//! don't derive `Serialize` (they're shared with the wire codec), so JSON
//! output goes through these instead.

use patsup_proto::supervisor::ProcessSnapshot as ProtoSnapshot;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProcessView {
    pub process_id: String,
    pub pattern_name: String,
    pub isolation_level: String,
    pub namespace: Option<String>,
    pub session_id: Option<String>,
    pub state: String,
    pub terminal_reason: Option<String>,
    pub os_pid: Option<u32>,
    pub health_port: Option<u32>,
    pub spawn_attempts: u32,
    pub consecutive_probe_failures: u32,
    pub created_at_epoch_ms: u64,
    pub updated_at_epoch_ms: u64,
    pub started_at_epoch_ms: Option<u64>,
    pub last_probe_ok_at_epoch_ms: Option<u64>,
    pub last_error: Option<String>,
}

impl From<&ProtoSnapshot> for ProcessView {
    fn from(s: &ProtoSnapshot) -> Self {
        Self {
            process_id: s.process_id.clone(),
            pattern_name: s.pattern_name.clone(),
            isolation_level: s.isolation_level.clone(),
            namespace: s.namespace.clone(),
            session_id: s.session_id.clone(),
            state: s.state.clone(),
            terminal_reason: s.terminal_reason.clone(),
            os_pid: s.os_pid,
            health_port: s.health_port,
            spawn_attempts: s.spawn_attempts,
            consecutive_probe_failures: s.consecutive_probe_failures,
            created_at_epoch_ms: s.created_at_epoch_ms,
            updated_at_epoch_ms: s.updated_at_epoch_ms,
            started_at_epoch_ms: s.started_at_epoch_ms,
            last_probe_ok_at_epoch_ms: s.last_probe_ok_at_epoch_ms,
            last_error: s.last_error.clone(),
        }
    }
}

pub fn print_snapshot_line(v: &ProcessView) {
    let scope = match (&v.namespace, &v.session_id) {
        (Some(ns), _) => format!(" ns={ns}"),
        (None, Some(sid)) => format!(" session={sid}"),
        (None, None) => String::new(),
    };
    let port = v.health_port.map(|p| format!(" port={p}")).unwrap_or_default();
    let reason = v.terminal_reason.as_deref().map(|r| format!(" reason={r}")).unwrap_or_default();
    println!(
        "{:<32} {:<16} {:<10}{scope}{port}{reason}",
        v.process_id, v.pattern_name, v.state
    );
}
