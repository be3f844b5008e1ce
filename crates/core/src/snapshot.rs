// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only view of a process record, handed to RPC handlers and CLI
//! clients. Never mutated; always constructed fresh from a lock-held copy
//! of the manager's state so a concurrent reader never observes a torn
//! update.

use crate::ids::ProcessId;
use crate::isolation::IsolationLevel;
use crate::process::{ProcessRecord, ProcessState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub process_id: ProcessId,
    pub pattern_name: String,
    pub isolation_level: IsolationLevel,
    pub namespace: Option<String>,
    pub session_id: Option<String>,
    pub state: ProcessState,
    pub os_pid: Option<u32>,
    pub assigned_port: Option<u16>,
    pub spawn_attempts: u32,
    pub consecutive_probe_failures: u32,
    pub created_at_epoch_ms: u64,
    pub updated_at_epoch_ms: u64,
    pub started_at_epoch_ms: Option<u64>,
    pub last_probe_ok_at_epoch_ms: Option<u64>,
    pub last_error: Option<String>,
}

impl From<&ProcessRecord> for ProcessSnapshot {
    fn from(record: &ProcessRecord) -> Self {
        Self {
            process_id: record.process_id.clone(),
            pattern_name: record.pattern_name.clone(),
            isolation_level: record.isolation_key.level,
            namespace: record.isolation_key.namespace.clone(),
            session_id: record.isolation_key.session_id.clone(),
            state: record.state,
            os_pid: record.os_pid,
            assigned_port: record.assigned_port,
            spawn_attempts: record.spawn_attempts,
            consecutive_probe_failures: record.consecutive_probe_failures,
            created_at_epoch_ms: record.created_at_epoch_ms,
            updated_at_epoch_ms: record.updated_at_epoch_ms,
            started_at_epoch_ms: record.started_at_epoch_ms,
            last_probe_ok_at_epoch_ms: record.last_probe_ok_at_epoch_ms,
            last_error: record.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isolation::{IsolationKey, IsolationLevel};

    #[test]
    fn snapshot_mirrors_record_fields() {
        let record = ProcessRecord::new(
            ProcessId::new("shared:hello"),
            "hello",
            IsolationKey {
                pattern_name: "hello".to_string(),
                namespace: None,
                session_id: None,
                level: IsolationLevel::None,
            },
            42,
        );
        let snapshot = ProcessSnapshot::from(&record);
        assert_eq!(snapshot.process_id, record.process_id);
        assert_eq!(snapshot.state, record.state);
        assert_eq!(snapshot.created_at_epoch_ms, 42);
        assert_eq!(snapshot.isolation_level, IsolationLevel::None);
    }

    #[test]
    fn snapshot_carries_isolation_scope() {
        let record = ProcessRecord::new(
            ProcessId::new("ns:tenant-a:hello"),
            "hello",
            IsolationKey {
                pattern_name: "hello".to_string(),
                namespace: Some("tenant-a".to_string()),
                session_id: None,
                level: IsolationLevel::Namespace,
            },
            1,
        );
        let snapshot = ProcessSnapshot::from(&record);
        assert_eq!(snapshot.namespace.as_deref(), Some("tenant-a"));
        assert_eq!(snapshot.isolation_level, IsolationLevel::Namespace);
    }
}
