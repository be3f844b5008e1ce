// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use patsup_core::ProcessId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("no free port available in the configured range")]
    PortsExhausted,

    /// Transient: exec failed for a reason a retry might clear (`EAGAIN`-class
    /// errors, the child crashing before binding, etc).
    #[error("failed to spawn '{command}': {source}")]
    Io { command: String, #[source] source: std::io::Error },

    /// Permanent: the configured binary doesn't exist. No retry will help.
    #[error("binary not found: '{command}'")]
    BinaryNotFound { command: String },

    /// Permanent: the supervisor lacks permission to execute the binary.
    #[error("permission denied executing '{command}'")]
    PermissionDenied { command: String },

    #[error("failed to signal process {process_id}: {source}")]
    Signal { process_id: ProcessId, #[source] source: std::io::Error },
}

impl SpawnError {
    /// Permanent spawn failures skip the retry/backoff path entirely and
    /// move the record straight to `Terminal("spawn-permanent")`.
    pub fn is_permanent(&self) -> bool {
        matches!(self, SpawnError::BinaryNotFound { .. } | SpawnError::PermissionDenied { .. })
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe dial to {endpoint} failed: {source}")]
    Dial { endpoint: String, #[source] source: tonic::transport::Error },

    #[error("probe call to {endpoint} failed: {status}")]
    Call { endpoint: String, status: tonic::Status },

    #[error("probe to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown pattern '{0}'")]
    UnknownPattern(String),

    #[error("unknown process '{0}'")]
    UnknownProcess(ProcessId),

    #[error(transparent)]
    Isolation(#[from] patsup_core::IsolationError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error("process {0} is already terminating or terminal")]
    NotRunning(ProcessId),

    #[error("timed out waiting for {0} to reach a settled state")]
    DeadlineExceeded(ProcessId),
}
