// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types owned by the core data model. Adapter- and transport-level
//! errors (registry parsing, spawn failures, probe failures, RPC status
//! mapping) live in their respective crates and wrap these where relevant.

use thiserror::Error;

/// Failures from deriving a process identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsolationError {
    #[error("namespace isolation requires a non-empty namespace")]
    MissingNamespace,
    #[error("session isolation requires a non-empty session id")]
    MissingSessionId,
}
