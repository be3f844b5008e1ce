// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Isolation router: derives a stable process identity from a launch
//! request's (pattern, namespace, session, isolation-level) tuple.
//!
//! This module is intentionally stateless — the concurrency contract ("two
//! concurrent Launch calls for the same derived id result in exactly one
//! spawn attempt") is the ProcessManager's job, not this one's.

use crate::error::IsolationError;
use crate::ids::ProcessId;
use serde::{Deserialize, Serialize};

/// Isolation policy controlling how many distinct processes are created for
/// a pattern across the tenant/session axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    None,
    Namespace,
    Session,
}

impl IsolationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationLevel::None => "none",
            IsolationLevel::Namespace => "namespace",
            IsolationLevel::Session => "session",
        }
    }
}

/// The raw tuple that mapped to a `ProcessId`, retained on the record for
/// audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsolationKey {
    pub pattern_name: String,
    pub namespace: Option<String>,
    pub session_id: Option<String>,
    pub level: IsolationLevel,
}

/// Derive the stable identity string for a launch request.
pub fn derive_process_id(
    pattern_name: &str,
    namespace: Option<&str>,
    session_id: Option<&str>,
    level: IsolationLevel,
) -> Result<ProcessId, IsolationError> {
    match level {
        IsolationLevel::None => Ok(ProcessId::new(format!("shared:{pattern_name}"))),
        IsolationLevel::Namespace => {
            let ns = non_empty(namespace).ok_or(IsolationError::MissingNamespace)?;
            Ok(ProcessId::new(format!("ns:{ns}:{pattern_name}")))
        }
        IsolationLevel::Session => {
            let sid = non_empty(session_id).ok_or(IsolationError::MissingSessionId)?;
            // Namespace deliberately excluded: session IDs are globally unique
            // in the system that invokes this supervisor.
            Ok(ProcessId::new(format!("session:{sid}:{pattern_name}")))
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_shared_across_namespace_and_session() {
        let a = derive_process_id("hello", Some("tenant-a"), None, IsolationLevel::None).unwrap();
        let b = derive_process_id("hello", Some("tenant-b"), None, IsolationLevel::None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "shared:hello");
    }

    #[test]
    fn namespace_level_distinguishes_tenants() {
        let a =
            derive_process_id("hello", Some("tenant-a"), None, IsolationLevel::Namespace).unwrap();
        let b =
            derive_process_id("hello", Some("tenant-b"), None, IsolationLevel::Namespace).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "ns:tenant-a:hello");
    }

    #[test]
    fn namespace_level_requires_namespace() {
        let err = derive_process_id("hello", None, None, IsolationLevel::Namespace).unwrap_err();
        assert_eq!(err, IsolationError::MissingNamespace);
        let err = derive_process_id("hello", Some(""), None, IsolationLevel::Namespace).unwrap_err();
        assert_eq!(err, IsolationError::MissingNamespace);
    }

    #[test]
    fn session_level_ignores_namespace() {
        let a = derive_process_id(
            "hello",
            Some("tenant-a"),
            Some("sess-1"),
            IsolationLevel::Session,
        )
        .unwrap();
        let b = derive_process_id(
            "hello",
            Some("tenant-b"),
            Some("sess-1"),
            IsolationLevel::Session,
        )
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "session:sess-1:hello");
    }

    #[test]
    fn session_level_requires_session_id() {
        let err = derive_process_id("hello", None, None, IsolationLevel::Session).unwrap_err();
        assert_eq!(err, IsolationError::MissingSessionId);
    }

    #[yare::parameterized(
        none      = { IsolationLevel::None, "none" },
        namespace = { IsolationLevel::Namespace, "namespace" },
        session   = { IsolationLevel::Session, "session" },
    )]
    fn as_str_matches_manifest_and_cli_spelling(level: IsolationLevel, expected: &str) {
        assert_eq!(level.as_str(), expected);
    }

    #[yare::parameterized(
        none      = { IsolationLevel::None },
        namespace = { IsolationLevel::Namespace },
        session   = { IsolationLevel::Session },
    )]
    fn serde_roundtrips_through_its_snake_case_spelling(level: IsolationLevel) {
        let json = serde_json::to_string(&level).unwrap();
        let parsed: IsolationLevel = serde_json::from_str(&json).unwrap();
        assert_eq!(level, parsed);
    }
}
