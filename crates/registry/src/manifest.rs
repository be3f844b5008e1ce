// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HCL pattern manifest parsing.
//!
//! A manifest file declares one or more `pattern` blocks:
//!
//! ```hcl
//! pattern "hello" {
//!   command   = "python3"
//!   args      = ["server.py"]
//!   isolation = "namespace"
//!
//!   env = {
//!     LOG_LEVEL = "info"
//!   }
//!
//!   probe {
//!     endpoint           = "127.0.0.1:{port}"
//!     interval_ms        = 5000
//!     timeout_ms         = 2000
//!     failure_threshold  = 3
//!     success_threshold  = 2
//!     terminal_threshold = 5
//!   }
//!
//!   resources {
//!     cpu_millis = 500
//!     memory_mb  = 256
//!   }
//!
//!   max_restart_attempts = 10
//! }
//! ```

use crate::error::RegistryError;
use indexmap::IndexMap;
use patsup_core::{IsolationLevel, Pattern, ProbeConfig, ResourceHints};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    pattern: IndexMap<String, RawPattern>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPattern {
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: IndexMap<String, String>,
    #[serde(default)]
    working_dir: Option<String>,
    #[serde(default = "default_isolation")]
    isolation: String,
    #[serde(default)]
    probe: Option<RawProbe>,
    #[serde(default)]
    resources: Option<RawResources>,
    #[serde(default)]
    max_restart_attempts: Option<u32>,
}

fn default_isolation() -> String {
    "none".to_string()
}

#[derive(Debug, Deserialize)]
struct RawProbe {
    #[serde(default = "default_endpoint")]
    endpoint: String,
    #[serde(default = "default_initial_delay_ms")]
    initial_delay_ms: u64,
    #[serde(default = "default_interval_ms")]
    interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
    #[serde(default = "default_failure_threshold")]
    failure_threshold: u32,
    #[serde(default = "default_success_threshold")]
    success_threshold: u32,
    #[serde(default = "default_terminal_threshold")]
    terminal_threshold: u32,
}

fn default_endpoint() -> String {
    "127.0.0.1:{port}".to_string()
}
fn default_initial_delay_ms() -> u64 {
    1000
}
fn default_interval_ms() -> u64 {
    5000
}
fn default_timeout_ms() -> u64 {
    2000
}
fn default_failure_threshold() -> u32 {
    3
}
fn default_success_threshold() -> u32 {
    2
}
fn default_terminal_threshold() -> u32 {
    5
}

#[derive(Debug, Deserialize)]
struct RawResources {
    cpu_millis: Option<u32>,
    memory_mb: Option<u32>,
}

/// Parse a single manifest file's contents into its declared patterns.
///
/// Returns patterns keyed by name in declaration order, matching the
/// directory scanner's dedup pass against siblings from other files.
pub fn parse_manifest(
    path: &std::path::Path,
    content: &str,
) -> Result<Vec<Pattern>, RegistryError> {
    let parsed: ManifestFile =
        hcl::from_str(content).map_err(|source| RegistryError::Parse { path: path.to_path_buf(), source })?;

    parsed
        .pattern
        .into_iter()
        .map(|(name, raw)| raw_to_pattern(path, name, raw))
        .collect()
}

fn raw_to_pattern(
    path: &std::path::Path,
    name: String,
    raw: RawPattern,
) -> Result<Pattern, RegistryError> {
    let isolation = match raw.isolation.as_str() {
        "none" => IsolationLevel::None,
        "namespace" => IsolationLevel::Namespace,
        "session" => IsolationLevel::Session,
        other => {
            return Err(RegistryError::Invalid {
                name,
                path: path.to_path_buf(),
                message: format!("unknown isolation level '{other}' (expected none, namespace, or session)"),
            })
        }
    };

    if raw.command.trim().is_empty() {
        return Err(RegistryError::Invalid {
            name,
            path: path.to_path_buf(),
            message: "command must not be empty".to_string(),
        });
    }

    let probe = match raw.probe {
        Some(p) => ProbeConfig {
            endpoint_template: p.endpoint,
            initial_delay: Duration::from_millis(p.initial_delay_ms),
            interval: Duration::from_millis(p.interval_ms),
            timeout: Duration::from_millis(p.timeout_ms),
            failure_threshold: p.failure_threshold,
            success_threshold: p.success_threshold,
            terminal_threshold: p.terminal_threshold,
        },
        None => ProbeConfig::default(),
    };

    let resource_hints = raw
        .resources
        .map(|r| ResourceHints { cpu_millis: r.cpu_millis, memory_mb: r.memory_mb })
        .unwrap_or_default();

    Ok(Pattern {
        name,
        command: raw.command,
        args: raw.args,
        env_extra: raw.env.into_iter().collect(),
        working_dir: raw.working_dir,
        isolation,
        probe,
        resource_hints,
        max_restart_attempts: raw.max_restart_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn parses_minimal_pattern() {
        let hcl = r#"
            pattern "hello" {
              command = "python3"
              args    = ["server.py"]
            }
        "#;
        let patterns = parse_manifest(Path::new("test.hcl"), hcl).unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].name, "hello");
        assert_eq!(patterns[0].isolation, IsolationLevel::None);
        assert_eq!(patterns[0].probe.failure_threshold, 3);
    }

    #[test]
    fn parses_full_pattern() {
        let hcl = r#"
            pattern "worker" {
              command   = "worker-bin"
              args      = ["--mode", "fast"]
              isolation = "namespace"

              env = {
                LOG_LEVEL = "debug"
              }

              probe {
                endpoint           = "127.0.0.1:{port}"
                interval_ms        = 1000
                timeout_ms         = 500
                failure_threshold  = 5
                success_threshold  = 1
                terminal_threshold = 8
              }

              resources {
                cpu_millis = 250
                memory_mb  = 128
              }

              max_restart_attempts = 7
            }
        "#;
        let patterns = parse_manifest(Path::new("test.hcl"), hcl).unwrap();
        assert_eq!(patterns.len(), 1);
        let p = &patterns[0];
        assert_eq!(p.isolation, IsolationLevel::Namespace);
        assert_eq!(p.env_extra, vec![("LOG_LEVEL".to_string(), "debug".to_string())]);
        assert_eq!(p.probe.failure_threshold, 5);
        assert_eq!(p.probe.terminal_threshold, 8);
        assert_eq!(p.resource_hints.cpu_millis, Some(250));
        assert_eq!(p.max_restart_attempts, Some(7));
    }

    #[test]
    fn minimal_pattern_defaults_terminal_threshold_above_failure_threshold() {
        let hcl = r#"
            pattern "hello" {
              command = "python3"
            }
        "#;
        let patterns = parse_manifest(Path::new("test.hcl"), hcl).unwrap();
        assert_eq!(patterns[0].probe.terminal_threshold, 5);
    }

    #[test]
    fn rejects_unknown_isolation_level() {
        let hcl = r#"
            pattern "bad" {
              command   = "x"
              isolation = "planet"
            }
        "#;
        let err = parse_manifest(Path::new("test.hcl"), hcl).unwrap_err();
        assert!(matches!(err, RegistryError::Invalid { .. }));
    }

    #[yare::parameterized(
        none      = { "none", IsolationLevel::None },
        namespace = { "namespace", IsolationLevel::Namespace },
        session   = { "session", IsolationLevel::Session },
    )]
    fn accepts_each_documented_isolation_spelling(spelling: &str, expected: IsolationLevel) {
        let hcl = format!(r#"pattern "p" {{ command = "x" isolation = "{spelling}" }}"#);
        let patterns = parse_manifest(Path::new("test.hcl"), &hcl).unwrap();
        assert_eq!(patterns[0].isolation, expected);
    }

    #[test]
    fn rejects_empty_command() {
        let hcl = r#"
            pattern "bad" {
              command = ""
            }
        "#;
        let err = parse_manifest(Path::new("test.hcl"), hcl).unwrap_err();
        assert!(matches!(err, RegistryError::Invalid { .. }));
    }
}
