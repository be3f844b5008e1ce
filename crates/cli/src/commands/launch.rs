// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `patsup launch` — start (or reuse) a process for a pattern.

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};
use crate::view::{print_snapshot_line, ProcessView};
use std::collections::HashMap;

#[allow(clippy::too_many_arguments)]
pub async fn handle(
    addr: &str,
    format: OutputFormat,
    pattern_name: &str,
    namespace: Option<String>,
    session_id: Option<String>,
    isolation: Option<String>,
    config: Vec<String>,
) -> anyhow::Result<()> {
    let pattern_config = parse_config(&config)?;
    let mut client = DaemonClient::connect(addr).await?;
    let response =
        client.launch(pattern_name, namespace, session_id, isolation, pattern_config).await?;
    let snapshot = response
        .snapshot
        .ok_or_else(|| anyhow::anyhow!("daemon returned a launch response with no snapshot"))?;
    let view = ProcessView::from(&snapshot);

    format_or_json(format, &view, || {
        println!("Launched '{}' as {}", pattern_name, response.process_id);
        print_snapshot_line(&view);
    })
}

fn parse_config(entries: &[String]) -> anyhow::Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for entry in entries {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid --config '{entry}', expected key=value"))?;
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_pairs() {
        let map = parse_config(&["FLAG=1".to_string(), "NAME=hello".to_string()]).unwrap();
        assert_eq!(map.get("FLAG").map(String::as_str), Some("1"));
        assert_eq!(map.get("NAME").map(String::as_str), Some("hello"));
    }

    #[test]
    fn rejects_entry_without_equals() {
        assert!(parse_config(&["bad".to_string()]).is_err());
    }
}
