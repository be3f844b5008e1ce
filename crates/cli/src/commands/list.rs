// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `patsup list` — enumerate live/terminal process records, optionally
//! filtered by pattern, isolation level, or state.

use crate::client::DaemonClient;
use crate::output::{handle_list, OutputFormat};
use crate::view::{print_snapshot_line, ProcessView};

pub async fn handle(
    addr: &str,
    format: OutputFormat,
    pattern_name: Option<String>,
    isolation_level: Option<String>,
    state: Option<String>,
) -> anyhow::Result<()> {
    let mut client = DaemonClient::connect(addr).await?;
    let response = client.list(pattern_name, isolation_level, state).await?;
    let views: Vec<ProcessView> = response.processes.iter().map(ProcessView::from).collect();

    handle_list(format, &views, "No processes found", |views| {
        for view in views {
            print_snapshot_line(view);
        }
    })
}
