// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `patsup terminate` — request a graceful stop, falling back to a kill
//! after the grace period.

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};
use crate::view::{print_snapshot_line, ProcessView};

pub async fn handle(
    addr: &str,
    format: OutputFormat,
    process_id: &str,
    grace_period_seconds: Option<u32>,
) -> anyhow::Result<()> {
    let mut client = DaemonClient::connect(addr).await?;
    let response = client.terminate(process_id, grace_period_seconds).await?;
    let snapshot = response
        .snapshot
        .ok_or_else(|| anyhow::anyhow!("daemon returned a terminate response with no snapshot"))?;
    let view = ProcessView::from(&snapshot);

    format_or_json(format, &view, || {
        println!("Terminating {}", response.process_id);
        print_snapshot_line(&view);
    })
}
