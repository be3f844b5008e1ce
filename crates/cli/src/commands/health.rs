// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `patsup health` — aggregate process counts by state and isolation level.

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};
use crate::view::{print_snapshot_line, ProcessView};
use serde::Serialize;

#[derive(Serialize)]
struct HealthView {
    total: u32,
    pending: u32,
    starting: u32,
    running: u32,
    degraded: u32,
    terminating: u32,
    terminal: u32,
    isolation_none: u32,
    isolation_namespace: u32,
    isolation_session: u32,
    processes: Vec<ProcessView>,
}

pub async fn handle(addr: &str, format: OutputFormat, include_processes: bool) -> anyhow::Result<()> {
    let mut client = DaemonClient::connect(addr).await?;
    let response = client.health(include_processes).await?;
    let by_state = response.by_state.unwrap_or_default();
    let isolation = response.isolation_distribution.unwrap_or_default();
    let processes: Vec<ProcessView> = response.processes.iter().map(ProcessView::from).collect();

    let view = HealthView {
        total: response.total,
        pending: by_state.pending,
        starting: by_state.starting,
        running: by_state.running,
        degraded: by_state.degraded,
        terminating: by_state.terminating,
        terminal: by_state.terminal,
        isolation_none: isolation.none,
        isolation_namespace: isolation.namespace,
        isolation_session: isolation.session,
        processes,
    };

    format_or_json(format, &view, || {
        println!(
            "total={} pending={} starting={} running={} degraded={} terminating={} terminal={}",
            view.total,
            view.pending,
            view.starting,
            view.running,
            view.degraded,
            view.terminating,
            view.terminal
        );
        println!(
            "isolation: none={} namespace={} session={}",
            view.isolation_none, view.isolation_namespace, view.isolation_session
        );
        for process in &view.processes {
            print_snapshot_line(process);
        }
    })
}
