// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `patsupd`: launches, isolates, monitors, and terminates pattern
//! subprocesses on behalf of gRPC clients. See `patsup-daemon`'s crate docs
//! for the library entry points this binary is a thin shim over.

use patsup_daemon::{init_logging, run, wait_for_shutdown_signal, Config};
use tokio_util::sync::CancellationToken;
use tracing::error;

#[tokio::main]
async fn main() {
    init_logging();

    let config = Config::from_env();
    let shutdown = CancellationToken::new();

    let signal_task = tokio::spawn(wait_for_shutdown_signal(shutdown.clone()));

    if let Err(err) = run(config, shutdown).await {
        error!(error = %err, "daemon exited with error");
        signal_task.abort();
        std::process::exit(1);
    }
}
