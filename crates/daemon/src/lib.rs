// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! patsupd: the pattern process supervisor daemon binary's library half.
//! `main.rs` is a thin shim over [`run`] so integration tests (and the CLI,
//! for a future embedded-daemon mode) can drive startup without forking a
//! real process.

pub mod config;
pub mod env;
pub mod error;
pub mod service;

pub use config::Config;
pub use error::DaemonError;

use patsup_core::SystemClock;
use patsup_engine::{GrpcHealthProbe, ProcessManager, RealSpawner};
use patsup_proto::supervisor::pattern_supervisor_server::PatternSupervisorServer;
use patsup_registry::Registry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tracing::{info, warn};

/// Construct the process manager and run the daemon until `shutdown` is
/// cancelled, then drain every live process and return. Split out from
/// `main` so tests can supply their own `CancellationToken` instead of
/// waiting on OS signals.
pub async fn run(config: Config, shutdown: CancellationToken) -> Result<(), DaemonError> {
    let registry = Arc::new(Registry::load_dir(&config.manifest_dir)?);
    info!(dir = %config.manifest_dir.display(), patterns = registry.len(), "registry loaded");

    let manager = ProcessManager::new(
        registry,
        Arc::new(RealSpawner),
        Arc::new(GrpcHealthProbe::new()),
        SystemClock,
        config.engine.clone(),
    );

    let reconcile_handle = {
        let manager = manager.clone();
        let tick = config.reconcile_tick;
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = manager.run_reconcile_loop(tick) => {}
                _ = shutdown.cancelled() => {}
            }
        })
    };

    let service = service::SupervisorService::new(manager.clone(), config.engine.default_launch_deadline);
    let server = Server::builder()
        .add_service(PatternSupervisorServer::new(service))
        .serve_with_shutdown(config.bind_addr, shutdown.clone().cancelled_owned());

    info!(addr = %config.bind_addr, "control plane listening");
    server.await.map_err(DaemonError::Transport)?;

    info!("serving stopped, draining live processes");
    manager.shutdown(config.engine.drain_timeout).await;
    reconcile_handle.abort();
    Ok(())
}

/// Wait for SIGTERM or SIGINT (or Ctrl-C on platforms without `signal`),
/// then cancel `token`. Intended to be spawned alongside [`run`].
pub async fn wait_for_shutdown_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                return;
            }
        };
        let mut int = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, "failed to install SIGINT handler");
                return;
            }
        };
        tokio::select! {
            _ = term.recv() => info!("received SIGTERM"),
            _ = int.recv() => info!("received SIGINT"),
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("received ctrl-c");
    }
    token.cancel();
}

/// Initialize `tracing-subscriber` once, honoring `RUST_LOG`/`PATSUP_LOG`.
pub fn init_logging() {
    let filter = std::env::var("PATSUP_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .try_init();
}
