// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `echo-health`: a minimal pattern binary used to exercise the supervisor
//! end to end. It reads the standard pattern contract env vars, serves the
//! `PatternHealth` RPC on `HEALTH_PORT`, and can be told via `ECHO_HEALTH_MODE`
//! to misbehave in the specific ways the supervisor is supposed to handle.
//!
//! Modes (`ECHO_HEALTH_MODE`, default `healthy`):
//!   - `healthy`: always reports healthy.
//!   - `crash`: exits immediately with a non-zero status, before even binding
//!     a listener, to exercise spawn-failure/crash-loop handling.
//!   - `unhealthy`: binds and serves, but `Check` always reports unhealthy.
//!   - `flaky`: reports unhealthy for `ECHO_HEALTH_FLAKY_FAILURES` checks
//!     (default 3), then healthy forever after, to exercise the health
//!     circuit breaker's failure/success thresholds.

use patsup_proto::supervisor::pattern_health_server::{PatternHealth, PatternHealthServer};
use patsup_proto::supervisor::{CheckRequest, CheckResponse};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use tonic::{transport::Server, Request, Response, Status};
use tracing::info;

struct EchoHealth {
    mode: Mode,
    flaky_failures: u32,
    seen: AtomicU32,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Healthy,
    Unhealthy,
    Flaky,
}

#[tonic::async_trait]
impl PatternHealth for EchoHealth {
    async fn check(
        &self,
        _request: Request<CheckRequest>,
    ) -> Result<Response<CheckResponse>, Status> {
        let healthy = match self.mode {
            Mode::Healthy => true,
            Mode::Unhealthy => false,
            Mode::Flaky => self.seen.fetch_add(1, Ordering::SeqCst) >= self.flaky_failures,
        };
        Ok(Response::new(CheckResponse {
            healthy,
            details: Some(format!("echo-health mode={}", mode_name(self.mode))),
        }))
    }
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Healthy => "healthy",
        Mode::Unhealthy => "unhealthy",
        Mode::Flaky => "flaky",
    }
}

fn parse_mode() -> Result<Mode, String> {
    match std::env::var("ECHO_HEALTH_MODE").as_deref() {
        Ok("healthy") | Err(_) => Ok(Mode::Healthy),
        Ok("crash") => {
            std::process::exit(1);
        }
        Ok("unhealthy") => Ok(Mode::Unhealthy),
        Ok("flaky") => Ok(Mode::Flaky),
        Ok(other) => Err(format!("unknown ECHO_HEALTH_MODE '{other}'")),
    }
}

fn flaky_failures() -> u32 {
    std::env::var("ECHO_HEALTH_FLAKY_FAILURES").ok().and_then(|s| s.parse().ok()).unwrap_or(3)
}

async fn wait_for_sigterm() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .try_init();

    let mode = match parse_mode() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("echo-health: {err}");
            std::process::exit(2);
        }
    };

    let port: u16 = match std::env::var("HEALTH_PORT").ok().and_then(|s| s.parse().ok()) {
        Some(port) => port,
        None => {
            eprintln!("echo-health: HEALTH_PORT is required");
            std::process::exit(2);
        }
    };

    let pattern_name = std::env::var("PATTERN_NAME").unwrap_or_else(|_| "<unknown>".to_string());
    let namespace = std::env::var("NAMESPACE").ok();
    let session_id = std::env::var("SESSION_ID").ok();
    info!(pattern = %pattern_name, ?namespace, ?session_id, port, mode = mode_name(mode), "echo-health starting");

    let addr: SocketAddr = match format!("127.0.0.1:{port}").parse() {
        Ok(addr) => addr,
        Err(err) => {
            eprintln!("echo-health: invalid HEALTH_PORT {port}: {err}");
            std::process::exit(2);
        }
    };

    let service = EchoHealth { mode, flaky_failures: flaky_failures(), seen: AtomicU32::new(0) };

    let serve = Server::builder()
        .add_service(PatternHealthServer::new(service))
        .serve_with_shutdown(addr, wait_for_sigterm());

    if let Err(err) = serve.await {
        eprintln!("echo-health: server error: {err}");
        std::process::exit(1);
    }
}
