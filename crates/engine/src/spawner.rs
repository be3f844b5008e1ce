// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawner adapter: turns a pattern + assigned port into a running OS
//! process. The real implementation shells out via `tokio::process`; the
//! fake lets the manager's reconciler be tested without touching the OS.

use crate::error::SpawnError;
use async_trait::async_trait;
use patsup_core::Pattern;
use std::process::ExitStatus;
use tracing::{info, warn};

/// Everything the spawner needs to start one child.
pub struct SpawnSpec<'a> {
    pub pattern: &'a Pattern,
    pub assigned_port: u16,
    pub namespace: Option<&'a str>,
    pub session_id: Option<&'a str>,
}

/// A handle to a spawned child: the only liveness surface the manager
/// needs, so fakes don't have to simulate a real OS process.
#[async_trait]
pub trait ChildHandle: Send {
    async fn wait(&mut self) -> std::io::Result<ExitStatus>;
    fn os_pid(&self) -> u32;
}

#[async_trait]
pub trait Spawner: Send + Sync + 'static {
    async fn spawn(&self, spec: SpawnSpec<'_>) -> Result<Box<dyn ChildHandle>, SpawnError>;

    /// Deliver SIGTERM to request a graceful stop.
    async fn terminate(&self, os_pid: u32) -> Result<(), SpawnError>;

    /// Deliver SIGKILL after the drain timeout has elapsed.
    async fn kill(&self, os_pid: u32) -> Result<(), SpawnError>;
}

pub struct RealChildHandle {
    child: tokio::process::Child,
    os_pid: u32,
}

#[async_trait]
impl ChildHandle for RealChildHandle {
    async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    fn os_pid(&self) -> u32 {
        self.os_pid
    }
}

/// Spawns children with `tokio::process::Command`, merging the pattern's
/// `env_extra` over the daemon's own environment and exporting the contract
/// env vars a pattern binary can rely on: `PATTERN_NAME`, `NAMESPACE`,
/// `SESSION_ID` (the latter two only when the launch carried them), and the
/// mandatory `HEALTH_PORT` to bind its health listener on.
#[derive(Clone, Default)]
pub struct RealSpawner;

#[async_trait]
impl Spawner for RealSpawner {
    async fn spawn(&self, spec: SpawnSpec<'_>) -> Result<Box<dyn ChildHandle>, SpawnError> {
        let pattern = spec.pattern;
        let mut command = tokio::process::Command::new(&pattern.command);
        command.args(&pattern.args);
        command.env("PATTERN_NAME", &pattern.name);
        command.env("HEALTH_PORT", spec.assigned_port.to_string());
        if let Some(namespace) = spec.namespace {
            command.env("NAMESPACE", namespace);
        }
        if let Some(session_id) = spec.session_id {
            command.env("SESSION_ID", session_id);
        }
        for (key, value) in &pattern.env_extra {
            command.env(key, value);
        }
        if let Some(dir) = &pattern.working_dir {
            command.current_dir(dir);
        }
        command.kill_on_drop(false);

        info!(
            pattern = %pattern.name,
            command = %pattern.command,
            port = spec.assigned_port,
            "spawning child process"
        );

        let child = command.spawn().map_err(|source| classify_spawn_io_error(&pattern.command, source))?;
        let os_pid = child.id().ok_or_else(|| SpawnError::Io {
            command: pattern.command.clone(),
            source: std::io::Error::other("spawned child has no pid (already reaped)"),
        })?;

        Ok(Box::new(RealChildHandle { child, os_pid }))
    }

    async fn terminate(&self, os_pid: u32) -> Result<(), SpawnError> {
        send_signal(os_pid, nix::sys::signal::Signal::SIGTERM)
    }

    async fn kill(&self, os_pid: u32) -> Result<(), SpawnError> {
        send_signal(os_pid, nix::sys::signal::Signal::SIGKILL)
    }
}

/// `io::Error::kind()` is reliable for the two exec failures that spec.md's
/// `PermanentSpawnError` names (binary missing, permission denied); anything
/// else (e.g. `EAGAIN`-class resource errors) is treated as transient and
/// left to the normal backoff/retry path.
fn classify_spawn_io_error(command: &str, source: std::io::Error) -> SpawnError {
    match source.kind() {
        std::io::ErrorKind::NotFound => SpawnError::BinaryNotFound { command: command.to_string() },
        std::io::ErrorKind::PermissionDenied => {
            SpawnError::PermissionDenied { command: command.to_string() }
        }
        _ => SpawnError::Io { command: command.to_string(), source },
    }
}

fn send_signal(os_pid: u32, signal: nix::sys::signal::Signal) -> Result<(), SpawnError> {
    use nix::unistd::Pid;
    nix::sys::signal::kill(Pid::from_raw(os_pid as i32), signal).map_err(|errno| {
        warn!(os_pid, signal = ?signal, error = %errno, "failed to deliver signal");
        SpawnError::Signal {
            process_id: patsup_core::ProcessId::new(os_pid.to_string()),
            source: std::io::Error::from_raw_os_error(errno as i32),
        }
    })
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// A fake child that never exits on its own; tests drive exit via
    /// `FakeSpawner::kill`/`terminate`, which wake the matching `wait()`.
    pub struct FakeChildHandle {
        os_pid: u32,
        exited: Arc<Notify>,
    }

    #[async_trait]
    impl ChildHandle for FakeChildHandle {
        async fn wait(&mut self) -> std::io::Result<ExitStatus> {
            self.exited.notified().await;
            Ok(ExitStatus::from_raw(0))
        }

        fn os_pid(&self) -> u32 {
            self.os_pid
        }
    }

    #[derive(Clone, Default)]
    pub struct FakeSpawner {
        next_pid: Arc<AtomicU32>,
        fail_next_spawn: Arc<AtomicBool>,
        fail_next_spawn_permanently: Arc<AtomicBool>,
        exit_signals: Arc<parking_lot::Mutex<std::collections::HashMap<u32, Arc<Notify>>>>,
    }

    impl FakeSpawner {
        pub fn new() -> Self {
            Self {
                next_pid: Arc::new(AtomicU32::new(10_000)),
                fail_next_spawn: Arc::new(AtomicBool::new(false)),
                fail_next_spawn_permanently: Arc::new(AtomicBool::new(false)),
                exit_signals: Arc::new(parking_lot::Mutex::new(std::collections::HashMap::new())),
            }
        }

        pub fn fail_next_spawn(&self) {
            self.fail_next_spawn.store(true, Ordering::SeqCst);
        }

        /// Fail the next spawn the way a missing binary would: permanently,
        /// with no retry.
        pub fn fail_next_spawn_permanently(&self) {
            self.fail_next_spawn_permanently.store(true, Ordering::SeqCst);
        }

        /// Simulate the OS process exiting on its own (crash or clean exit).
        pub fn simulate_exit(&self, os_pid: u32) {
            if let Some(notify) = self.exit_signals.lock().get(&os_pid) {
                notify.notify_one();
            }
        }
    }

    #[async_trait]
    impl Spawner for FakeSpawner {
        async fn spawn(&self, spec: SpawnSpec<'_>) -> Result<Box<dyn ChildHandle>, SpawnError> {
            if self.fail_next_spawn_permanently.swap(false, Ordering::SeqCst) {
                return Err(SpawnError::BinaryNotFound { command: spec.pattern.command.clone() });
            }
            if self.fail_next_spawn.swap(false, Ordering::SeqCst) {
                return Err(SpawnError::Io {
                    command: spec.pattern.command.clone(),
                    source: std::io::Error::other("fake spawn failure"),
                });
            }
            let os_pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
            let notify = Arc::new(Notify::new());
            self.exit_signals.lock().insert(os_pid, notify.clone());
            Ok(Box::new(FakeChildHandle { os_pid, exited: notify }))
        }

        async fn terminate(&self, os_pid: u32) -> Result<(), SpawnError> {
            self.simulate_exit(os_pid);
            Ok(())
        }

        async fn kill(&self, os_pid: u32) -> Result<(), SpawnError> {
            self.simulate_exit(os_pid);
            Ok(())
        }
    }
}
