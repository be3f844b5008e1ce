// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process manager: the single writer of process state. Every mutation
//! goes through a method on `Shared` taken under its lock; external readers
//! (RPC handlers, the CLI) only ever see a `ProcessSnapshot` copied out from
//! under that lock, never the lock itself.
//!
//! `launch` itself never blocks waiting for a settled state — that wait
//! (with an RPC-level deadline) is the Supervisor API layer's job via
//! [`ProcessManager::await_settled`].

use crate::config::EngineConfig;
use crate::error::RuntimeError;
use crate::health::HealthProbe;
use crate::port_allocator::PortAllocator;
use crate::queue::WorkQueue;
use crate::spawner::{SpawnSpec, Spawner};
use parking_lot::Mutex;
use patsup_core::{
    backoff_delay, derive_process_id, Action, Clock, IsolationKey, IsolationLevel, Pattern,
    ProcessId, ProcessRecord, ProcessSnapshot, ProcessState, TerminalReason, WorkItem,
};
use patsup_registry::Registry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tracing::{info, warn};

struct Shared<C: Clock> {
    registry: Arc<Registry>,
    spawner: Arc<dyn Spawner>,
    health: Arc<dyn HealthProbe>,
    ports: PortAllocator,
    clock: C,
    config: EngineConfig,
    state: Mutex<HashMap<ProcessId, ProcessRecord>>,
    queue: Mutex<WorkQueue>,
    /// Notified after every state mutation; `await_settled` and `shutdown`
    /// wait on this instead of polling on a fixed interval.
    changed: Notify,
}

/// Cheaply cloneable handle to the process manager; clones share the same
/// underlying state and are safe to hand to RPC handlers and background
/// tasks alike.
pub struct ProcessManager<C: Clock> {
    shared: Arc<Shared<C>>,
}

impl<C: Clock> Clone for ProcessManager<C> {
    fn clone(&self) -> Self {
        Self { shared: self.shared.clone() }
    }
}

/// Filter accepted by [`ProcessManager::list`]: `pattern_name`,
/// `isolation_level`, and `state` narrow independently, all optional.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub pattern_name: Option<String>,
    pub isolation_level: Option<IsolationLevel>,
    /// Matched against the lowercase state name (`pending`, `starting`,
    /// `running`, `degraded`, `terminating`, `terminal`); a `Terminal`
    /// record matches regardless of its reason.
    pub state: Option<String>,
}

/// Aggregated counts for the `Health` RPC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthAggregate {
    pub total: usize,
    pub pending: usize,
    pub starting: usize,
    pub running: usize,
    pub degraded: usize,
    pub terminating: usize,
    pub terminal: usize,
    pub isolation_none: usize,
    pub isolation_namespace: usize,
    pub isolation_session: usize,
}

fn state_name(state: &ProcessState) -> &'static str {
    match state {
        ProcessState::Pending => "pending",
        ProcessState::Starting => "starting",
        ProcessState::Running => "running",
        ProcessState::Degraded => "degraded",
        ProcessState::Terminating => "terminating",
        ProcessState::Terminal { .. } => "terminal",
    }
}

impl<C: Clock> ProcessManager<C> {
    pub fn new(
        registry: Arc<Registry>,
        spawner: Arc<dyn Spawner>,
        health: Arc<dyn HealthProbe>,
        clock: C,
        config: EngineConfig,
    ) -> Self {
        let ports = PortAllocator::new(config.port_range.clone());
        Self {
            shared: Arc::new(Shared {
                registry,
                spawner,
                health,
                ports,
                clock,
                config,
                state: Mutex::new(HashMap::new()),
                queue: Mutex::new(WorkQueue::new()),
                changed: Notify::new(),
            }),
        }
    }

    /// Launch (or attach to) the process derived from this request. Two
    /// concurrent launches for the same derived id race on the state lock;
    /// only the first to observe no existing non-terminal record spawns.
    /// Does not wait for the spawn to settle — callers that need the
    /// "block until Running/Terminal" behavior should follow up with
    /// [`Self::await_settled`].
    ///
    /// `isolation_level` is the caller's per-request override; `None` falls
    /// back to the pattern's manifest-declared default.
    pub async fn launch(
        &self,
        pattern_name: &str,
        namespace: Option<&str>,
        session_id: Option<&str>,
        isolation_level: Option<IsolationLevel>,
    ) -> Result<ProcessSnapshot, RuntimeError> {
        let pattern = self
            .shared
            .registry
            .get(pattern_name)
            .ok_or_else(|| RuntimeError::UnknownPattern(pattern_name.to_string()))?
            .clone();

        let level = isolation_level.unwrap_or(pattern.isolation);
        let process_id = derive_process_id(pattern_name, namespace, session_id, level)?;

        let needs_spawn = {
            let mut state = self.shared.state.lock();
            match state.get(&process_id) {
                Some(existing) if !existing.state.is_terminal() => false,
                _ => {
                    // Fail fast rather than silently queuing a record that
                    // can never spawn: an empty port range has no retry
                    // schedule that would help.
                    if !self.shared.ports.has_capacity() {
                        return Err(RuntimeError::Spawn(crate::error::SpawnError::PortsExhausted));
                    }
                    let key = IsolationKey {
                        pattern_name: pattern_name.to_string(),
                        namespace: namespace.map(str::to_string),
                        session_id: session_id.map(str::to_string),
                        level,
                    };
                    let record = ProcessRecord::new(
                        process_id.clone(),
                        pattern_name,
                        key,
                        self.shared.clock.epoch_ms(),
                    );
                    state.insert(process_id.clone(), record);
                    true
                }
            }
        };

        if needs_spawn {
            self.process_spawn(&process_id).await;
        }

        self.snapshot_of(&process_id)
    }

    /// Wait until `process_id`'s snapshot reaches `Running` or `Terminal`,
    /// or `timeout` elapses first. Uses real wall-clock time regardless of
    /// the manager's `Clock` — this is the RPC-facing wait, not a
    /// reconciler deadline.
    pub async fn await_settled(
        &self,
        process_id: &ProcessId,
        timeout: Duration,
    ) -> Result<ProcessSnapshot, RuntimeError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let snapshot = self.snapshot_of(process_id)?;
            if matches!(snapshot.state, ProcessState::Running | ProcessState::Terminal { .. }) {
                return Ok(snapshot);
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(RuntimeError::DeadlineExceeded(process_id.clone()));
            }
            let _ = tokio::time::timeout(remaining, self.shared.changed.notified()).await;
        }
    }

    /// Begin a graceful-then-forceful stop. Idempotent against a process
    /// that is already `Terminating`; errors against one that's already
    /// `Terminal` or unknown.
    pub async fn terminate(
        &self,
        process_id: &ProcessId,
        grace: Option<Duration>,
    ) -> Result<ProcessSnapshot, RuntimeError> {
        {
            let state = self.shared.state.lock();
            let record = state
                .get(process_id)
                .ok_or_else(|| RuntimeError::UnknownProcess(process_id.clone()))?;
            if record.state.is_terminal() {
                return Err(RuntimeError::NotRunning(process_id.clone()));
            }
        }

        let grace = grace.unwrap_or(self.shared.config.drain_timeout);
        self.begin_stop(process_id, TerminalReason::Requested, grace).await;
        self.snapshot_of(process_id)
    }

    pub fn list(&self, filter: &ListFilter) -> Vec<ProcessSnapshot> {
        let state = self.shared.state.lock();
        state
            .values()
            .filter(|record| {
                filter.pattern_name.as_deref().map(|f| f == record.pattern_name).unwrap_or(true)
            })
            .filter(|record| {
                filter.isolation_level.map(|f| f == record.isolation_key.level).unwrap_or(true)
            })
            .filter(|record| {
                filter.state.as_deref().map(|f| f == state_name(&record.state)).unwrap_or(true)
            })
            .map(ProcessSnapshot::from)
            .collect()
    }

    pub fn health(&self, process_id: &ProcessId) -> Result<ProcessSnapshot, RuntimeError> {
        self.snapshot_of(process_id)
    }

    /// Aggregated counts for the `Health(include_processes)` RPC.
    pub fn health_aggregate(&self) -> HealthAggregate {
        let state = self.shared.state.lock();
        let mut agg = HealthAggregate { total: state.len(), ..HealthAggregate::default() };
        for record in state.values() {
            match record.state {
                ProcessState::Pending => agg.pending += 1,
                ProcessState::Starting => agg.starting += 1,
                ProcessState::Running => agg.running += 1,
                ProcessState::Degraded => agg.degraded += 1,
                ProcessState::Terminating => agg.terminating += 1,
                ProcessState::Terminal { .. } => agg.terminal += 1,
            }
            match record.isolation_key.level {
                IsolationLevel::None => agg.isolation_none += 1,
                IsolationLevel::Namespace => agg.isolation_namespace += 1,
                IsolationLevel::Session => agg.isolation_session += 1,
            }
        }
        agg
    }

    fn snapshot_of(&self, process_id: &ProcessId) -> Result<ProcessSnapshot, RuntimeError> {
        let state = self.shared.state.lock();
        state
            .get(process_id)
            .map(ProcessSnapshot::from)
            .ok_or_else(|| RuntimeError::UnknownProcess(process_id.clone()))
    }

    /// Drain every work item whose deadline has passed. Called in a loop by
    /// the daemon's reconcile task; exposed standalone so tests can step it
    /// deterministically against a `FakeClock`.
    ///
    /// Draining only pops items off the queue; the blocking I/O each action
    /// performs (exec, probe RPC, signal delivery) runs on its own spawned
    /// task so one process stuck mid-spawn or mid-probe can't stall the due
    /// work of every other process. `Gc` is pure in-memory bookkeeping and
    /// runs inline.
    pub async fn reconcile_once(&self) {
        loop {
            let item = {
                let mut queue = self.shared.queue.lock();
                queue.pop_ready(self.shared.clock.now())
            };
            let Some(item) = item else { break };
            match item.action {
                Action::Spawn | Action::Retry => {
                    let manager = self.clone();
                    tokio::spawn(async move { manager.process_spawn(&item.process_id).await });
                }
                Action::Probe => {
                    let manager = self.clone();
                    tokio::spawn(async move { manager.process_probe(&item.process_id).await });
                }
                Action::Stop => {
                    let manager = self.clone();
                    tokio::spawn(
                        async move { manager.process_force_kill_tick(&item.process_id).await },
                    );
                }
                Action::Gc => self.process_gc(&item.process_id),
            }
        }
    }

    /// Run the reconciler forever, sleeping until the next scheduled
    /// deadline (or `fallback_tick`, whichever is sooner) between drains.
    /// Intended for the daemon's background task; tests drive
    /// `reconcile_once` directly against a `FakeClock` instead.
    pub async fn run_reconcile_loop(&self, fallback_tick: Duration) -> ! {
        loop {
            let now = self.shared.clock.now();
            let deadline =
                self.next_deadline().unwrap_or(now + fallback_tick).min(now + fallback_tick);
            let delay = deadline.saturating_duration_since(now);
            tokio::time::sleep(delay).await;
            self.reconcile_once().await;
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.shared.queue.lock().next_deadline()
    }

    /// Drain every live record toward `Terminal`. Callers should stop
    /// accepting new `launch()` calls before invoking this (e.g. by
    /// refusing further RPCs) — this only drains what's already live. Every
    /// live record is given `grace` to stop cleanly; any still not
    /// `Terminal` after `self.shared.config.shutdown_hard_deadline` is
    /// abandoned as `Terminal(SupervisorShutdownForce)`.
    pub async fn shutdown(&self, grace: Duration) {
        let live_ids: Vec<ProcessId> = {
            let state = self.shared.state.lock();
            state
                .values()
                .filter(|r| !r.state.is_terminal())
                .map(|r| r.process_id.clone())
                .collect()
        };

        for id in &live_ids {
            self.begin_stop(id, TerminalReason::SupervisorShutdown, grace).await;
        }

        let deadline = tokio::time::Instant::now() + self.shared.config.shutdown_hard_deadline;
        for id in &live_ids {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let _ = self.await_settled(id, remaining).await;
        }

        let mut state = self.shared.state.lock();
        for id in &live_ids {
            if let Some(record) = state.get_mut(id) {
                if !record.state.is_terminal() {
                    warn!(process_id = %id, "shutdown hard deadline exceeded, abandoning");
                    if let Some(port) = record.assigned_port.take() {
                        self.shared.ports.release(port);
                    }
                    finalize_terminal(
                        record,
                        TerminalReason::SupervisorShutdownForce,
                        self.shared.clock.epoch_ms(),
                    );
                }
            }
        }
        self.shared.changed.notify_waiters();
    }

    fn enqueue(&self, item: WorkItem) {
        self.shared.queue.lock().push(item);
        self.shared.changed.notify_waiters();
    }

    async fn process_spawn(&self, process_id: &ProcessId) {
        let Some(pattern) = self.pattern_for(process_id) else {
            self.mark_unknown_pattern(process_id);
            return;
        };
        let (namespace, session_id) = self.isolation_scope_for(process_id);

        let port = match self.shared.ports.allocate() {
            Ok(port) => port,
            Err(err) => {
                self.record_spawn_failure(process_id, &err);
                return;
            }
        };

        let spec = SpawnSpec {
            pattern: &pattern,
            assigned_port: port,
            namespace: namespace.as_deref(),
            session_id: session_id.as_deref(),
        };
        match self.shared.spawner.spawn(spec).await {
            Ok(mut child) => {
                let os_pid = child.os_pid();
                {
                    let mut state = self.shared.state.lock();
                    if let Some(record) = state.get_mut(process_id) {
                        record.state = ProcessState::Starting;
                        record.os_pid = Some(os_pid);
                        record.assigned_port = Some(port);
                        record.last_error = None;
                        record.started_at_epoch_ms = Some(self.shared.clock.epoch_ms());
                        record.updated_at_epoch_ms = self.shared.clock.epoch_ms();
                    }
                }
                self.shared.changed.notify_waiters();
                info!(process_id = %process_id, os_pid, port, "process spawned");

                self.enqueue(WorkItem::new(
                    process_id.clone(),
                    Action::Probe,
                    self.shared.clock.now() + pattern.probe.initial_delay,
                ));

                let manager = self.clone();
                let watched_id = process_id.clone();
                tokio::spawn(async move {
                    let _ = child.wait().await;
                    manager.on_child_exit(&watched_id).await;
                });
            }
            Err(err) => {
                self.shared.ports.release(port);
                self.record_spawn_failure(process_id, &err);
            }
        }
    }

    fn record_spawn_failure(&self, process_id: &ProcessId, err: &crate::error::SpawnError) {
        let message = err.to_string();
        let permanent = err.is_permanent();

        let retry = {
            let mut state = self.shared.state.lock();
            let Some(record) = state.get_mut(process_id) else { return };
            record.spawn_attempts += 1;
            record.last_error = Some(message.clone());
            record.updated_at_epoch_ms = self.shared.clock.epoch_ms();

            let pattern_max =
                self.shared.registry.get(&record.pattern_name).and_then(|p| p.max_restart_attempts);
            let exhausted = pattern_max.map(|max| record.spawn_attempts >= max).unwrap_or(false);

            if permanent {
                finalize_terminal(record, TerminalReason::SpawnPermanent, self.shared.clock.epoch_ms());
                None
            } else if exhausted {
                finalize_terminal(record, TerminalReason::SpawnExhausted, self.shared.clock.epoch_ms());
                None
            } else {
                Some(record.spawn_attempts)
            }
        };
        self.shared.changed.notify_waiters();

        if let Some(attempts) = retry {
            warn!(process_id = %process_id, attempts, error = %message, "spawn failed, scheduling retry");
            self.enqueue(WorkItem::new(
                process_id.clone(),
                Action::Retry,
                self.shared.clock.now() + backoff_delay(attempts),
            ));
        } else {
            if permanent {
                warn!(process_id = %process_id, error = %message, "spawn failed permanently, not retrying");
            }
            self.schedule_gc(process_id);
        }
    }

    /// Observed via the spawned `wait()` task whenever the OS process exits,
    /// whether that exit was requested (the tail end of a `Stop` sequence)
    /// or unexpected (a crash). An unexpected exit goes straight to
    /// `Terminal(child-exited)` rather than scheduling a restart — there is
    /// no automatic respawn in this layer.
    async fn on_child_exit(&self, process_id: &ProcessId) {
        let finalized = {
            let mut state = self.shared.state.lock();
            let Some(record) = state.get_mut(process_id) else { return };

            if let Some(port) = record.assigned_port.take() {
                self.shared.ports.release(port);
            }
            record.os_pid = None;

            match record.state {
                ProcessState::Terminal { .. } => false,
                ProcessState::Terminating => {
                    let reason =
                        record.pending_stop_reason.take().unwrap_or(TerminalReason::Requested);
                    finalize_terminal(record, reason, self.shared.clock.epoch_ms());
                    true
                }
                _ => {
                    record.last_error = Some("process exited unexpectedly".to_string());
                    finalize_terminal(record, TerminalReason::ChildExited, self.shared.clock.epoch_ms());
                    true
                }
            }
        };
        self.shared.changed.notify_waiters();

        if finalized {
            self.schedule_gc(process_id);
        }
    }

    async fn process_probe(&self, process_id: &ProcessId) {
        let Some((pattern, endpoint)) = ({
            let state = self.shared.state.lock();
            state.get(process_id).and_then(|record| {
                if !record.state.is_live() || record.state == ProcessState::Terminating {
                    return None;
                }
                let pattern = self.shared.registry.get(&record.pattern_name)?.clone();
                let port = record.assigned_port?;
                let endpoint = pattern.probe.endpoint_template.replace("{port}", &port.to_string());
                Some((pattern, endpoint))
            })
        }) else {
            return;
        };

        let result = self.shared.health.check(&endpoint, pattern.probe.timeout).await;

        enum Outcome {
            KeepProbing,
            Stopped,
        }

        let outcome = {
            let mut state = self.shared.state.lock();
            let Some(record) = state.get_mut(process_id) else { return };
            if record.state.is_terminal() || record.state == ProcessState::Terminating {
                return;
            }

            match result {
                Ok(()) => {
                    record.consecutive_probe_successes += 1;
                    record.consecutive_probe_failures = 0;
                    record.last_error = None;
                    record.last_probe_ok_at_epoch_ms = Some(self.shared.clock.epoch_ms());
                    if record.state == ProcessState::Starting {
                        record.state = ProcessState::Running;
                        record.spawn_attempts = 0;
                    } else if record.state == ProcessState::Degraded
                        && record.consecutive_probe_successes >= pattern.probe.success_threshold
                    {
                        record.state = ProcessState::Running;
                    }
                    record.updated_at_epoch_ms = self.shared.clock.epoch_ms();
                    Outcome::KeepProbing
                }
                Err(ref err) => {
                    record.consecutive_probe_failures += 1;
                    record.consecutive_probe_successes = 0;
                    record.last_error = Some(err.to_string());
                    record.updated_at_epoch_ms = self.shared.clock.epoch_ms();

                    if record.consecutive_probe_failures >= pattern.probe.terminal_threshold {
                        record.state = ProcessState::Terminating;
                        record.pending_stop_reason = Some(TerminalReason::HealthCircuitOpen);
                        Outcome::Stopped
                    } else {
                        if record.state.is_running_or_degraded()
                            && record.consecutive_probe_failures >= pattern.probe.failure_threshold
                        {
                            record.state = ProcessState::Degraded;
                        }
                        Outcome::KeepProbing
                    }
                }
            }
        };

        match outcome {
            Outcome::KeepProbing => {
                self.shared.changed.notify_waiters();
                self.enqueue(WorkItem::new(
                    process_id.clone(),
                    Action::Probe,
                    self.shared.clock.now() + pattern.probe.interval,
                ));
            }
            Outcome::Stopped => {
                self.shared.changed.notify_waiters();
                self.deliver_stop_signal(
                    process_id,
                    TerminalReason::HealthCircuitOpen,
                    self.shared.config.drain_timeout,
                )
                .await;
            }
        }
    }

    /// Common path for every transition into `Terminating`: `Terminate`
    /// RPCs, the health circuit breaker, and supervisor shutdown. Signals
    /// the child (best-effort) and schedules the forceful-kill tick at
    /// `now + grace`; a `grace` of zero means that tick is immediately due.
    async fn begin_stop(&self, process_id: &ProcessId, reason: TerminalReason, grace: Duration) {
        let already_terminal = {
            let state = self.shared.state.lock();
            state.get(process_id).map(|r| r.state.is_terminal()).unwrap_or(true)
        };
        if already_terminal {
            return;
        }
        self.deliver_stop_signal(process_id, reason, grace).await;
    }

    async fn deliver_stop_signal(&self, process_id: &ProcessId, reason: TerminalReason, grace: Duration) {
        let os_pid = {
            let mut state = self.shared.state.lock();
            let Some(record) = state.get_mut(process_id) else { return };
            if record.state.is_terminal() {
                return;
            }
            if record.state != ProcessState::Terminating {
                record.state = ProcessState::Terminating;
                record.updated_at_epoch_ms = self.shared.clock.epoch_ms();
            }
            record.pending_stop_reason.get_or_insert(reason);
            record.os_pid
        };
        self.shared.changed.notify_waiters();

        if let Some(os_pid) = os_pid {
            if let Err(err) = self.shared.spawner.terminate(os_pid).await {
                warn!(process_id = %process_id, error = %err, "SIGTERM delivery failed");
            }
        }

        self.enqueue(WorkItem::new(process_id.clone(), Action::Stop, self.shared.clock.now() + grace));
    }

    /// Fires when the grace period elapses on a `Terminating` record;
    /// delivers SIGKILL. Finalization to `Terminal` normally happens when
    /// the spawned `wait()` task observes the exit and calls
    /// `on_child_exit`; this only finalizes directly in the edge case where
    /// there was never an OS pid to wait on.
    async fn process_force_kill_tick(&self, process_id: &ProcessId) {
        let os_pid = {
            let state = self.shared.state.lock();
            state
                .get(process_id)
                .filter(|r| r.state == ProcessState::Terminating)
                .and_then(|r| r.os_pid)
        };
        if let Some(os_pid) = os_pid {
            warn!(process_id = %process_id, "drain timeout elapsed, sending SIGKILL");
            if let Err(err) = self.shared.spawner.kill(os_pid).await {
                warn!(process_id = %process_id, error = %err, "SIGKILL delivery failed");
            }
            return;
        }

        let finalized = {
            let mut state = self.shared.state.lock();
            let Some(record) = state.get_mut(process_id) else { return };
            if record.state == ProcessState::Terminating {
                let reason = record.pending_stop_reason.take().unwrap_or(TerminalReason::Requested);
                finalize_terminal(record, reason, self.shared.clock.epoch_ms());
                true
            } else {
                false
            }
        };
        if finalized {
            self.shared.changed.notify_waiters();
            self.schedule_gc(process_id);
        }
    }

    fn process_gc(&self, process_id: &ProcessId) {
        let mut state = self.shared.state.lock();
        if let Some(record) = state.get(process_id) {
            if record.state.is_terminal() {
                state.remove(process_id);
                info!(process_id = %process_id, "garbage collected terminal process record");
            }
        }
    }

    fn schedule_gc(&self, process_id: &ProcessId) {
        self.enqueue(WorkItem::new(
            process_id.clone(),
            Action::Gc,
            self.shared.clock.now() + self.shared.config.terminal_retention,
        ));
    }

    fn pattern_for(&self, process_id: &ProcessId) -> Option<Pattern> {
        let state = self.shared.state.lock();
        let record = state.get(process_id)?;
        self.shared.registry.get(&record.pattern_name).cloned()
    }

    fn isolation_scope_for(&self, process_id: &ProcessId) -> (Option<String>, Option<String>) {
        let state = self.shared.state.lock();
        match state.get(process_id) {
            Some(record) => {
                (record.isolation_key.namespace.clone(), record.isolation_key.session_id.clone())
            }
            None => (None, None),
        }
    }

    fn mark_unknown_pattern(&self, process_id: &ProcessId) {
        let finalized = {
            let mut state = self.shared.state.lock();
            let Some(record) = state.get_mut(process_id) else { return };
            finalize_terminal(record, TerminalReason::PatternRemoved, self.shared.clock.epoch_ms());
            true
        };
        self.shared.changed.notify_waiters();
        if finalized {
            self.schedule_gc(process_id);
        }
    }
}

/// Move a record to `Terminal` and release its port bookkeeping. Does not
/// enqueue the GC tick or notify waiters — callers do both themselves since
/// some hold the lock across several records (`shutdown`).
fn finalize_terminal(record: &mut ProcessRecord, reason: TerminalReason, now_epoch_ms: u64) {
    record.state = ProcessState::Terminal { reason };
    record.updated_at_epoch_ms = now_epoch_ms;
    record.os_pid = None;
}
