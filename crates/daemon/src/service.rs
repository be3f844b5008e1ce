// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin gRPC adapter: translates `PatternSupervisor` RPCs into
//! `ProcessManager` calls and maps the results back onto proto messages.
//! No policy lives here — validation beyond proto field presence, retry
//! logic, and state transitions all belong to the engine.

use patsup_core::{Clock, IsolationLevel, ProcessId, ProcessSnapshot, ProcessState, TerminalReason};
use patsup_engine::manager::{HealthAggregate, ListFilter};
use patsup_engine::{ProcessManager, RuntimeError};
use patsup_proto::supervisor::pattern_supervisor_server::PatternSupervisor;
use patsup_proto::supervisor::{
    HealthRequest, HealthResponse, IsolationCounts, LaunchRequest, LaunchResponse, ListRequest,
    ListResponse, StateCounts, TerminateRequest, TerminateResponse,
};
use patsup_proto::supervisor::ProcessSnapshot as ProtoSnapshot;
use std::time::Duration;
use tonic::{Request, Response, Status};
use tracing::{info, warn};

pub struct SupervisorService<C: Clock> {
    manager: ProcessManager<C>,
    launch_deadline: Duration,
}

impl<C: Clock> SupervisorService<C> {
    pub fn new(manager: ProcessManager<C>, launch_deadline: Duration) -> Self {
        Self { manager, launch_deadline }
    }
}

fn parse_isolation_level(raw: &str) -> Result<IsolationLevel, Status> {
    match raw {
        "none" => Ok(IsolationLevel::None),
        "namespace" => Ok(IsolationLevel::Namespace),
        "session" => Ok(IsolationLevel::Session),
        other => Err(Status::invalid_argument(format!(
            "unknown isolation_level '{other}' (expected none, namespace, or session)"
        ))),
    }
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

fn terminal_reason(state: &ProcessState) -> Option<&'static str> {
    match state {
        ProcessState::Terminal { reason } => Some(terminal_reason_str(reason)),
        _ => None,
    }
}

fn terminal_reason_str(reason: &TerminalReason) -> &'static str {
    reason.as_str()
}

fn to_proto(snapshot: &ProcessSnapshot) -> ProtoSnapshot {
    ProtoSnapshot {
        process_id: snapshot.process_id.as_str().to_string(),
        pattern_name: snapshot.pattern_name.clone(),
        isolation_level: snapshot.isolation_level.as_str().to_string(),
        namespace: snapshot.namespace.clone(),
        session_id: snapshot.session_id.clone(),
        state: state_name(&snapshot.state).to_string(),
        terminal_reason: terminal_reason(&snapshot.state).map(str::to_string),
        os_pid: snapshot.os_pid,
        health_port: snapshot.assigned_port.map(u32::from),
        spawn_attempts: snapshot.spawn_attempts,
        consecutive_probe_failures: snapshot.consecutive_probe_failures,
        created_at_epoch_ms: snapshot.created_at_epoch_ms,
        updated_at_epoch_ms: snapshot.updated_at_epoch_ms,
        started_at_epoch_ms: snapshot.started_at_epoch_ms,
        last_probe_ok_at_epoch_ms: snapshot.last_probe_ok_at_epoch_ms,
        last_error: snapshot.last_error.clone(),
    }
}

fn runtime_error_to_status(err: RuntimeError) -> Status {
    match err {
        RuntimeError::UnknownPattern(name) => {
            Status::invalid_argument(format!("unknown pattern '{name}'"))
        }
        RuntimeError::Isolation(source) => Status::invalid_argument(source.to_string()),
        RuntimeError::Spawn(source) => {
            if matches!(source, patsup_engine::SpawnError::PortsExhausted) {
                Status::resource_exhausted(source.to_string())
            } else {
                Status::internal(source.to_string())
            }
        }
        RuntimeError::UnknownProcess(id) => Status::not_found(format!("unknown process '{id}'")),
        RuntimeError::NotRunning(id) => {
            Status::failed_precondition(format!("process '{id}' is already terminating or terminal"))
        }
        RuntimeError::DeadlineExceeded(id) => {
            Status::deadline_exceeded(format!("timed out waiting for '{id}' to settle"))
        }
    }
}

fn isolation_counts(agg: &HealthAggregate) -> IsolationCounts {
    IsolationCounts {
        none: agg.isolation_none as u32,
        namespace: agg.isolation_namespace as u32,
        session: agg.isolation_session as u32,
    }
}

fn state_counts(agg: &HealthAggregate) -> StateCounts {
    StateCounts {
        pending: agg.pending as u32,
        starting: agg.starting as u32,
        running: agg.running as u32,
        degraded: agg.degraded as u32,
        terminating: agg.terminating as u32,
        terminal: agg.terminal as u32,
    }
}

#[tonic::async_trait]
impl<C: Clock> PatternSupervisor for SupervisorService<C> {
    async fn launch(
        &self,
        request: Request<LaunchRequest>,
    ) -> Result<Response<LaunchResponse>, Status> {
        let req = request.into_inner();
        info!(pattern = %req.pattern_name, "launch requested");

        let isolation_level = match req.isolation_level.as_deref() {
            Some(raw) => Some(parse_isolation_level(raw)?),
            None => None,
        };

        let snapshot = self
            .manager
            .launch(
                &req.pattern_name,
                req.namespace.as_deref(),
                req.session_id.as_deref(),
                isolation_level,
            )
            .await
            .map_err(runtime_error_to_status)?;

        let settled = self
            .manager
            .await_settled(&snapshot.process_id, self.launch_deadline)
            .await
            .map_err(runtime_error_to_status)?;

        Ok(Response::new(LaunchResponse {
            process_id: settled.process_id.as_str().to_string(),
            snapshot: Some(to_proto(&settled)),
        }))
    }

    async fn terminate(
        &self,
        request: Request<TerminateRequest>,
    ) -> Result<Response<TerminateResponse>, Status> {
        let req = request.into_inner();
        let process_id = ProcessId::new(req.process_id.clone());
        let grace = req.grace_period_seconds.map(|s| Duration::from_secs(s as u64));

        warn!(process_id = %process_id, grace_secs = ?req.grace_period_seconds, "terminate requested");
        let snapshot =
            self.manager.terminate(&process_id, grace).await.map_err(runtime_error_to_status)?;

        Ok(Response::new(TerminateResponse {
            process_id: snapshot.process_id.as_str().to_string(),
            snapshot: Some(to_proto(&snapshot)),
        }))
    }

    async fn list(&self, request: Request<ListRequest>) -> Result<Response<ListResponse>, Status> {
        let req = request.into_inner();
        let isolation_level = match req.isolation_level {
            Some(raw) => Some(parse_isolation_level(&raw)?),
            None => None,
        };
        let filter = ListFilter { pattern_name: req.pattern_name, isolation_level, state: req.state };
        let processes = self.manager.list(&filter).iter().map(to_proto).collect();
        Ok(Response::new(ListResponse { processes }))
    }

    async fn health(
        &self,
        request: Request<HealthRequest>,
    ) -> Result<Response<HealthResponse>, Status> {
        let req = request.into_inner();
        let agg = self.manager.health_aggregate();
        let processes = if req.include_processes {
            self.manager.list(&ListFilter::default()).iter().map(to_proto).collect()
        } else {
            Vec::new()
        };

        Ok(Response::new(HealthResponse {
            total: agg.total as u32,
            by_state: Some(state_counts(&agg)),
            isolation_distribution: Some(isolation_counts(&agg)),
            processes,
        }))
    }
}
