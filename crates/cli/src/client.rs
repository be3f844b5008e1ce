// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin wrapper around the generated `PatternSupervisorClient`, owning the
//! gRPC channel so command handlers never touch `tonic` directly.

use patsup_proto::supervisor::pattern_supervisor_client::PatternSupervisorClient;
use patsup_proto::supervisor::{
    HealthRequest, HealthResponse, LaunchRequest, LaunchResponse, ListRequest, ListResponse,
    TerminateRequest, TerminateResponse,
};
use std::collections::HashMap;
use tonic::transport::Channel;

pub struct DaemonClient {
    inner: PatternSupervisorClient<Channel>,
}

impl DaemonClient {
    pub async fn connect(addr: &str) -> anyhow::Result<Self> {
        let inner = PatternSupervisorClient::connect(addr.to_string())
            .await
            .map_err(|source| anyhow::anyhow!("failed to connect to {addr}: {source}"))?;
        Ok(Self { inner })
    }

    pub async fn launch(
        &mut self,
        pattern_name: &str,
        namespace: Option<String>,
        session_id: Option<String>,
        isolation_level: Option<String>,
        pattern_config: HashMap<String, String>,
    ) -> anyhow::Result<LaunchResponse> {
        let request = LaunchRequest {
            pattern_name: pattern_name.to_string(),
            namespace,
            session_id,
            isolation_level,
            pattern_config,
        };
        Ok(self.inner.launch(request).await?.into_inner())
    }

    pub async fn terminate(
        &mut self,
        process_id: &str,
        grace_period_seconds: Option<u32>,
    ) -> anyhow::Result<TerminateResponse> {
        let request =
            TerminateRequest { process_id: process_id.to_string(), grace_period_seconds };
        Ok(self.inner.terminate(request).await?.into_inner())
    }

    pub async fn list(
        &mut self,
        pattern_name: Option<String>,
        isolation_level: Option<String>,
        state: Option<String>,
    ) -> anyhow::Result<ListResponse> {
        let request = ListRequest { pattern_name, isolation_level, state };
        Ok(self.inner.list(request).await?.into_inner())
    }

    pub async fn health(&mut self, include_processes: bool) -> anyhow::Result<HealthResponse> {
        let request = HealthRequest { include_processes };
        Ok(self.inner.health(request).await?.into_inner())
    }
}
