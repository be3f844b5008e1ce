// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health probing: calls a supervised child's `PatternHealth.Check` RPC to
//! tell a started process apart from a ready one, and a ready one apart
//! from one that has quietly wedged.

use crate::error::ProbeError;
use async_trait::async_trait;
use parking_lot::Mutex;
use patsup_proto::supervisor::pattern_health_client::PatternHealthClient;
use patsup_proto::supervisor::CheckRequest;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Channel;

#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    async fn check(&self, endpoint: &str, timeout: Duration) -> Result<(), ProbeError>;
}

/// One long-lived gRPC channel per live child, keyed by its probe endpoint
/// (host:port is unique per process — ports aren't reused until released
/// back to the `PortAllocator`). Dialed on first probe, reused on every
/// probe after, evicted on dial/call failure or timeout so a wedged or
/// recycled endpoint doesn't get stuck on a dead channel.
#[derive(Clone, Default)]
pub struct GrpcHealthProbe {
    channels: Arc<Mutex<HashMap<String, Channel>>>,
}

impl GrpcHealthProbe {
    pub fn new() -> Self {
        Self::default()
    }

    fn cached(&self, endpoint: &str) -> Option<Channel> {
        self.channels.lock().get(endpoint).cloned()
    }

    fn evict(&self, endpoint: &str) {
        self.channels.lock().remove(endpoint);
    }
}

#[async_trait]
impl HealthProbe for GrpcHealthProbe {
    async fn check(&self, endpoint: &str, timeout: Duration) -> Result<(), ProbeError> {
        let channel = match self.cached(endpoint) {
            Some(channel) => channel,
            None => {
                let channel = Channel::from_shared(format!("http://{endpoint}"))
                    .map_err(|source| ProbeError::Dial { endpoint: endpoint.to_string(), source })?
                    .connect()
                    .await
                    .map_err(|source| ProbeError::Dial { endpoint: endpoint.to_string(), source })?;
                self.channels.lock().insert(endpoint.to_string(), channel.clone());
                channel
            }
        };

        let mut client = PatternHealthClient::new(channel);
        let call = client.check(CheckRequest {});

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(status)) => {
                self.evict(endpoint);
                Err(ProbeError::Call { endpoint: endpoint.to_string(), status })
            }
            Err(_) => {
                self.evict(endpoint);
                Err(ProbeError::Timeout {
                    endpoint: endpoint.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use std::collections::HashSet;

    /// A probe whose verdict per endpoint is controlled by the test.
    #[derive(Clone, Default)]
    pub struct FakeHealthProbe {
        failing: Arc<parking_lot::Mutex<HashSet<String>>>,
    }

    impl FakeHealthProbe {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, endpoint: &str, failing: bool) {
            let mut guard = self.failing.lock();
            if failing {
                guard.insert(endpoint.to_string());
            } else {
                guard.remove(endpoint);
            }
        }
    }

    #[async_trait]
    impl HealthProbe for FakeHealthProbe {
        async fn check(&self, endpoint: &str, timeout: Duration) -> Result<(), ProbeError> {
            if self.failing.lock().contains(endpoint) {
                Err(ProbeError::Timeout { endpoint: endpoint.to_string(), timeout_ms: timeout.as_millis() as u64 })
            } else {
                Ok(())
            }
        }
    }
}
