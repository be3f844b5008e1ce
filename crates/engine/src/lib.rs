// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! patsup-engine: the process manager, spawner/health adapters, port
//! allocator, and work queue that turn pattern manifests into supervised
//! OS processes.

pub mod config;
pub mod error;
pub mod health;
pub mod manager;
pub mod port_allocator;
pub mod queue;
pub mod spawner;

pub use config::EngineConfig;
pub use error::{ProbeError, RuntimeError, SpawnError};
pub use health::{GrpcHealthProbe, HealthProbe};
pub use manager::ProcessManager;
pub use port_allocator::PortAllocator;
pub use spawner::{ChildHandle, RealSpawner, SpawnSpec, Spawner};
