// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! patsup-core: entities and pure logic shared by the pattern process
//! supervisor's registry, engine, and daemon crates.
//!
//! Nothing in this crate touches the filesystem, a socket, or a subprocess —
//! it owns only the data model, the isolation key derivation, the backoff
//! policy, and the work-queue item types.

pub mod action;
pub mod backoff;
pub mod clock;
pub mod error;
pub mod ids;
pub mod isolation;
pub mod pattern;
pub mod process;
pub mod snapshot;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use action::{Action, WorkItem};
pub use backoff::backoff_delay;
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::IsolationError;
pub use ids::ProcessId;
pub use isolation::{derive_process_id, IsolationKey, IsolationLevel};
pub use pattern::{Pattern, ProbeConfig, ResourceHints};
pub use process::{ProcessRecord, ProcessState, TerminalReason};
pub use snapshot::ProcessSnapshot;
