// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Top-level startup failures for the `patsupd` binary. Distinct from
/// `RuntimeError`/`RegistryError`, which are request- and load-scoped
/// respectively; this is the "the daemon never got off the ground" surface.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Registry(#[from] patsup_registry::RegistryError),

    #[error(transparent)]
    Transport(#[from] tonic::transport::Error),
}
