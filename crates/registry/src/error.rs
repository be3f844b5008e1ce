// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("manifest directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, #[source] source: hcl::Error },

    #[error("pattern '{0}' defined in multiple manifest files")]
    Duplicate(String),

    #[error("pattern '{name}' in {path}: {message}")]
    Invalid { name: String, path: PathBuf, message: String },
}
