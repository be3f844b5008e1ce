// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level black-box specs. Each submodule drives a real `patsupd`
//! through the `patsup` CLI and the `echo-health` fixture pattern, exactly
//! as an operator or client would.

#[allow(dead_code)]
#[path = "support.rs"]
mod support;

mod daemon {
    mod isolation;
    mod lifecycle;
    mod terminate;
}
