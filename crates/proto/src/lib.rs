// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generated gRPC/protobuf bindings for the supervisor's control-plane
//! surface. Nothing hand-written lives here beyond the `include!`.

pub mod supervisor {
    tonic::include_proto!("supervisor");
}
