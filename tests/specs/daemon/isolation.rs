// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Isolation-router specs: namespace-isolated launches get distinct
//! processes, while `none`-isolated launches consolidate onto one.

use crate::support::{echo_pattern_hcl, Daemon};
use serde_json::Value;
use std::thread;

fn launch_json(daemon: &Daemon, args: &[&str]) -> Value {
    let output = daemon.patsup().arg("launch").args(args).arg("--output").arg("json").output().unwrap();
    assert!(output.status.success(), "launch failed: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("launch output is valid json")
}

#[test]
#[serial_test::serial]
fn distinct_namespaces_get_distinct_processes() {
    let daemon = Daemon::start(&[("hello", echo_pattern_hcl("hello", "namespace", None))]);

    let a = launch_json(&daemon, &["hello", "--namespace", "tenant-a", "--isolation", "namespace"]);
    let b = launch_json(&daemon, &["hello", "--namespace", "tenant-b", "--isolation", "namespace"]);

    assert_eq!(a["process_id"], "ns:tenant-a:hello");
    assert_eq!(b["process_id"], "ns:tenant-b:hello");
    assert_ne!(a["process_id"], b["process_id"]);
    assert_ne!(a["health_port"], b["health_port"], "distinct tenants must not share a process");

    let list = daemon.patsup().arg("list").arg("--output").arg("json").output().unwrap();
    let processes: Vec<Value> = serde_json::from_slice(&list.stdout).unwrap();
    assert_eq!(processes.len(), 2);
}

#[test]
#[serial_test::serial]
fn unisolated_pattern_consolidates_concurrent_launches() {
    let daemon = Daemon::start(&[("hello", echo_pattern_hcl("hello", "none", None))]);

    // Three concurrent clients launching the same `none`-isolated pattern
    // should all land on the one shared process.
    let snapshots: Vec<Value> = thread::scope(|scope| {
        let handles: Vec<_> = (0..3)
            .map(|_| scope.spawn(|| launch_json(&daemon, &["hello"])))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for snapshot in &snapshots {
        assert_eq!(snapshot["process_id"], "shared:hello");
        assert_eq!(snapshot["health_port"], snapshots[0]["health_port"]);
    }

    let list = daemon.patsup().arg("list").arg("--output").arg("json").output().unwrap();
    let processes: Vec<Value> = serde_json::from_slice(&list.stdout).unwrap();
    assert_eq!(processes.len(), 1, "concurrent launches of a shared pattern must consolidate");
}
