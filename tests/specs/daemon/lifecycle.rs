// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle specs: a namespace-isolated pattern launched end to end
//! through a real `patsupd` and the `patsup` CLI.

use crate::support::{echo_pattern_hcl, wait_for, Daemon, SPEC_WAIT_MAX_MS};
use serde_json::Value;

fn launch_json(daemon: &Daemon, args: &[&str]) -> Value {
    let output = daemon.patsup().arg("launch").args(args).arg("--output").arg("json").output().unwrap();
    assert!(output.status.success(), "launch failed: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("launch output is valid json")
}

#[test]
#[serial_test::serial]
fn happy_path_namespace_launch_reaches_running() {
    let daemon = Daemon::start(&[("hello", echo_pattern_hcl("hello", "namespace", None))]);

    let snapshot = launch_json(
        &daemon,
        &["hello", "--namespace", "tenant-a", "--isolation", "namespace"],
    );

    assert_eq!(snapshot["process_id"], "ns:tenant-a:hello");
    assert_eq!(snapshot["state"], "running");
    let port = snapshot["health_port"].as_u64().expect("health_port present");
    assert!((50100..=50999).contains(&port) || port > 0, "health_port should be a real port: {port}");

    let list = daemon.patsup().arg("list").arg("--output").arg("json").output().unwrap();
    assert!(list.status.success());
    let processes: Vec<Value> = serde_json::from_slice(&list.stdout).unwrap();
    assert_eq!(processes.len(), 1);
    assert_eq!(processes[0]["process_id"], "ns:tenant-a:hello");
}

#[test]
#[serial_test::serial]
fn launch_is_idempotent_for_the_same_namespace() {
    let daemon = Daemon::start(&[("hello", echo_pattern_hcl("hello", "namespace", None))]);

    let first =
        launch_json(&daemon, &["hello", "--namespace", "tenant-a", "--isolation", "namespace"]);
    let second =
        launch_json(&daemon, &["hello", "--namespace", "tenant-a", "--isolation", "namespace"]);

    assert_eq!(first["process_id"], second["process_id"]);
    assert_eq!(first["health_port"], second["health_port"]);

    let list = daemon.patsup().arg("list").arg("--output").arg("json").output().unwrap();
    let processes: Vec<Value> = serde_json::from_slice(&list.stdout).unwrap();
    assert_eq!(processes.len(), 1, "a repeated launch must not spawn a second process");
}

#[test]
#[serial_test::serial]
fn crashing_pattern_exhausts_into_a_terminal_crash_loop() {
    let daemon = Daemon::start(&[("broken", echo_pattern_hcl("broken", "none", Some("crash")))]);

    let output = daemon.patsup().arg("launch").arg("broken").arg("--output").arg("json").output().unwrap();
    // `launch` blocks for the await-settled deadline; a permanently crashing
    // child eventually reports back as a failed RPC or a terminal snapshot
    // depending on how fast exhaustion beats the deadline.
    let snapshot: Option<Value> =
        if output.status.success() { serde_json::from_slice(&output.stdout).ok() } else { None };

    let reached_terminal = wait_for(SPEC_WAIT_MAX_MS, || {
        let list = daemon.patsup().arg("list").arg("--output").arg("json").output().unwrap();
        let Ok(processes) = serde_json::from_slice::<Vec<Value>>(&list.stdout) else { return false };
        processes.iter().any(|p| p["pattern_name"] == "broken" && p["state"] == "terminal")
    });

    assert!(
        reached_terminal || snapshot.as_ref().map(|s| s["state"] == "terminal").unwrap_or(false),
        "a permanently crashing pattern should end up terminal"
    );
}
