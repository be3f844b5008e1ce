// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graceful terminate specs: a running process stopped with a grace period
//! reaches `Terminal("requested")` and releases its health port.

use crate::support::{echo_pattern_hcl, wait_for, Daemon, SPEC_WAIT_MAX_MS};
use serde_json::Value;

fn launch_json(daemon: &Daemon, args: &[&str]) -> Value {
    let output = daemon.patsup().arg("launch").args(args).arg("--output").arg("json").output().unwrap();
    assert!(output.status.success(), "launch failed: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("launch output is valid json")
}

#[test]
#[serial_test::serial]
fn graceful_terminate_reaches_terminal_requested() {
    let daemon = Daemon::start(&[("hello", echo_pattern_hcl("hello", "none", None))]);

    let launched = launch_json(&daemon, &["hello"]);
    assert_eq!(launched["state"], "running");
    let process_id = launched["process_id"].as_str().unwrap().to_string();

    let terminate = daemon
        .patsup()
        .arg("terminate")
        .arg(&process_id)
        .arg("--grace-period-seconds")
        .arg("1")
        .arg("--output")
        .arg("json")
        .output()
        .unwrap();
    assert!(terminate.status.success(), "terminate failed: {}", String::from_utf8_lossy(&terminate.stderr));

    let reached = wait_for(SPEC_WAIT_MAX_MS, || {
        let list = daemon.patsup().arg("list").arg("--output").arg("json").output().unwrap();
        let Ok(processes) = serde_json::from_slice::<Vec<Value>>(&list.stdout) else { return false };
        processes
            .iter()
            .any(|p| p["process_id"] == process_id.as_str() && p["terminal_reason"] == "requested")
    });
    assert!(reached, "terminated process should reach Terminal(\"requested\")");

    // Launching the pattern again should spin up a brand-new process rather
    // than attaching to the terminal record.
    let relaunched = launch_json(&daemon, &["hello"]);
    assert_eq!(relaunched["process_id"], "shared:hello");
    assert_eq!(relaunched["state"], "running");
}
