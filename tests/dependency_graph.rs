// SPDX-License-Identifier: MIT

//! `oj resolve` against on-disk plan fixtures (spec.md §4.3, §8 scenario 4).

use crate::prelude::{oj, PlanFixture};
use serde_json::Value;

#[test]
fn linear_dependency_orders_before_its_dependent() {
    let plan = PlanFixture::empty();
    plan.job("02-b.md", "shell", "echo b", &["01-a.md"]);
    plan.job("01-a.md", "shell", "echo a", &[]);

    let output = oj()
        .args(["--output", "json", "resolve"])
        .arg(&plan.path)
        .output()
        .expect("run oj resolve");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: Value = serde_json::from_slice(&output.stdout).expect("json report");
    let order: Vec<&str> = report["order"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    let a_pos = order.iter().position(|f| *f == "01-a.md").unwrap();
    let b_pos = order.iter().position(|f| *f == "02-b.md").unwrap();
    assert!(a_pos < b_pos, "expected 01-a.md before 02-b.md in {order:?}");

    let ready: Vec<&str> = report["ready"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert_eq!(ready, vec!["01-a.md"], "only the dependency-free job should be ready");
}

#[test]
fn two_job_cycle_reports_err_cycle_naming_both() {
    let plan = PlanFixture::empty();
    plan.job("01-x.md", "shell", "echo x", &["02-y.md"]);
    plan.job("02-y.md", "shell", "echo y", &["01-x.md"]);

    let output = oj().args(["resolve"]).arg(&plan.path).output().expect("run oj resolve");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cycle"), "expected a cycle error, got: {stderr}");
}
