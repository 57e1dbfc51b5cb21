// SPDX-License-Identifier: MIT

use super::*;
use oj_core::JobId;
use std::fs;
use tempfile::TempDir;

fn write_job(dir: &std::path::Path, filename: &str, id: &str) {
    let contents = format!("---\nid: {id}\ntitle: Test job\ntype: shell\nstatus: pending\n---\n\necho hi\n");
    fs::write(dir.join(filename), contents).unwrap();
}

#[tokio::test]
async fn list_jobs_returns_jobs_from_plan_directory() {
    let tmp = TempDir::new().unwrap();
    write_job(tmp.path(), "01-a.md", "job-a");

    let response = list_jobs(&tmp.path().to_string_lossy());
    match response {
        Response::Jobs(jobs) => {
            assert_eq!(jobs.len(), 1);
            assert_eq!(jobs[0].title, "Test job");
        }
        other => panic!("expected Jobs, got {other:?}"),
    }
}

#[tokio::test]
async fn get_job_errors_for_unknown_job() {
    let tmp = TempDir::new().unwrap();
    write_job(tmp.path(), "01-a.md", "job-a");

    let response = get_job(&tmp.path().to_string_lossy(), JobId::from_string("job-missing"));
    assert!(matches!(response, Response::Error { .. }));
}

#[tokio::test]
async fn get_job_returns_matching_summary() {
    let tmp = TempDir::new().unwrap();
    write_job(tmp.path(), "01-a.md", "job-a");

    let response = get_job(&tmp.path().to_string_lossy(), JobId::from_string("job-a"));
    match response {
        Response::Job(job) => assert_eq!(job.filename, "01-a.md"),
        other => panic!("expected Job, got {other:?}"),
    }
}

#[tokio::test]
async fn cancel_job_errors_when_no_session_registered() {
    let tmp = TempDir::new().unwrap();
    write_job(tmp.path(), "01-a.md", "job-a");

    let registry = Arc::new(oj_storage::SessionRegistry::new(tmp.path().join("sessions.json")));
    let state = Arc::new(DaemonState::new(tmp.path().to_path_buf(), registry));

    let response = cancel_job(&state, &tmp.path().to_string_lossy(), JobId::from_string("job-a")).await;
    assert!(matches!(response, Response::Error { .. }));
}

#[tokio::test]
async fn status_reports_zero_plans_before_any_orchestrator_is_built() {
    let tmp = TempDir::new().unwrap();
    let registry = Arc::new(oj_storage::SessionRegistry::new(tmp.path().join("sessions.json")));
    let state = Arc::new(DaemonState::new(tmp.path().to_path_buf(), registry));

    match status(&state) {
        Response::Status(statuses) => assert!(statuses.is_empty()),
        other => panic!("expected Status, got {other:?}"),
    }
}
