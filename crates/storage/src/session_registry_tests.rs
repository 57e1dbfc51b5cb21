// SPDX-License-Identifier: MIT

use super::*;
use oj_core::JobId;
use std::path::PathBuf;

fn session(job_id: &str, pid: u32) -> Session {
    Session {
        job_id: JobId::from_string(job_id),
        provider: "claude".into(),
        pid,
        native_session_id: None,
        transcript_path: PathBuf::from("/tmp/transcript.log"),
        status: SessionStatus::Starting,
        started_at: "2026-01-01T00:00:00Z".into(),
    }
}

struct AlwaysAlive;
impl PidProbe for AlwaysAlive {
    fn is_alive(&self, _pid: u32, _hint: &str) -> bool {
        true
    }
}

struct AlwaysDead;
impl PidProbe for AlwaysDead {
    fn is_alive(&self, _pid: u32, _hint: &str) -> bool {
        false
    }
}

#[test]
fn register_then_find_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let reg = SessionRegistry::new(dir.path().join("sessions.json"));
    reg.register(session("job-1", 111)).unwrap();

    let found = reg.find(&JobId::from_string("job-1")).unwrap().unwrap();
    assert_eq!(found.pid, 111);
    assert_eq!(found.status, SessionStatus::Starting);
}

#[test]
fn register_twice_for_same_job_errors() {
    let dir = tempfile::tempdir().unwrap();
    let reg = SessionRegistry::new(dir.path().join("sessions.json"));
    reg.register(session("job-1", 111)).unwrap();

    let err = reg.register(session("job-1", 222)).unwrap_err();
    assert!(matches!(err, StorageError::SessionAlreadyRegistered(_)));
}

#[test]
fn update_session_id_sets_native_id_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let reg = SessionRegistry::new(dir.path().join("sessions.json"));
    reg.register(session("job-1", 111)).unwrap();
    reg.update_session_id(&JobId::from_string("job-1"), "tmux-session-7").unwrap();

    let found = reg.find(&JobId::from_string("job-1")).unwrap().unwrap();
    assert_eq!(found.native_session_id.as_deref(), Some("tmux-session-7"));
    assert_eq!(found.status, SessionStatus::Alive);
}

#[test]
fn remove_drops_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let reg = SessionRegistry::new(dir.path().join("sessions.json"));
    reg.register(session("job-1", 111)).unwrap();

    let removed = reg.remove(&JobId::from_string("job-1")).unwrap();
    assert!(removed.is_some());
    assert!(reg.find(&JobId::from_string("job-1")).unwrap().is_none());
}

#[test]
fn reconcile_with_dead_pid_drops_record_and_reports_job() {
    let dir = tempfile::tempdir().unwrap();
    let reg = SessionRegistry::new(dir.path().join("sessions.json"));
    reg.register(session("job-1", 111)).unwrap();
    reg.register(session("job-2", 222)).unwrap();

    let report = reg.reconcile(&AlwaysDead).unwrap();
    assert_eq!(report.interrupted.len(), 2);
    assert!(reg.all().unwrap().is_empty());
}

#[test]
fn reconcile_with_live_pid_leaves_record_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let reg = SessionRegistry::new(dir.path().join("sessions.json"));
    reg.register(session("job-1", 111)).unwrap();

    let report = reg.reconcile(&AlwaysAlive).unwrap();
    assert!(report.interrupted.is_empty());
    assert_eq!(reg.all().unwrap().len(), 1);
}

#[test]
fn reconcile_on_missing_file_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let reg = SessionRegistry::new(dir.path().join("does-not-exist.json"));
    let report = reg.reconcile(&AlwaysDead).unwrap();
    assert!(report.interrupted.is_empty());
}
