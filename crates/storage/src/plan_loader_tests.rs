// SPDX-License-Identifier: MIT

use super::*;
use oj_core::job::JobType;
use std::fs;

fn write_job(dir: &std::path::Path, filename: &str, id: &str, depends_on: &[&str]) {
    let deps = depends_on.iter().map(|d| format!("  - {d}\n")).collect::<String>();
    let deps_block = if deps.is_empty() { String::new() } else { format!("depends_on:\n{deps}") };
    let contents = format!(
        "---\nid: {id}\ntitle: Test job\ntype: oneshot\nstatus: pending\n{deps_block}---\n\nbody text\n"
    );
    fs::write(dir.join(filename), contents).unwrap();
}

#[test]
fn load_plan_enumerates_md_files_in_order_and_resolves_deps() {
    let dir = tempfile::tempdir().unwrap();
    write_job(dir.path(), "01-a.md", "job-a", &[]);
    write_job(dir.path(), "02-b.md", "job-b", &["01-a.md"]);

    let plan = load_plan(dir.path()).unwrap();
    assert_eq!(plan.jobs().len(), 2);
    let b = plan.jobs().iter().find(|j| j.filename == "02-b.md").unwrap();
    assert!(!b.has_dangling_dependency);
}

#[test]
fn load_plan_excludes_archive_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_job(dir.path(), "01-a.md", "job-a", &[]);
    fs::create_dir(dir.path().join(".archive")).unwrap();
    write_job(&dir.path().join(".archive"), "00-old.md", "job-old", &[]);

    let plan = load_plan(dir.path()).unwrap();
    assert_eq!(plan.jobs().len(), 1);
}

#[test]
fn load_plan_duplicate_id_errors() {
    let dir = tempfile::tempdir().unwrap();
    write_job(dir.path(), "01-a.md", "job-a", &[]);
    write_job(dir.path(), "02-b.md", "job-a", &[]);

    let err = load_plan(dir.path()).unwrap_err();
    assert!(matches!(err, StorageError::DuplicateId { .. }));
}

#[test]
fn load_plan_dangling_dependency_is_flagged_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_job(dir.path(), "01-a.md", "job-a", &["missing.md"]);

    let plan = load_plan(dir.path()).unwrap();
    let a = &plan.jobs()[0];
    assert!(a.has_dangling_dependency);
}

#[test]
fn persister_update_status_patches_only_status() {
    let dir = tempfile::tempdir().unwrap();
    write_job(dir.path(), "01-a.md", "job-a", &[]);
    let observer = RecordingObserver::default();
    let persister = PlanPersister::new(dir.path().to_path_buf(), &observer);

    persister.update_status("01-a.md", JobStatus::Running).unwrap();

    let reloaded = load_plan(dir.path()).unwrap();
    let job = &reloaded.jobs()[0];
    assert_eq!(job.status, JobStatus::Running);
    assert_eq!(job.body, "body text\n");
    assert_eq!(observer.events.lock().len(), 1);
}

#[test]
fn persister_append_output_preserves_prior_body() {
    let dir = tempfile::tempdir().unwrap();
    write_job(dir.path(), "01-a.md", "job-a", &[]);
    let observer = NullObserver;
    let persister = PlanPersister::new(dir.path().to_path_buf(), &observer);

    persister.append_output("01-a.md", "## Output\nresult\n").unwrap();

    let reloaded = load_plan(dir.path()).unwrap();
    assert!(reloaded.jobs()[0].body.contains("body text\n"));
    assert!(reloaded.jobs()[0].body.contains("## Output\nresult\n"));
}

#[test]
fn persister_update_type_changes_job_type() {
    let dir = tempfile::tempdir().unwrap();
    write_job(dir.path(), "01-a.md", "job-a", &[]);
    let observer = NullObserver;
    let persister = PlanPersister::new(dir.path().to_path_buf(), &observer);

    persister.update_type("01-a.md", JobType::Shell).unwrap();

    let reloaded = load_plan(dir.path()).unwrap();
    assert_eq!(reloaded.jobs()[0].job_type, JobType::Shell);
}

#[test]
fn persister_rename_updates_dependents_depends_on() {
    let dir = tempfile::tempdir().unwrap();
    write_job(dir.path(), "01-a.md", "job-a", &[]);
    write_job(dir.path(), "02-b.md", "job-b", &["01-a.md"]);
    let observer = NullObserver;
    let persister = PlanPersister::new(dir.path().to_path_buf(), &observer);

    persister.rename("01-a.md", "Renamed".into(), Some("01-renamed.md".into())).unwrap();

    assert!(!dir.path().join("01-a.md").exists());
    assert!(dir.path().join("01-renamed.md").exists());

    let reloaded = load_plan(dir.path()).unwrap();
    let b = reloaded.jobs().iter().find(|j| j.filename == "02-b.md").unwrap();
    assert_eq!(b.depends_on, vec!["01-renamed.md".to_string()]);
}

#[test]
fn persister_remove_job_emits_job_removed() {
    let dir = tempfile::tempdir().unwrap();
    write_job(dir.path(), "01-a.md", "job-a", &[]);
    let observer = RecordingObserver::default();
    let persister = PlanPersister::new(dir.path().to_path_buf(), &observer);

    persister.remove_job("01-a.md").unwrap();

    assert!(!dir.path().join("01-a.md").exists());
    assert!(matches!(observer.events.lock()[0], ObserverEvent::JobRemoved { .. }));
}
