// SPDX-License-Identifier: MIT

use super::*;
use crate::job::{InlinePolicy, JobStatus, JobType};

fn job(filename: &str) -> Job {
    Job {
        id: JobId::new(),
        filename: filename.into(),
        title: filename.into(),
        status: JobStatus::Pending,
        job_type: JobType::Oneshot,
        depends_on: vec![],
        model: None,
        template: None,
        worktree: None,
        include: vec![],
        inline: InlinePolicy::default(),
        prepend_dependencies: false,
        agent_continue: false,
        generate_plan_from: false,
        rules_file: None,
        created_at: None,
        updated_at: None,
        completed_at: None,
        duration: None,
        summary: None,
        body: String::new(),
        body_separator: "\n\n".to_string(),
        has_dangling_dependency: false,
    }
}

#[test]
fn plan_name_derives_from_directory() {
    let plan = Plan::new(PathBuf::from("/tmp/plans/release-9"), PlanDefaults::default(), vec![]).unwrap();
    assert_eq!(plan.name, "release-9");
}

#[test]
fn duplicate_job_id_rejected() {
    let mut j1 = job("a.md");
    let j2 = job("b.md");
    j1.id = j2.id;
    let err = Plan::new(PathBuf::from("/tmp/p"), PlanDefaults::default(), vec![j1, j2]).unwrap_err();
    assert!(matches!(err, PlanError::DuplicateId(_)));
}

#[test]
fn duplicate_filename_rejected() {
    let j1 = job("a.md");
    let j2 = job("a.md");
    let err = Plan::new(PathBuf::from("/tmp/p"), PlanDefaults::default(), vec![j1, j2]).unwrap_err();
    assert!(matches!(err, PlanError::DuplicateFilename(_)));
}

#[test]
fn lookup_by_id_and_filename() {
    let j1 = job("01-a.md");
    let id = j1.id;
    let plan = Plan::new(PathBuf::from("/tmp/p"), PlanDefaults::default(), vec![j1]).unwrap();
    assert_eq!(plan.job(id).unwrap().filename, "01-a.md");
    assert_eq!(plan.job_by_filename("01-a.md").unwrap().id, id);
}

#[test]
fn append_rejects_duplicate_filename() {
    let j1 = job("01-a.md");
    let mut plan = Plan::new(PathBuf::from("/tmp/p"), PlanDefaults::default(), vec![j1]).unwrap();
    let dup = job("01-a.md");
    let err = plan.append(dup).unwrap_err();
    assert!(matches!(err, PlanError::DuplicateFilename(_)));
}

#[test]
fn resolve_all_dependencies_fills_map_for_every_job() {
    let a = job("01-a.md");
    let mut b = job("02-b.md");
    b.depends_on = vec!["01-a.md".to_string()];
    let a_id = a.id;
    let mut plan = Plan::new(PathBuf::from("/tmp/p"), PlanDefaults::default(), vec![a, b]).unwrap();
    let resolved = plan.resolve_all_dependencies();
    let b_id = plan.job_by_filename("02-b.md").unwrap().id;
    assert_eq!(resolved.get(&b_id).unwrap(), &vec![a_id]);
}

#[test]
fn worktree_dir_is_scoped_under_plan_directory() {
    let plan = Plan::new(PathBuf::from("/tmp/p"), PlanDefaults::default(), vec![]).unwrap();
    assert_eq!(plan.worktree_dir("feature-x"), PathBuf::from("/tmp/p/.grove-worktrees/feature-x"));
}
