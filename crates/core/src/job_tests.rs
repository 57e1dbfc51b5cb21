// SPDX-License-Identifier: MIT

use super::*;
use std::collections::HashSet;

#[test]
fn status_parses_round_trip() {
    for s in [
        "pending", "todo", "hold", "running", "completed", "failed", "blocked", "needs_review",
        "abandoned", "pending_user", "pending_llm", "interrupted",
    ] {
        let parsed: JobStatus = s.parse().unwrap();
        assert_eq!(parsed.to_string(), s);
    }
}

#[yare::parameterized(
    pending_to_running        = { JobStatus::Pending,     JobStatus::Running,     true },
    completed_to_running      = { JobStatus::Completed,   JobStatus::Running,     false },
    failed_to_pending         = { JobStatus::Failed,      JobStatus::Pending,     true },
    running_to_interrupted    = { JobStatus::Running,     JobStatus::Interrupted, true },
    running_to_completed      = { JobStatus::Running,     JobStatus::Completed,   true },
    running_to_needs_review   = { JobStatus::Running,     JobStatus::NeedsReview, false },
    completed_to_needs_review = { JobStatus::Completed,   JobStatus::NeedsReview, true },
    abandoned_to_pending      = { JobStatus::Abandoned,   JobStatus::Pending,     false },
    blocked_to_running        = { JobStatus::Blocked,     JobStatus::Running,     true },
    same_status_is_a_no_op    = { JobStatus::Running,     JobStatus::Running,     true },
)]
fn status_transitions_follow_the_state_machine(from: JobStatus, to: JobStatus, expected_ok: bool) {
    assert_eq!(from.transition(to).is_ok(), expected_ok);
}

#[test]
fn abandoned_is_terminal_and_unreachable_from_completed() {
    assert!(JobStatus::Completed.is_terminal());
    assert!(!JobStatus::Completed.can_transition_to(JobStatus::Abandoned));
}

#[test]
fn dependency_resolution_by_filename_then_id() {
    let mut job = Job {
        id: JobId::new(),
        filename: "02-b.md".into(),
        title: "b".into(),
        status: JobStatus::Pending,
        job_type: JobType::Oneshot,
        depends_on: vec!["01-a.md".into(), "job-doesnotexist".into()],
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
    };

    let a_id = JobId::new();
    let mut by_filename = HashMap::new();
    by_filename.insert("01-a.md".to_string(), a_id);
    let known: HashSet<JobId> = [a_id].into_iter().collect();

    let resolved = job.resolve_dependencies(&by_filename, &known);
    assert_eq!(resolved, vec![a_id]);
    assert!(job.has_dangling_dependency);
}
