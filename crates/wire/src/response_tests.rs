// SPDX-License-Identifier: MIT

use super::*;
use oj_core::{InlinePolicy, Job, JobType};

fn sample_job() -> Job {
    Job {
        id: JobId::new(),
        filename: "001-build.md".to_string(),
        title: "build".to_string(),
        status: JobStatus::Pending,
        job_type: JobType::Oneshot,
        depends_on: Vec::new(),
        model: None,
        template: None,
        worktree: None,
        include: Vec::new(),
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
fn job_summary_mirrors_the_fields_a_client_needs() {
    let job = sample_job();
    let summary = JobSummary::from(&job);
    assert_eq!(summary.id, job.id);
    assert_eq!(summary.filename, job.filename);
    assert_eq!(summary.status, job.status);
}

#[test]
fn response_round_trips_through_json() {
    let response = Response::Job(JobSummary::from(&sample_job()));
    let json = serde_json::to_string(&response).expect("serialize");
    let _: Response = serde_json::from_str(&json).expect("deserialize");
}

#[test]
fn error_response_carries_a_message() {
    let response = Response::Error { message: "plan not found".to_string() };
    let json = serde_json::to_string(&response).expect("serialize");
    assert!(json.contains("plan not found"));
}
