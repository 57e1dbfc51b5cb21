// SPDX-License-Identifier: MIT

//! Shared test fixtures for `oj-engine`'s executor and orchestrator tests.

#![cfg(test)]

use oj_core::job::{Job, JobStatus, JobType};
use oj_core::plan::{Plan, PlanDefaults};
use oj_core::JobId;
use std::path::PathBuf;

pub fn test_job(filename: &str, job_type: JobType, body: &str) -> Job {
    Job {
        id: JobId::new(),
        filename: filename.to_string(),
        title: filename.to_string(),
        status: JobStatus::Pending,
        job_type,
        depends_on: Vec::new(),
        model: None,
        template: None,
        worktree: None,
        include: Vec::new(),
        inline: Default::default(),
        prepend_dependencies: false,
        agent_continue: false,
        generate_plan_from: false,
        rules_file: None,
        created_at: None,
        updated_at: None,
        completed_at: None,
        duration: None,
        summary: None,
        body: body.to_string(),
        body_separator: "\n\n".to_string(),
        has_dangling_dependency: false,
    }
}

pub fn test_plan(dir: PathBuf, jobs: Vec<Job>) -> Plan {
    Plan::new(dir, PlanDefaults::default(), jobs).unwrap()
}
