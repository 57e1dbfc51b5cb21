// SPDX-License-Identifier: MIT

//! Responses `ojd` sends back over the Unix socket, mirroring the
//! [`crate::request::Request`] a client sent.

use crate::event::WireEvent;
use oj_core::{JobId, JobStatus, JobType};
use serde::{Deserialize, Serialize};

/// A flattened view of a job, enough for a status listing or a single
/// `GetJob` reply without forcing the client to parse frontmatter itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub filename: String,
    pub title: String,
    pub status: JobStatus,
    pub job_type: JobType,
    pub depends_on: Vec<String>,
}

impl From<&oj_core::Job> for JobSummary {
    fn from(job: &oj_core::Job) -> Self {
        JobSummary {
            id: job.id.clone(),
            filename: job.filename.clone(),
            title: job.title.clone(),
            status: job.status,
            job_type: job.job_type,
            depends_on: job.depends_on.clone(),
        }
    }
}

/// Plan-wide counts for [`Request::Status`](crate::request::Request::Status).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStatus {
    pub plan: String,
    pub running: Vec<JobSummary>,
    pub ready: Vec<JobSummary>,
    pub blocked: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Status(Vec<PlanStatus>),
    Jobs(Vec<JobSummary>),
    Job(JobSummary),
    Event(WireEvent),
    Error { message: String },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
