// SPDX-License-Identifier: MIT

//! The shared error-kind vocabulary of spec.md §7. Each crate still defines
//! its own narrow `thiserror` enum for its own fallible operations; this
//! enum is the common tag attached at the job-execution boundary so the
//! orchestrator can apply one recovery policy table regardless of which
//! crate raised the underlying error.

use crate::job::JobId;
use std::time::Duration;

/// A job-execution error, tagged with its recovery policy (spec.md §7).
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("malformed frontmatter in {filename}: {reason}")]
    MalformedFrontmatter { filename: String, reason: String },

    #[error("duplicate job id {0}")]
    DuplicateId(JobId),

    #[error("dependency cycle: {0}")]
    Cycle(String),

    #[error("dangling dependency in job {job_id}")]
    DanglingDependency { job_id: JobId },

    #[error("prompt exceeds provider limit ({size} bytes)")]
    PromptTooLong { size: usize },

    #[error("provider transport error: {0}")]
    ProviderTransport(String),

    #[error("provider refused: {0}")]
    ProviderRefusal(String),

    #[error("worktree busy: {name}")]
    WorktreeBusy { name: String },

    #[error("child exited with status {code}")]
    ChildExitNonZero { code: i32 },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("canceled")]
    Canceled,
}

impl JobError {
    /// Whether the orchestrator should retry this error locally before
    /// giving up (spec.md §7 "locally recoverable" column).
    pub fn is_locally_recoverable(&self) -> bool {
        matches!(self, JobError::ProviderTransport(_) | JobError::WorktreeBusy { .. })
    }

    /// The job status this error resolves to once recovery (if any) is
    /// exhausted.
    pub fn resulting_status(&self) -> crate::job::JobStatus {
        use crate::job::JobStatus;
        match self {
            JobError::Canceled => JobStatus::Interrupted,
            JobError::DanglingDependency { .. } => JobStatus::Blocked,
            _ => JobStatus::Failed,
        }
    }

    /// Only these two abort the whole run at graph-build time; every other
    /// kind is collected and reported as part of an aggregate failure.
    pub fn aborts_run(&self) -> bool {
        matches!(self, JobError::Cycle(_) | JobError::DuplicateId(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
