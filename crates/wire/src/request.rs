// SPDX-License-Identifier: MIT

//! Requests a client (the `oj` CLI, or any other front-end) sends to `ojd`
//! over the daemon's Unix socket.

use oj_core::JobId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum Request {
    /// Overall status of every plan the daemon is tracking.
    Status,
    /// Jobs in a single plan directory, in dependency order.
    ListJobs { plan: String },
    /// A single job's current frontmatter state.
    GetJob { plan: String, job_id: JobId },
    /// Kick off (or resume) the orchestrator loop for a plan.
    RunPlan { plan: String },
    /// Cancel a single in-flight job.
    CancelJob { plan: String, job_id: JobId },
    /// Ask the daemon to exit once its current work settles.
    Shutdown,
}
