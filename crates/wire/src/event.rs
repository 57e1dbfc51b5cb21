// SPDX-License-Identifier: MIT

//! Wire representation of the Observer Interface (spec.md §6): every event
//! a daemon-hosted orchestrator run can push to a subscribed front-end,
//! whether that's the job-level disk events `oj-storage` emits directly or
//! the run-level events only `oj-engine`'s orchestrator can observe.

use oj_core::JobId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WireEvent {
    JobAdded { job_id: JobId },
    JobUpdated { job_id: JobId, field: String },
    JobRemoved { job_id: JobId },
    RunStarted { plan: String },
    RunFinished { plan: String, error: Option<String> },
    LogLine { job_id: JobId, line: String },
}

impl From<oj_storage::ObserverEvent> for WireEvent {
    fn from(event: oj_storage::ObserverEvent) -> Self {
        match event {
            oj_storage::ObserverEvent::JobAdded { job_id } => WireEvent::JobAdded { job_id },
            oj_storage::ObserverEvent::JobUpdated { job_id, field } => {
                WireEvent::JobUpdated { job_id, field }
            }
            oj_storage::ObserverEvent::JobRemoved { job_id } => WireEvent::JobRemoved { job_id },
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
