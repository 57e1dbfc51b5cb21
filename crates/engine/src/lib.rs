// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-engine: the execution half of the `oj` orchestrator — the Briefing
//! Assembler (spec.md §4.4), the LLM capability seam, the Worktree Manager
//! (§4.6), the per-job-type Executors (§4.8), emergent plan expansion, and
//! the Scheduler that ties them together (§4.9). `oj-core`/`oj-storage`
//! define and persist the data model; this crate runs it.

pub mod briefing;
pub mod emergent;
pub mod events;
pub mod executor;
pub mod executors;
pub mod llm;
pub mod notify;
pub mod orchestrator;
pub mod worktree;

#[cfg(test)]
mod test_support;

pub use briefing::{Briefing, BriefingAssembler, BriefingError, BriefingOptions};
pub use events::{EngineEvent, EventSink, NullEventSink, ObserverBridge, RecordingEventSink};
pub use executor::{ExecutionRequest, Executor, ExecutorRegistry, NullWriter, Outcome, OutputWriter};
pub use llm::{LlmAdapter, LlmError, LlmRequest};
pub use notify::{NotifyBridge, Notifier, NullNotifier};
pub use orchestrator::{
    LlmSummarizer, NullSummarizer, Orchestrator, OrchestratorConfig, OrchestratorError, RunFilter, RunReport,
    Summarizer,
};
pub use worktree::{WorktreeError, WorktreeManager};
