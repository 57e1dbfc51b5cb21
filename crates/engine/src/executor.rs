// SPDX-License-Identifier: MIT

//! The Executor contract (spec.md §4.8): one `Execute(ctx, job, plan,
//! writer) -> err` method per job type, all honoring the same state
//! machine and cancellation discipline. `oj-daemon` selects an executor by
//! `job.job_type` through the [`ExecutorRegistry`].

use crate::briefing::Briefing;
use oj_core::job::Job;
use oj_core::plan::Plan;
use oj_core::{JobError, JobType, Session};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything an executor needs to run one job, already resolved by the
/// orchestrator: the assembled briefing, the isolated working directory
/// (or repo root), and a cancellation token tied to the run.
pub struct ExecutionRequest<'a> {
    pub job: &'a Job,
    pub plan: &'a Plan,
    pub briefing: &'a Briefing,
    pub workdir: &'a Path,
    pub cancel: CancellationToken,
    /// RFC3339 timestamp for this attempt, from the orchestrator's `Clock`
    /// — executors that mint a `Session` record stamp `started_at` with it
    /// rather than reading the wall clock themselves, keeping execution
    /// deterministic under test.
    pub now: String,
}

/// Sink for an executor's user-visible output: both the log stream an
/// observer subscribes to and the audit file descriptor the orchestrator
/// opened for this job (spec.md §4.8).
pub trait OutputWriter: Send + Sync {
    fn write_line(&self, line: &str);
}

/// An `OutputWriter` that throws every line away, for callers that only
/// want the final appended text (e.g. `oneshot`, which has no streaming
/// output of its own).
pub struct NullWriter;

impl OutputWriter for NullWriter {
    fn write_line(&self, _line: &str) {}
}

/// Collects every line written, in order — used by executors that also
/// need the full transcript to build their final append text.
#[derive(Default)]
pub struct BufferingWriter {
    pub lines: parking_lot::Mutex<Vec<String>>,
}

impl OutputWriter for BufferingWriter {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

impl BufferingWriter {
    pub fn joined(&self) -> String {
        self.lines.lock().join("\n")
    }
}

/// What an executor produced, for the orchestrator to persist (spec.md
/// §4.8's per-type completion semantics).
pub enum Outcome {
    /// Job finished; `append_text` is written verbatim to the job file, the
    /// way the executor wants it framed (an `## Output` section for most
    /// types, a raw chat turn for `chat`).
    Completed { append_text: String, needs_review: bool, summary_seed: Option<String> },
    /// `chat`'s no-op case: the last turn is already an `llm` turn, so
    /// there is nothing to do (spec.md §4.8 `chat`).
    NoOp,
    /// `interactive_agent` returns immediately without blocking on
    /// completion; the orchestrator registers `session` and polls it on
    /// later ticks.
    Running { session: Session },
}

#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, req: ExecutionRequest<'_>, writer: &dyn OutputWriter) -> Result<Outcome, JobError>;
}

/// Maps a job's `type` to the `Executor` that runs it (spec.md §4.8, §9
/// "polymorphism ... a registry `type → Executor`").
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<JobType, Arc<dyn Executor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job_type: JobType, executor: Arc<dyn Executor>) -> &mut Self {
        self.executors.insert(job_type, executor);
        self
    }

    pub fn get(&self, job_type: JobType) -> Option<&Arc<dyn Executor>> {
        self.executors.get(&job_type)
    }
}

pub fn output_section(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "\n\n## Output\n".to_string()
    } else {
        format!("\n\n## Output\n\n{trimmed}\n")
    }
}

/// Default transcript path for an agent `Session` record, shared by the
/// `headless_agent` and `interactive_agent` executors.
pub(crate) fn default_transcript_path(job: &Job, plan: &Plan) -> PathBuf {
    plan.directory.join(".artifacts").join(job.id.to_string()).join("session.log")
}
