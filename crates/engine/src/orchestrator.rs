// SPDX-License-Identifier: MIT

//! Orchestrator / Scheduler (spec.md §4.9 I): reconciles session state,
//! reloads the plan fresh from disk, computes the ready set, and dispatches
//! jobs to their executors under a bounded worker pool. `Run` loops until
//! the ready set is empty, `Step` dispatches exactly its head, and
//! `execute_job` is the single-job fast path a TUI front-end drives
//! directly.

use crate::briefing::{write_archive, BriefingAssembler, BriefingError, BriefingOptions};
use crate::emergent::{extract_new_jobs, filename_for, next_numeric_prefix};
use crate::events::{EngineEvent, EventSink, ObserverBridge};
use crate::executor::{ExecutionRequest, ExecutorRegistry, NullWriter, Outcome, OutputWriter};
use crate::llm::{LlmAdapter, LlmRequest};
use crate::worktree::{WorktreeError, WorktreeManager};
use async_trait::async_trait;
use oj_adapters::{MultiplexerAdapter, VcsAdapter};
use oj_core::{Clock, DependencyGraph, GraphError, Job, JobError, JobId, JobStatus, JobType, Plan, PlanError, ReadyPolicy};
use oj_storage::session_registry::SignalProbe;
use oj_storage::{PlanPersister, SessionRegistry, StorageError};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

const ROOT_WORKTREE: &str = "<root>";

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Briefing(#[from] BriefingError),
    #[error(transparent)]
    Worktree(#[from] WorktreeError),
    #[error("failed to archive briefing: {0}")]
    Archive(std::io::Error),
    #[error("no executor registered for job type {0}")]
    NoExecutor(JobType),
    #[error("job {filename} not found in plan")]
    JobNotFound { filename: String },
    #[error("job {filename} failed: {source}")]
    Job { filename: String, #[source] source: JobError },
    #[error("worker task panicked: {0}")]
    Join(String),
}

/// Which jobs a `Run` pass should dispatch out of the current ready set.
#[derive(Debug, Clone)]
pub enum RunFilter {
    /// Dispatch every ready job (bounded by `MaxParallelJobs`).
    AllReady,
    /// Dispatch only the named ready jobs, by filename.
    Filenames(Vec<String>),
    /// Dispatch a single job: the head of the ready set.
    Next,
}

fn select_jobs(ready: &[JobId], plan: &Plan, filter: &RunFilter) -> Vec<JobId> {
    match filter {
        RunFilter::AllReady => ready.to_vec(),
        RunFilter::Next => ready.first().copied().into_iter().collect(),
        RunFilter::Filenames(names) => ready
            .iter()
            .copied()
            .filter(|id| plan.job(*id).map(|j| names.iter().any(|n| n == &j.filename)).unwrap_or(false))
            .collect(),
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub steps: usize,
    pub errors: Vec<OrchestratorError>,
}

/// Tuning knobs for one orchestrator instance (spec.md §4.9, §5).
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub max_parallel_jobs: usize,
    pub max_consecutive_steps: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { max_parallel_jobs: 4, max_consecutive_steps: 1000 }
    }
}

/// Post-processing hook for spec.md §4.9 step f.i: "optionally ask the LLM
/// for a one-sentence summary". Kept as a narrow trait object rather than a
/// generic parameter so `Orchestrator` doesn't need to carry an `LlmAdapter`
/// type parameter purely for this optional step.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Option<String>;
}

pub struct NullSummarizer;

#[async_trait]
impl Summarizer for NullSummarizer {
    async fn summarize(&self, _text: &str) -> Option<String> {
        None
    }
}

/// Summarizes completed-job output through the same LLM capability
/// `oneshot`/`chat` executors call.
pub struct LlmSummarizer<L> {
    llm: L,
}

impl<L: LlmAdapter> LlmSummarizer<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl<L: LlmAdapter> Summarizer for LlmSummarizer<L> {
    async fn summarize(&self, text: &str) -> Option<String> {
        let prompt = format!("Summarize the following in one sentence:\n\n{text}");
        self.llm.complete(LlmRequest { prompt, model: None }).await.ok()
    }
}

/// Guards the "at most one `interactive_agent` per worktree" rule (spec.md
/// §4.9) across one batch of concurrent dispatches.
#[derive(Default)]
struct InteractiveGuard {
    active: Mutex<HashSet<String>>,
}

impl InteractiveGuard {
    fn try_acquire(&self, worktree: &str) -> bool {
        self.active.lock().insert(worktree.to_string())
    }

    fn release(&self, worktree: &str) {
        self.active.lock().remove(worktree);
    }
}

fn format_rfc3339(epoch_ms: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(epoch_ms as i64).unwrap_or_default().to_rfc3339()
}

/// Whole-second duration between two RFC3339 timestamps, rendered as
/// `"<n>s"`. spec.md §6 leaves `duration`'s exact format unspecified
/// (DESIGN.md records this as a resolved Open Question).
fn duration_between(start: &str, end: &str) -> String {
    let parse = |s: &str| chrono::DateTime::parse_from_rfc3339(s).ok();
    match (parse(start), parse(end)) {
        (Some(a), Some(b)) => format!("{}s", (b - a).num_seconds().max(0)),
        _ => "0s".to_string(),
    }
}

/// The Scheduler. Generic over the VCS, multiplexer, and clock adapters it
/// needs directly; job-type dispatch goes through the type-erased
/// `ExecutorRegistry` built by the caller, so this struct stays independent
/// of which `LlmAdapter`/`ProviderAdapter` concrete executors were wired
/// against.
pub struct Orchestrator<V, M, C> {
    plan_dir: PathBuf,
    executors: ExecutorRegistry,
    worktrees: WorktreeManager<V>,
    multiplexer: M,
    session_registry: Arc<SessionRegistry>,
    clock: C,
    events: Arc<dyn EventSink>,
    summarizer: Arc<dyn Summarizer>,
    briefing: BriefingAssembler,
    briefing_opts: BriefingOptions,
    config: OrchestratorConfig,
    interactive_guard: Arc<InteractiveGuard>,
    notifier: Arc<dyn crate::notify::Notifier>,
}

impl<V, M, C> Orchestrator<V, M, C>
where
    V: VcsAdapter,
    M: MultiplexerAdapter,
    C: Clock + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        plan_dir: PathBuf,
        repo_root: PathBuf,
        executors: ExecutorRegistry,
        vcs: V,
        multiplexer: M,
        session_registry: Arc<SessionRegistry>,
        clock: C,
        events: Arc<dyn EventSink>,
        summarizer: Arc<dyn Summarizer>,
        briefing_opts: BriefingOptions,
        config: OrchestratorConfig,
    ) -> Self {
        Self::with_notifier(
            plan_dir,
            repo_root,
            executors,
            vcs,
            multiplexer,
            session_registry,
            clock,
            events,
            summarizer,
            briefing_opts,
            config,
            Arc::new(crate::notify::NullNotifier),
        )
    }

    /// Same as [`Self::new`], plus a [`Notifier`](crate::notify::Notifier)
    /// fired on job completion/failure/needs_review (spec.md §2 desktop
    /// notification hook).
    #[allow(clippy::too_many_arguments)]
    pub fn with_notifier(
        plan_dir: PathBuf,
        repo_root: PathBuf,
        executors: ExecutorRegistry,
        vcs: V,
        multiplexer: M,
        session_registry: Arc<SessionRegistry>,
        clock: C,
        events: Arc<dyn EventSink>,
        summarizer: Arc<dyn Summarizer>,
        briefing_opts: BriefingOptions,
        config: OrchestratorConfig,
        notifier: Arc<dyn crate::notify::Notifier>,
    ) -> Self {
        let worktrees = WorktreeManager::new(vcs, repo_root);
        let briefing = BriefingAssembler::new(plan_dir.clone());
        Self {
            plan_dir,
            executors,
            worktrees,
            multiplexer,
            session_registry,
            clock,
            events,
            summarizer,
            briefing,
            briefing_opts,
            config,
            interactive_guard: Arc::new(InteractiveGuard::default()),
            notifier,
        }
    }

    fn plan_name(&self) -> String {
        self.plan_dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// `Run(ctx, filter)` (spec.md §4.9): loop reconcile → reload → ready-set
    /// → dispatch until the ready set empties, `MaxConsecutiveSteps` is
    /// reached, or `cancel` fires.
    pub async fn run(self: &Arc<Self>, cancel: CancellationToken, filter: RunFilter) -> RunReport {
        self.events.emit(EngineEvent::RunStarted { plan: self.plan_name() });

        let mut steps = 0usize;
        let mut errors: Vec<OrchestratorError> = Vec::new();

        loop {
            if cancel.is_cancelled() {
                break;
            }
            if let Err(err) = self.reconcile().await {
                errors.push(err);
            }

            let mut plan = match oj_storage::load_plan(&self.plan_dir) {
                Ok(plan) => plan,
                Err(err) => {
                    errors.push(err.into());
                    break;
                }
            };
            let resolved = plan.resolve_all_dependencies();
            let graph = match DependencyGraph::build(plan.jobs(), &resolved) {
                Ok(graph) => graph,
                Err(err) => {
                    errors.push(err.into());
                    break;
                }
            };
            let policy = ReadyPolicy { needs_review_satisfies: plan.defaults.needs_review_satisfies_dependency };
            let (ready, _blocked) = graph.ready_set(plan.jobs(), policy);
            let selected = select_jobs(&ready, &plan, &filter);
            if selected.is_empty() {
                break;
            }

            let batch_errors = self.dispatch_batch(Arc::new(plan), &selected, cancel.clone()).await;
            errors.extend(batch_errors);

            steps += 1;
            if steps >= self.config.max_consecutive_steps || cancel.is_cancelled() {
                break;
            }
        }

        let error_summary = errors.first().map(|e| e.to_string());
        self.events.emit(EngineEvent::RunFinished { plan: self.plan_name(), error: error_summary });
        RunReport { steps, errors }
    }

    /// `Step(ctx)`: dispatch exactly the head of the ready set and return.
    pub async fn step(self: &Arc<Self>, cancel: CancellationToken) -> Result<Option<JobId>, OrchestratorError> {
        self.reconcile().await?;
        let mut plan = oj_storage::load_plan(&self.plan_dir)?;
        let resolved = plan.resolve_all_dependencies();
        let graph = DependencyGraph::build(plan.jobs(), &resolved)?;
        let policy = ReadyPolicy { needs_review_satisfies: plan.defaults.needs_review_satisfies_dependency };
        let (ready, _blocked) = graph.ready_set(plan.jobs(), policy);
        let Some(job_id) = ready.into_iter().next() else {
            return Ok(None);
        };
        let job = plan
            .job(job_id)
            .cloned()
            .ok_or_else(|| OrchestratorError::JobNotFound { filename: job_id.to_string() })?;
        self.execute_job(&plan, &job, &NullWriter, cancel).await?;
        Ok(Some(job_id))
    }

    /// `ExecuteJob(ctx, job, writer)`: single-job fast path, e.g. for a TUI
    /// that wants to stream one job's output live.
    pub async fn execute_job_by_filename(
        self: &Arc<Self>,
        filename: &str,
        writer: &dyn OutputWriter,
        cancel: CancellationToken,
    ) -> Result<(), OrchestratorError> {
        let plan = oj_storage::load_plan(&self.plan_dir)?;
        let job = plan
            .job_by_filename(filename)
            .cloned()
            .ok_or_else(|| OrchestratorError::JobNotFound { filename: filename.to_string() })?;
        self.execute_job(&plan, &job, writer, cancel).await
    }

    async fn dispatch_batch(
        self: &Arc<Self>,
        plan: Arc<Plan>,
        selected: &[JobId],
        cancel: CancellationToken,
    ) -> Vec<OrchestratorError> {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.max_parallel_jobs.max(1)));
        let mut set = tokio::task::JoinSet::new();

        for &job_id in selected {
            let Some(job) = plan.job(job_id).cloned() else { continue };

            let interactive_key = (job.job_type == JobType::InteractiveAgent)
                .then(|| job.worktree.clone().unwrap_or_else(|| ROOT_WORKTREE.to_string()));
            if let Some(key) = &interactive_key {
                if !self.interactive_guard.try_acquire(key) {
                    // Another interactive_agent already owns this worktree;
                    // retry on the next Run iteration.
                    continue;
                }
            }

            let this = Arc::clone(self);
            let plan = Arc::clone(&plan);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let result = this.execute_job(&plan, &job, &NullWriter, cancel).await;
                if let Some(key) = &interactive_key {
                    this.interactive_guard.release(key);
                }
                result
            });
        }

        let mut errors = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => errors.push(err),
                Err(join_err) => errors.push(OrchestratorError::Join(join_err.to_string())),
            }
        }
        errors
    }

    /// Steps b–g of the per-job pipeline in spec.md §4.9 (step a, ensure
    /// worktree, happens first here too).
    async fn execute_job(
        &self,
        plan: &Plan,
        job: &Job,
        writer: &dyn OutputWriter,
        cancel: CancellationToken,
    ) -> Result<(), OrchestratorError> {
        let observer = ObserverBridge(Arc::clone(&self.events));
        let persister = PlanPersister::new(self.plan_dir.clone(), &observer);

        let workdir = self.worktrees.ensure(job.worktree.as_deref()).await?;
        let briefing = self.briefing.assemble(job, plan, &self.briefing_opts)?;

        let now = format_rfc3339(self.clock.epoch_ms());
        write_archive(&plan.directory, job.id, &now, &briefing.text).map_err(OrchestratorError::Archive)?;

        let executor = self
            .executors
            .get(job.job_type)
            .cloned()
            .ok_or(OrchestratorError::NoExecutor(job.job_type))?;

        persister.update_status(&job.filename, JobStatus::Running)?;
        let created_at = job.created_at.clone().or_else(|| Some(now.clone()));
        persister.set_timestamps(&job.filename, created_at, Some(now.clone()), None, None)?;

        let req = ExecutionRequest { job, plan, briefing: &briefing, workdir: &workdir, cancel, now: now.clone() };

        match executor.execute(req, writer).await {
            Ok(Outcome::Completed { append_text, needs_review, summary_seed }) => {
                persister.append_output(&job.filename, &append_text)?;

                let finished_at = format_rfc3339(self.clock.epoch_ms());
                let duration = duration_between(&now, &finished_at);
                let status = if needs_review { JobStatus::NeedsReview } else { JobStatus::Completed };
                persister.update_status(&job.filename, status)?;
                persister.set_timestamps(&job.filename, None, None, Some(finished_at), Some(duration))?;
                self.notify_job(job, status).await;

                if let Some(seed) = summary_seed {
                    if let Some(summary) = self.summarizer.summarize(&seed).await {
                        persister.set_summary(&job.filename, summary)?;
                    }
                }

                if job.job_type == JobType::Oneshot && job.generate_plan_from {
                    self.expand_emergent_plan(plan, job, &append_text, &persister)?;
                }
                Ok(())
            }
            Ok(Outcome::NoOp) => {
                // `chat`'s already-satisfied case: nothing was dispatched, so
                // the optimistic `Running` write above must not stick — a
                // `NoOp` job is already done, not in flight.
                let finished_at = format_rfc3339(self.clock.epoch_ms());
                let duration = duration_between(&now, &finished_at);
                persister.update_status(&job.filename, JobStatus::Completed)?;
                persister.set_timestamps(&job.filename, None, None, Some(finished_at), Some(duration))?;
                Ok(())
            }
            Ok(Outcome::Running { .. }) => {
                // `interactive_agent` already registered its own Session;
                // the job stays `running` until a later `reconcile` pass
                // observes the window closing.
                Ok(())
            }
            Err(err) => {
                let status = err.resulting_status();
                persister.update_status(&job.filename, status)?;
                self.notify_job(job, status).await;
                Err(OrchestratorError::Job { filename: job.filename.clone(), source: err })
            }
        }
    }

    /// Fire the desktop notification hook (spec.md §2) for a job that just
    /// reached a terminal-for-now status. Best-effort: a notifier failure
    /// is logged by the bridge and never surfaces as a job error.
    async fn notify_job(&self, job: &Job, status: JobStatus) {
        let title = match status {
            JobStatus::Completed => "Job completed",
            JobStatus::NeedsReview => "Job needs review",
            JobStatus::Failed => "Job failed",
            JobStatus::Interrupted => "Job interrupted",
            _ => return,
        };
        self.notifier.notify(title, &job.filename).await;
    }

    /// spec.md §4.9 step f.ii: split a completed oneshot's output into new
    /// sibling job files, numbered from the plan's current max prefix + 1.
    fn expand_emergent_plan(
        &self,
        plan: &Plan,
        job: &Job,
        output: &str,
        persister: &PlanPersister<'_>,
    ) -> Result<(), OrchestratorError> {
        let start_prefix = next_numeric_prefix(plan.jobs().iter().map(|j| j.filename.as_str()));
        let source_filename = job.filename.clone();
        let new_jobs = extract_new_jobs(output, |i| filename_for(start_prefix + i, &source_filename, i));
        for new_job in new_jobs {
            let contents = oj_storage::frontmatter::serialize(&new_job);
            persister.append_job(&new_job.filename, &contents)?;
        }
        Ok(())
    }

    /// Reconcile the Session Registry (spec.md §4.7, §4.9 step 1): drop
    /// pid-dead sessions and flip their jobs to `interrupted`, then sweep
    /// multiplexer-backed (`interactive_agent`) sessions separately — their
    /// `Session::pid` is a sentinel `0` (tmux exposes no pid for a pane), so
    /// the generic pid probe can't see them.
    async fn reconcile(&self) -> Result<(), OrchestratorError> {
        let observer = ObserverBridge(Arc::clone(&self.events));
        let persister = PlanPersister::new(self.plan_dir.clone(), &observer);

        let report = self.session_registry.reconcile(&SignalProbe)?;
        if !report.interrupted.is_empty() {
            let plan = oj_storage::load_plan(&self.plan_dir)?;
            for job_id in report.interrupted {
                if let Some(job) = plan.job(job_id) {
                    persister.update_status(&job.filename, JobStatus::Interrupted)?;
                }
            }
        }

        let sessions = self.session_registry.all()?;
        let multiplexed: Vec<_> = sessions.into_iter().filter(|s| s.native_session_id.is_some()).collect();
        if multiplexed.is_empty() {
            return Ok(());
        }

        let plan = oj_storage::load_plan(&self.plan_dir)?;
        for session in multiplexed {
            let native_id = session.native_session_id.as_deref().unwrap_or_default();
            if self.multiplexer.is_alive(native_id).await.unwrap_or(false) {
                continue;
            }
            let exit_code = self.multiplexer.get_exit_code(native_id).await.ok().flatten();
            self.session_registry.remove(&session.job_id)?;
            if let Some(job) = plan.job(session.job_id) {
                let status = match exit_code {
                    Some(0) => JobStatus::Completed,
                    Some(_) => JobStatus::Failed,
                    None => JobStatus::Interrupted,
                };
                persister.update_status(&job.filename, status)?;
                let now = format_rfc3339(self.clock.epoch_ms());
                persister.set_timestamps(&job.filename, None, None, Some(now), None)?;
                self.notify_job(job, status).await;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
