// SPDX-License-Identifier: MIT

//! `headless_agent` executor (spec.md §4.8): spawns the provider CLI as a
//! child process in the job's worktree, streams its output to the
//! `writer`, and waits for it to go quiescent.
//!
//! Registers a `Session` as soon as the child's pid is known (spec.md §3:
//! "created when an agent executor starts a process") so a daemon crash
//! mid-run leaves a record `reconcile()` can find on restart (P6) instead
//! of an orphaned `running` job with no session at all. The session is
//! removed again once this call returns, since unlike `interactive_agent`
//! this executor blocks on the whole run rather than handing off to a
//! later reconcile tick.

use crate::executor::{default_transcript_path, output_section, ExecutionRequest, Executor, Outcome, OutputWriter};
use async_trait::async_trait;
use oj_adapters::{ProviderAdapter, ProviderSpawnConfig};
use oj_core::{JobError, Session, SessionStatus};
use oj_storage::SessionRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Default quiescence window (spec.md §4.8 "no output for a
/// provider-specified grace window"); concrete providers may override via
/// `with_quiescence_window`.
const DEFAULT_QUIESCENCE_WINDOW: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct HeadlessAgentExecutor<P> {
    provider: P,
    command: String,
    quiescence_window: Duration,
    registry: Arc<SessionRegistry>,
}

impl<P: ProviderAdapter> HeadlessAgentExecutor<P> {
    pub fn new(provider: P, command: impl Into<String>, registry: Arc<SessionRegistry>) -> Self {
        Self { provider, command: command.into(), quiescence_window: DEFAULT_QUIESCENCE_WINDOW, registry }
    }

    pub fn with_quiescence_window(mut self, window: Duration) -> Self {
        self.quiescence_window = window;
        self
    }
}

#[async_trait]
impl<P: ProviderAdapter> Executor for HeadlessAgentExecutor<P> {
    async fn execute(&self, req: ExecutionRequest<'_>, writer: &dyn OutputWriter) -> Result<Outcome, JobError> {
        let config = ProviderSpawnConfig {
            command: self.command.clone(),
            args: vec![req.briefing.text.clone()],
            cwd: req.workdir.to_path_buf(),
            env: req.job.model.as_ref().map(|m| vec![("OJ_MODEL".to_string(), m.clone())]).unwrap_or_default(),
            quiescence_window: self.quiescence_window,
        };

        let (tx, mut rx) = mpsc::channel(256);
        let (pid_tx, pid_rx) = oneshot::channel();
        let mut transcript = String::new();
        let drain = async {
            while let Some(line) = rx.recv().await {
                writer.write_line(&line.line);
                if !transcript.is_empty() {
                    transcript.push('\n');
                }
                transcript.push_str(&line.line);
            }
            transcript
        };

        let register = async {
            if let Ok(Some(pid)) = pid_rx.await {
                let session = Session {
                    job_id: req.job.id,
                    provider: self.command.clone(),
                    pid,
                    native_session_id: None,
                    transcript_path: default_transcript_path(req.job, req.plan),
                    status: SessionStatus::Alive,
                    started_at: req.now.clone(),
                };
                // Registration failures (e.g. a stale record from a
                // previous crash) must not abort the run already underway.
                if let Err(err) = self.registry.register(session) {
                    tracing::warn!(job_id = %req.job.id, error = %err, "failed to register headless agent session");
                }
            }
        };

        let (outcome, transcript, ()) =
            tokio::join!(self.provider.run_to_quiescence(config, tx, pid_tx), drain, register);
        let _ = self.registry.remove(&req.job.id);
        let outcome = outcome.map_err(|e| JobError::ProviderTransport(e.to_string()))?;

        match outcome.exit_code {
            Some(code) if code != 0 => Err(JobError::ChildExitNonZero { code }),
            _ => Ok(Outcome::Completed {
                append_text: output_section(&transcript),
                needs_review: false,
                summary_seed: Some(transcript),
            }),
        }
    }
}

#[cfg(test)]
#[path = "headless_agent_tests.rs"]
mod tests;
