// SPDX-License-Identifier: MIT

//! `interactive_agent` executor (spec.md §4.8): spawns the provider CLI
//! attached to a new terminal-multiplexer window, registers a `Session`,
//! and returns immediately with status `running` — it never blocks on the
//! window closing. The orchestrator's reconcile loop (spec.md §4.7) flips
//! the job to its terminal status once the session registry reports the
//! window gone.

use crate::executor::{default_transcript_path, ExecutionRequest, Executor, Outcome, OutputWriter};
use async_trait::async_trait;
use oj_adapters::MultiplexerAdapter;
use oj_core::{JobError, Session, SessionStatus};
use oj_storage::SessionRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct InteractiveAgentExecutor<M> {
    multiplexer: M,
    command: String,
    registry: Arc<SessionRegistry>,
}

impl<M: MultiplexerAdapter> InteractiveAgentExecutor<M> {
    pub fn new(multiplexer: M, command: impl Into<String>, registry: Arc<SessionRegistry>) -> Self {
        Self { multiplexer, command: command.into(), registry }
    }
}

#[async_trait]
impl<M: MultiplexerAdapter> Executor for InteractiveAgentExecutor<M> {
    async fn execute(&self, req: ExecutionRequest<'_>, _writer: &dyn OutputWriter) -> Result<Outcome, JobError> {
        let window_name = req.job.id.to_string();
        let env = req.job.model.as_ref().map(|m| vec![("OJ_MODEL".to_string(), m.clone())]).unwrap_or_default();

        let native_session_id = self
            .multiplexer
            .spawn(&window_name, req.workdir, &self.command, &env)
            .await
            .map_err(|e| JobError::ProviderTransport(e.to_string()))?;

        let session = Session {
            job_id: req.job.id,
            provider: self.command.clone(),
            pid: 0,
            native_session_id: Some(native_session_id),
            transcript_path: default_transcript_path(req.job, req.plan),
            status: SessionStatus::Alive,
            started_at: req.now.clone(),
        };
        self.registry.register(session.clone()).map_err(|e| JobError::ProviderTransport(e.to_string()))?;

        Ok(Outcome::Running { session })
    }
}

#[cfg(test)]
#[path = "interactive_agent_tests.rs"]
mod tests;
