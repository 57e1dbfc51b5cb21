// SPDX-License-Identifier: MIT

//! `oneshot` executor (spec.md §4.8): a single call to the LLM capability,
//! no external process involved. Its response becomes the job's `##
//! Output` section and, when `generate_plan_from` is set, seeds emergent
//! plan expansion (handled by the orchestrator, not here).

use crate::executor::{output_section, ExecutionRequest, Executor, Outcome, OutputWriter};
use crate::llm::{LlmAdapter, LlmRequest};
use async_trait::async_trait;
use oj_core::JobError;

#[derive(Clone)]
pub struct OneshotExecutor<L> {
    llm: L,
}

impl<L: LlmAdapter> OneshotExecutor<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl<L: LlmAdapter> Executor for OneshotExecutor<L> {
    async fn execute(&self, req: ExecutionRequest<'_>, _writer: &dyn OutputWriter) -> Result<Outcome, JobError> {
        let request = LlmRequest { prompt: req.briefing.text.clone(), model: req.job.model.clone() };
        let reply = self.llm.complete(request).await.map_err(map_llm_error)?;
        Ok(Outcome::Completed {
            append_text: output_section(&reply),
            needs_review: false,
            summary_seed: Some(reply),
        })
    }
}

pub(crate) fn map_llm_error(err: crate::llm::LlmError) -> JobError {
    match err {
        crate::llm::LlmError::Transport(msg) => JobError::ProviderTransport(msg),
        crate::llm::LlmError::Refusal(msg) => JobError::ProviderRefusal(msg),
    }
}

#[cfg(test)]
#[path = "oneshot_tests.rs"]
mod tests;
