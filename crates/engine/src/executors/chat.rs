// SPDX-License-Identifier: MIT

//! `chat` executor (spec.md §4.8): treats the job file as an append-only
//! conversation. If the last turn is from the user, one LLM reply is
//! requested and appended as an `llm` turn with a provenance directive; if
//! the last turn is already from the llm, the job is satisfied — a no-op,
//! not an error.

use crate::executor::{ExecutionRequest, Executor, Outcome, OutputWriter};
use crate::llm::{LlmAdapter, LlmRequest};
use async_trait::async_trait;
use oj_core::chat::{parse_turns, render_turn, ChatTurn, Speaker, TurnDirective};
use oj_core::JobError;

#[derive(Clone)]
pub struct ChatExecutor<L> {
    llm: L,
}

impl<L: LlmAdapter> ChatExecutor<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl<L: LlmAdapter> Executor for ChatExecutor<L> {
    async fn execute(&self, req: ExecutionRequest<'_>, _writer: &dyn OutputWriter) -> Result<Outcome, JobError> {
        let turns = parse_turns(&req.job.body);
        match turns.last() {
            Some(turn) if turn.speaker == Speaker::Llm => Ok(Outcome::NoOp),
            _ => {
                let request = LlmRequest { prompt: req.briefing.text.clone(), model: req.job.model.clone() };
                let reply = self.llm.complete(request).await.map_err(super::oneshot::map_llm_error)?;
                let turn = ChatTurn {
                    speaker: Speaker::Llm,
                    content: reply.clone(),
                    directive: Some(TurnDirective { template: req.job.template.clone(), frozen: false }),
                };
                let rendered = format!("\n\n{}\n", render_turn(&turn));
                Ok(Outcome::Completed { append_text: rendered, needs_review: false, summary_seed: Some(reply) })
            }
        }
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
