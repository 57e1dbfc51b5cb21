// SPDX-License-Identifier: MIT

//! Placeholder `LlmAdapter` the daemon registers `oneshot`/`chat` against
//! until a concrete provider SDK is wired in (spec.md §1 non-goal: "concrete
//! LLM provider SDKs"). Every call fails with a clear, actionable error
//! rather than silently no-op'ing.

use async_trait::async_trait;
use oj_engine::llm::{LlmAdapter, LlmError, LlmRequest};

#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredLlmAdapter;

#[async_trait]
impl LlmAdapter for UnconfiguredLlmAdapter {
    async fn complete(&self, _request: LlmRequest) -> Result<String, LlmError> {
        Err(LlmError::Transport(
            "no LLM provider configured for this daemon; oneshot/chat jobs cannot run".to_string(),
        ))
    }
}
