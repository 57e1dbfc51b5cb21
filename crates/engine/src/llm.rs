// SPDX-License-Identifier: MIT

//! The "LLM capability" §4.8 `oneshot` and `chat` call directly, with no
//! external process involved (unlike `headless_agent`/`interactive_agent`,
//! which spawn a provider CLI through [`oj_adapters::ProviderAdapter`]).
//! Concrete SDKs are out of scope (spec.md §1); this is the narrow seam a
//! real one plugs into.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("refused: {0}")]
    Refusal(String),
}

/// One request to the LLM capability: a fully-assembled prompt and an
/// optional model selector (`job.model`, falling back to plan defaults).
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    pub model: Option<String>,
}

#[async_trait]
pub trait LlmAdapter: Clone + Send + Sync + 'static {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{LlmAdapter, LlmError, LlmRequest};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Scripted LLM double: returns `reply` for every call unless `refuse`
    /// is set, and records every request it received.
    #[derive(Clone, Default)]
    pub struct FakeLlmAdapter {
        inner: Arc<Mutex<FakeState>>,
    }

    #[derive(Default)]
    struct FakeState {
        reply: String,
        refuse: Option<String>,
        requests: Vec<LlmRequest>,
    }

    impl FakeLlmAdapter {
        pub fn new(reply: impl Into<String>) -> Self {
            Self { inner: Arc::new(Mutex::new(FakeState { reply: reply.into(), ..Default::default() })) }
        }

        /// Echo the prompt back verbatim — used by the linear-dependency
        /// and briefing-determinism scenarios.
        pub fn echo() -> Self {
            Self::new(String::new())
        }

        pub fn refusing(reason: impl Into<String>) -> Self {
            let adapter = Self::default();
            adapter.inner.lock().refuse = Some(reason.into());
            adapter
        }

        pub fn requests(&self) -> Vec<LlmRequest> {
            self.inner.lock().requests.clone()
        }
    }

    #[async_trait]
    impl LlmAdapter for FakeLlmAdapter {
        async fn complete(&self, request: LlmRequest) -> Result<String, LlmError> {
            let mut state = self.inner.lock();
            state.requests.push(request.clone());
            if let Some(reason) = state.refuse.clone() {
                return Err(LlmError::Refusal(reason));
            }
            if state.reply.is_empty() {
                Ok(request.prompt)
            } else {
                Ok(state.reply.clone())
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLlmAdapter;

#[cfg(test)]
#[path = "llm_tests.rs"]
mod tests;
