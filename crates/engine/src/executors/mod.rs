// SPDX-License-Identifier: MIT

//! One module per job type (spec.md §4.8), each implementing
//! [`crate::executor::Executor`] against the narrow adapter trait it needs.

pub mod chat;
pub mod headless_agent;
pub mod interactive_agent;
pub mod oneshot;
pub mod shell;

pub use chat::ChatExecutor;
pub use headless_agent::HeadlessAgentExecutor;
pub use interactive_agent::InteractiveAgentExecutor;
pub use oneshot::OneshotExecutor;
pub use shell::ShellExecutor;
