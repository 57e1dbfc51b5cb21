// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-daemon: the long-running host process (binary name `ojd`) that wires
//! `oj-engine`'s orchestrator against real adapters, reconciles session
//! state on startup, and serves `oj-wire` requests over a Unix socket
//! (spec.md §4.7, §4.9, §6).

pub mod llm;
pub mod service;
pub mod socket;
pub mod state;

pub use service::handle_request;
pub use state::{DaemonOrchestrator, DaemonState};
