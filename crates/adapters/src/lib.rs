// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-adapters: the narrow adapter interfaces spec.md §4.9/§9 requires
//! between the core and external tooling — a terminal multiplexer, the
//! VCS worktree plumbing, a desktop notifier, and the agent provider CLI
//! itself. Each trait ships a production impl (shelling out) and an
//! in-memory fake so `oj-engine`/`oj-daemon` tests never touch a real
//! process, tmux server, or git repository.

pub mod multiplexer;
pub mod notify;
pub mod provider;
pub mod subprocess;
pub mod vcs;

pub use multiplexer::{MultiplexerAdapter, MultiplexerError, TmuxAdapter};
pub use notify::{DesktopNotifyAdapter, NotifyAdapter, NotifyError};
pub use provider::{
    OutputStream, ProviderAdapter, ProviderError, ProviderOutcome, ProviderOutputLine,
    ProviderSpawnConfig, SubprocessProviderAdapter,
};
pub use vcs::{GitVcsAdapter, VcsAdapter, VcsError, WorktreeEntry};

#[cfg(any(test, feature = "test-support"))]
pub use multiplexer::FakeMultiplexerAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use provider::FakeProviderAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use vcs::FakeVcsAdapter;
