// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-shell: the process spawn/wait/kill primitives shared by the `shell`
//! job-type executor and the agent provider adapters (spec.md §4.8
//! `shell`, §4.9 cancellation). This crate deliberately does not implement
//! a shell grammar of its own — a `shell` job hands its command string
//! straight to the user's `$SHELL` (or `/bin/sh`), matching spec.md §4.1's
//! "execute a command string in the worktree via the OS process adapter".

pub mod process;

pub use process::{run_command, terminate, CommandOutcome, ShellError};
