// SPDX-License-Identifier: MIT

//! Subprocess execution helpers shared by the tmux, git, and provider
//! adapters: every adapter that shells out does so through
//! [`run_with_timeout`] so a hung child process can never wedge the
//! orchestrator.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Timeout for tmux control commands (spawn/send/kill/capture).
pub const TMUX_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for `git worktree` operations.
pub const GIT_WORKTREE_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for `shell` job type command execution.
pub const SHELL_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Run `cmd`, killing it if it doesn't finish within `timeout`.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{description} failed: {io_err}")),
        Err(_elapsed) => Err(format!("{description} timed out after {}s", timeout.as_secs())),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
