// SPDX-License-Identifier: MIT

//! Run a raw command string as the `shell` job type (spec.md §4.8):
//! one invocation of `$SHELL -c <command>` (falling back to `/bin/sh`) in
//! the job's worktree, with output captured and cancellation escalating
//! from SIGTERM to SIGKILL after a grace window (spec.md §5).

use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

/// Grace window between SIGTERM and SIGKILL for a canceled child process.
pub const KILL_GRACE_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("spawn failed: {0}")]
    SpawnFailed(std::io::Error),
    #[error("wait failed: {0}")]
    WaitFailed(std::io::Error),
}

/// Outcome of a completed shell command: spec.md §4.8 `shell` —
/// exit code zero is `completed`, non-zero is `failed` with the code
/// recorded (`ErrChildExitNonZero`).
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

fn shell_binary() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}

/// Run `command` to completion in `cwd`, capturing stdout/stderr.
///
/// Cancellation of `cancel` sends SIGTERM, waits [`KILL_GRACE_WINDOW`], then
/// sends SIGKILL if the child is still alive — matching the escalation
/// every long-running child in this system (shell, headless agent) honors.
pub async fn run_command(
    command: &str,
    cwd: &Path,
    env: &[(String, String)],
    cancel: tokio_util::sync::CancellationToken,
) -> Result<CommandOutcome, ShellError> {
    let mut cmd = Command::new(shell_binary());
    cmd.arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in env {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn().map_err(ShellError::SpawnFailed)?;
    let mut stdout_pipe = child.stdout.take().expect("piped stdout");
    let mut stderr_pipe = child.stderr.take().expect("piped stderr");

    // Drain the pipes on their own tasks so the `select!` below only needs
    // one mutable borrow of `child` (for `wait()`/`terminate()`), not two.
    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stdout_pipe.read_to_end(&mut buf).await;
        buf
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stderr_pipe.read_to_end(&mut buf).await;
        buf
    });

    tokio::select! {
        status = child.wait() => {
            let status = status.map_err(ShellError::WaitFailed)?;
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            Ok(CommandOutcome { exit_code: status.code().unwrap_or(-1), stdout, stderr })
        }
        () = cancel.cancelled() => {
            tracing::info!(%command, "shell command canceled, sending SIGTERM");
            if let Err(err) = terminate(&mut child).await {
                tracing::warn!(%command, %err, "failed to terminate canceled shell command");
            }
            stdout_task.abort();
            stderr_task.abort();
            Err(ShellError::WaitFailed(std::io::Error::other("canceled")))
        }
    }
}

/// Escalate SIGTERM, then SIGKILL after [`KILL_GRACE_WINDOW`], against an
/// already-running child. Used by executors that need to interrupt a child
/// they're still holding a handle to (rather than racing it via `select!`
/// as [`run_command`] does).
pub async fn terminate(child: &mut Child) -> Result<std::process::ExitStatus, ShellError> {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        if let Ok(status) = tokio::time::timeout(KILL_GRACE_WINDOW, child.wait()).await {
            return status.map_err(ShellError::WaitFailed);
        }
        let _ = child.kill().await;
    }
    #[cfg(not(unix))]
    {
        let _ = child.kill().await;
    }
    child.wait().await.map_err(ShellError::WaitFailed)
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
