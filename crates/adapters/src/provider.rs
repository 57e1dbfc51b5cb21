// SPDX-License-Identifier: MIT

//! Agent provider CLI adapter (spec.md §4.9 J, §4.1 `headless_agent`).
//!
//! The `headless_agent` executor spawns the provider CLI (e.g. `claude`) as
//! a child process in the job's worktree, streams its combined
//! stdout/stderr, and waits for it to go quiescent: no output for a grace
//! window and the process itself has exited or reports idle.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("wait failed: {0}")]
    WaitFailed(String),
    #[error("kill failed: {0}")]
    KillFailed(String),
}

/// One line of provider output, tagged by stream, handed to the executor's
/// writer (TUI + `.log` file) as it arrives.
#[derive(Debug, Clone)]
pub struct ProviderOutputLine {
    pub stream: OutputStream,
    pub line: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Parameters for spawning a provider CLI invocation.
#[derive(Debug, Clone)]
pub struct ProviderSpawnConfig {
    pub command: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
    /// How long to wait with no output before considering the process idle.
    pub quiescence_window: Duration,
}

/// Outcome of running a provider process to completion.
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    pub exit_code: Option<i32>,
    pub native_session_id: Option<String>,
}

/// Adapter for spawning and driving a provider CLI to quiescence.
#[async_trait]
pub trait ProviderAdapter: Clone + Send + Sync + 'static {
    /// Spawn the provider, stream its output on `output_tx` as it arrives,
    /// and return once the process exits or goes idle per
    /// `quiescence_window`. The child's OS pid is sent on `pid_tx` as soon
    /// as it is known (before this future resolves) so the caller can
    /// register a `Session` for the running process rather than only
    /// after it has already finished.
    async fn run_to_quiescence(
        &self,
        config: ProviderSpawnConfig,
        output_tx: mpsc::Sender<ProviderOutputLine>,
        pid_tx: oneshot::Sender<Option<u32>>,
    ) -> Result<ProviderOutcome, ProviderError>;
}

/// Provider adapter backed by a real child process.
#[derive(Clone, Copy, Default)]
pub struct SubprocessProviderAdapter;

impl SubprocessProviderAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProviderAdapter for SubprocessProviderAdapter {
    async fn run_to_quiescence(
        &self,
        config: ProviderSpawnConfig,
        output_tx: mpsc::Sender<ProviderOutputLine>,
        pid_tx: oneshot::Sender<Option<u32>>,
    ) -> Result<ProviderOutcome, ProviderError> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .current_dir(&config.cwd)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        let mut child: Child = cmd.spawn().map_err(|e| ProviderError::SpawnFailed(e.to_string()))?;
        let _ = pid_tx.send(child.id());

        let stdout = child.stdout.take().ok_or_else(|| ProviderError::SpawnFailed("no stdout pipe".into()))?;
        let stderr = child.stderr.take().ok_or_else(|| ProviderError::SpawnFailed("no stderr pipe".into()))?;

        let (activity_tx, mut activity_rx) = mpsc::channel::<()>(64);

        let out_tx = output_tx.clone();
        let out_activity = activity_tx.clone();
        let stdout_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = out_activity.send(()).await;
                let _ = out_tx.send(ProviderOutputLine { stream: OutputStream::Stdout, line }).await;
            }
        });

        let err_tx = output_tx.clone();
        let err_activity = activity_tx.clone();
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = err_activity.send(()).await;
                let _ = err_tx.send(ProviderOutputLine { stream: OutputStream::Stderr, line }).await;
            }
        });
        drop(activity_tx);

        let wait_result = loop {
            tokio::select! {
                status = child.wait() => {
                    break status.map_err(|e| ProviderError::WaitFailed(e.to_string()));
                }
                activity = tokio::time::timeout(config.quiescence_window, activity_rx.recv()) => {
                    match activity {
                        Ok(Some(())) => continue,
                        Ok(None) => continue,
                        Err(_elapsed) => {
                            tracing::info!("provider process quiescent, sending SIGTERM");
                            break terminate(&mut child).await;
                        }
                    }
                }
            }
        };

        let _ = stdout_task.await;
        let _ = stderr_task.await;

        let status = wait_result?;
        Ok(ProviderOutcome { exit_code: status.code(), native_session_id: None })
    }
}

async fn terminate(child: &mut Child) -> Result<std::process::ExitStatus, ProviderError> {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        if tokio::time::timeout(Duration::from_secs(10), child.wait()).await.is_ok() {
            return child.wait().await.map_err(|e| ProviderError::KillFailed(e.to_string()));
        }
        let _ = child.kill().await;
    }
    #[cfg(not(unix))]
    {
        let _ = child.kill().await;
    }
    child.wait().await.map_err(|e| ProviderError::KillFailed(e.to_string()))
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{ProviderAdapter, ProviderError, ProviderOutcome, ProviderOutputLine, ProviderSpawnConfig};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::sync::{mpsc, oneshot};

    /// In-memory provider double: returns a fixed `outcome` and replays
    /// pre-scripted `lines` before returning. Reports `fake_pid` on the
    /// pid channel, matching the real adapter's "pid known before exit"
    /// contract so callers that register a `Session` on it can be tested
    /// without a real child process.
    #[derive(Clone)]
    pub struct FakeProviderAdapter {
        inner: Arc<Mutex<FakeState>>,
    }

    struct FakeState {
        lines: Vec<ProviderOutputLine>,
        outcome: ProviderOutcome,
        calls: Vec<ProviderSpawnConfig>,
        fake_pid: Option<u32>,
    }

    impl FakeProviderAdapter {
        pub fn new(lines: Vec<ProviderOutputLine>, outcome: ProviderOutcome) -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeState {
                    lines,
                    outcome,
                    calls: Vec::new(),
                    fake_pid: Some(4242),
                })),
            }
        }

        pub fn with_pid(self, pid: Option<u32>) -> Self {
            self.inner.lock().fake_pid = pid;
            self
        }

        pub fn calls(&self) -> Vec<ProviderSpawnConfig> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl ProviderAdapter for FakeProviderAdapter {
        async fn run_to_quiescence(
            &self,
            config: ProviderSpawnConfig,
            output_tx: mpsc::Sender<ProviderOutputLine>,
            pid_tx: oneshot::Sender<Option<u32>>,
        ) -> Result<ProviderOutcome, ProviderError> {
            let (lines, outcome, fake_pid) = {
                let mut state = self.inner.lock();
                state.calls.push(config);
                (state.lines.clone(), state.outcome.clone(), state.fake_pid)
            };
            let _ = pid_tx.send(fake_pid);
            for line in lines {
                let _ = output_tx.send(line).await;
            }
            Ok(outcome)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProviderAdapter;

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
