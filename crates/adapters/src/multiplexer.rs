// SPDX-License-Identifier: MIT

//! Terminal multiplexer adapter (spec.md §4.9 J, §4.1 `interactive_agent`).
//!
//! The `interactive_agent` executor spawns the provider CLI attached to a
//! new window so a human can watch or intervene, then registers a
//! [`oj_core::Session`] and returns immediately — it never blocks on the
//! window closing. The orchestrator's reconcile loop polls
//! [`MultiplexerAdapter::is_alive`] / `get_exit_code` through the session
//! registry to notice when the window closes.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

use crate::subprocess::{run_with_timeout, TMUX_TIMEOUT};

#[derive(Debug, Error)]
pub enum MultiplexerError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Adapter for the terminal multiplexer window an `interactive_agent` job
/// runs inside. Implementations must be cheap to clone (the orchestrator
/// shares one instance across all workers).
#[async_trait]
pub trait MultiplexerAdapter: Clone + Send + Sync + 'static {
    /// Create a new window running `cmd` in `cwd`, returning its session id.
    async fn spawn(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<String, MultiplexerError>;

    /// Send a key sequence (tmux key-name syntax) to the window.
    async fn send_keys(&self, id: &str, keys: &str) -> Result<(), MultiplexerError>;

    /// Send literal text, bypassing key-name interpretation.
    async fn send_literal(&self, id: &str, text: &str) -> Result<(), MultiplexerError>;

    /// Press Enter in the window.
    async fn send_enter(&self, id: &str) -> Result<(), MultiplexerError>;

    /// Destroy the window, if it still exists.
    async fn kill(&self, id: &str) -> Result<(), MultiplexerError>;

    /// Whether the window still exists.
    async fn is_alive(&self, id: &str) -> Result<bool, MultiplexerError>;

    /// Capture the last `lines` of scrollback.
    async fn capture_output(&self, id: &str, lines: u32) -> Result<String, MultiplexerError>;

    /// Exit code of the pane's process, if it has exited.
    async fn get_exit_code(&self, id: &str) -> Result<Option<i32>, MultiplexerError>;
}

/// tmux-backed multiplexer adapter. Sessions are named `oj-<name>` so they
/// can be told apart from sessions other tools create in the same tmux
/// server.
#[derive(Clone, Copy, Default)]
pub struct TmuxAdapter;

impl TmuxAdapter {
    pub fn new() -> Self {
        Self
    }

    fn session_name(name: &str) -> String {
        format!("oj-{name}")
    }
}

#[async_trait]
impl MultiplexerAdapter for TmuxAdapter {
    async fn spawn(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<String, MultiplexerError> {
        if !cwd.exists() {
            return Err(MultiplexerError::SpawnFailed(format!(
                "working directory does not exist: {}",
                cwd.display()
            )));
        }

        let id = Self::session_name(name);

        let existing = Command::new("tmux").args(["has-session", "-t", &id]).output().await;
        if existing.map(|o| o.status.success()).unwrap_or(false) {
            tracing::warn!(session = %id, "multiplexer session already exists, killing first");
            let _ = Command::new("tmux").args(["kill-session", "-t", &id]).output().await;
        }

        let mut tmux_cmd = Command::new("tmux");
        tmux_cmd.arg("new-session").arg("-d").arg("-s").arg(&id).arg("-c").arg(cwd);
        for (key, value) in env {
            tmux_cmd.arg("-e").arg(format!("{key}={value}"));
        }
        tmux_cmd.arg(cmd);

        let output = run_with_timeout(tmux_cmd, TMUX_TIMEOUT, "tmux new-session")
            .await
            .map_err(MultiplexerError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MultiplexerError::SpawnFailed(stderr.to_string()));
        }

        Ok(id)
    }

    async fn send_keys(&self, id: &str, keys: &str) -> Result<(), MultiplexerError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["send-keys", "-t", id, keys]);
        let output =
            run_with_timeout(cmd, TMUX_TIMEOUT, "tmux send-keys").await.map_err(MultiplexerError::CommandFailed)?;
        if !output.status.success() {
            return Err(MultiplexerError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn send_literal(&self, id: &str, text: &str) -> Result<(), MultiplexerError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["send-keys", "-t", id, "-l", "--", text]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux send-keys -l")
            .await
            .map_err(MultiplexerError::CommandFailed)?;
        if !output.status.success() {
            return Err(MultiplexerError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn send_enter(&self, id: &str) -> Result<(), MultiplexerError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["send-keys", "-t", id, "Enter"]);
        let output =
            run_with_timeout(cmd, TMUX_TIMEOUT, "tmux send-keys Enter").await.map_err(MultiplexerError::CommandFailed)?;
        if !output.status.success() {
            return Err(MultiplexerError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn kill(&self, id: &str) -> Result<(), MultiplexerError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["kill-session", "-t", id]);
        // Killing an already-dead session is not an error.
        let _ = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux kill-session").await;
        Ok(())
    }

    async fn is_alive(&self, id: &str) -> Result<bool, MultiplexerError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["has-session", "-t", id]);
        let output =
            run_with_timeout(cmd, TMUX_TIMEOUT, "tmux has-session").await.map_err(MultiplexerError::CommandFailed)?;
        Ok(output.status.success())
    }

    async fn capture_output(&self, id: &str, lines: u32) -> Result<String, MultiplexerError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["capture-pane", "-t", id, "-p", "-S", &format!("-{lines}")]);
        let output =
            run_with_timeout(cmd, TMUX_TIMEOUT, "tmux capture-pane").await.map_err(MultiplexerError::CommandFailed)?;
        if !output.status.success() {
            return Err(MultiplexerError::NotFound(id.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn get_exit_code(&self, id: &str) -> Result<Option<i32>, MultiplexerError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["display-message", "-t", id, "-p", "#{pane_dead_status}"]);
        let output =
            run_with_timeout(cmd, TMUX_TIMEOUT, "tmux display-message").await.map_err(MultiplexerError::CommandFailed)?;
        if !output.status.success() {
            return Err(MultiplexerError::NotFound(id.to_string()));
        }
        let status_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(status_str.parse::<i32>().ok())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{MultiplexerAdapter, MultiplexerError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    struct FakeSession {
        alive: bool,
        exit_code: Option<i32>,
        output: String,
    }

    /// In-memory double for [`MultiplexerAdapter`]; every spawned window
    /// starts alive with no output until the test flips it with
    /// [`FakeMultiplexerAdapter::finish`].
    #[derive(Clone, Default)]
    pub struct FakeMultiplexerAdapter {
        sessions: Arc<Mutex<BTreeMap<String, FakeSession>>>,
    }

    impl FakeMultiplexerAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Mark a window as exited with the given code, as if its process finished.
        pub fn finish(&self, id: &str, exit_code: i32) {
            if let Some(session) = self.sessions.lock().get_mut(id) {
                session.alive = false;
                session.exit_code = Some(exit_code);
            }
        }

        pub fn is_registered(&self, id: &str) -> bool {
            self.sessions.lock().contains_key(id)
        }
    }

    #[async_trait]
    impl MultiplexerAdapter for FakeMultiplexerAdapter {
        async fn spawn(
            &self,
            name: &str,
            _cwd: &Path,
            _cmd: &str,
            _env: &[(String, String)],
        ) -> Result<String, MultiplexerError> {
            let id = format!("oj-{name}");
            self.sessions
                .lock()
                .insert(id.clone(), FakeSession { alive: true, exit_code: None, output: String::new() });
            Ok(id)
        }

        async fn send_keys(&self, id: &str, keys: &str) -> Result<(), MultiplexerError> {
            self.send_literal(id, keys).await
        }

        async fn send_literal(&self, id: &str, text: &str) -> Result<(), MultiplexerError> {
            let mut sessions = self.sessions.lock();
            let session = sessions.get_mut(id).ok_or_else(|| MultiplexerError::NotFound(id.to_string()))?;
            session.output.push_str(text);
            Ok(())
        }

        async fn send_enter(&self, id: &str) -> Result<(), MultiplexerError> {
            let mut sessions = self.sessions.lock();
            let session = sessions.get_mut(id).ok_or_else(|| MultiplexerError::NotFound(id.to_string()))?;
            session.output.push('\n');
            Ok(())
        }

        async fn kill(&self, id: &str) -> Result<(), MultiplexerError> {
            self.sessions.lock().remove(id);
            Ok(())
        }

        async fn is_alive(&self, id: &str) -> Result<bool, MultiplexerError> {
            Ok(self.sessions.lock().get(id).map(|s| s.alive).unwrap_or(false))
        }

        async fn capture_output(&self, id: &str, _lines: u32) -> Result<String, MultiplexerError> {
            self.sessions
                .lock()
                .get(id)
                .map(|s| s.output.clone())
                .ok_or_else(|| MultiplexerError::NotFound(id.to_string()))
        }

        async fn get_exit_code(&self, id: &str) -> Result<Option<i32>, MultiplexerError> {
            self.sessions
                .lock()
                .get(id)
                .map(|s| s.exit_code)
                .ok_or_else(|| MultiplexerError::NotFound(id.to_string()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeMultiplexerAdapter;

#[cfg(test)]
#[path = "multiplexer_tests.rs"]
mod tests;
