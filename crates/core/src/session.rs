// SPDX-License-Identifier: MIT

//! Session identifier type and record for tracking running agent processes.
//!
//! SessionId identifies an agent's underlying process/session (e.g. a tmux
//! pane or a headless child process). A [`Session`] record links it to the
//! job that owns it, per spec.md §3 and §4.7.

use crate::job::JobId;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier for an agent session.
///
/// Sessions represent the underlying execution environment for agents,
/// such as tmux sessions. Multiple agent invocations may share a session,
/// or each agent may have its own dedicated session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Create a new SessionId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value of this SessionId.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for SessionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SessionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Status of a tracked agent session, independent of the job status
/// (a session outlives a single `Execute` call for interactive agents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Starting,
    Alive,
    Idle,
    Exited,
}

crate::simple_display! {
    SessionStatus {
        Starting => "starting",
        Alive => "alive",
        Idle => "idle",
        Exited => "exited",
    }
}

/// A running (or just-exited) agent process associated with a job.
///
/// At most one live `Session` exists per job-id at any time (spec.md §3
/// invariant); the registry in `oj-storage` enforces this on `register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub job_id: JobId,
    pub provider: String,
    pub pid: u32,
    /// Provider-specific session identifier (e.g. a tmux session name),
    /// set once the child process reports it.
    pub native_session_id: Option<String>,
    pub transcript_path: std::path::PathBuf,
    pub status: SessionStatus,
    pub started_at: String,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
