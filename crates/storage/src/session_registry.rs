// SPDX-License-Identifier: MIT

//! Session Registry persistence (spec.md §4.7): a JSON-per-job-id map file
//! under the user config dir, tracking the one live agent process a job
//! may own. `reconcile` is the single discipline that keeps this global
//! state consistent across daemon restarts: any record whose pid is not
//! alive flips its job back to `interrupted` and is dropped.

use crate::error::{Result, StorageError};
use oj_core::{JobId, Session, SessionStatus};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Outcome of a single `reconcile()` pass: job ids whose session died and
/// which must transition back to `interrupted`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub interrupted: Vec<JobId>,
}

/// Checks whether a pid is alive and owned by the current user, running
/// under the expected executable name. Kept as a trait so tests can fake
/// process liveness without touching `/proc` or real signals.
pub trait PidProbe: Send + Sync {
    fn is_alive(&self, pid: u32, expected_exe_hint: &str) -> bool;
}

/// Probes liveness via `kill(pid, 0)` (Unix) — the standard
/// existence-check idiom, matching the teacher's process-adapter
/// convention of using `nix::sys::signal` rather than parsing `/proc`.
pub struct SignalProbe;

impl PidProbe for SignalProbe {
    fn is_alive(&self, pid: u32, _expected_exe_hint: &str) -> bool {
        #[cfg(unix)]
        {
            use nix::sys::signal::kill;
            use nix::unistd::Pid;
            kill(Pid::from_raw(pid as i32), None).is_ok()
        }
        #[cfg(not(unix))]
        {
            let _ = pid;
            false
        }
    }
}

/// File-backed registry of live `Session`s, one JSON record per job-id.
pub struct SessionRegistry {
    path: PathBuf,
}

impl SessionRegistry {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default path: `~/.grove/flow/sessions.json`, per spec.md §6
    /// ("well-known under the user config dir").
    pub fn default_path() -> PathBuf {
        dirs_config_dir().join("grove").join("flow").join("sessions.json")
    }

    fn load(&self) -> Result<BTreeMap<String, Session>> {
        match fs::read(&self.path) {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::MalformedFrontmatter {
                    filename: self.path.display().to_string(),
                    reason: e.to_string(),
                }),
            Ok(_) => Ok(BTreeMap::new()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::Io { path: self.path.clone(), source: e }),
        }
    }

    fn save(&self, records: &BTreeMap<String, Session>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::Io { path: parent.to_path_buf(), source: e })?;
        }
        let bytes = serde_json::to_vec_pretty(records).map_err(|e| {
            StorageError::MalformedFrontmatter { filename: self.path.display().to_string(), reason: e.to_string() }
        })?;
        crate::frontmatter::write_atomic(&self.path, &String::from_utf8_lossy(&bytes))
    }

    /// Register a new live session. Errors if a live session already
    /// exists for this job-id (spec.md §3: at most one live Session per
    /// job-id).
    pub fn register(&self, session: Session) -> Result<()> {
        let mut records = self.load()?;
        let key = session.job_id.to_string();
        if records.contains_key(&key) {
            return Err(StorageError::SessionAlreadyRegistered(key));
        }
        records.insert(key, session);
        self.save(&records)
    }

    pub fn update_session_id(&self, job_id: &JobId, native_session_id: impl Into<String>) -> Result<()> {
        let mut records = self.load()?;
        if let Some(s) = records.get_mut(&job_id.to_string()) {
            s.native_session_id = Some(native_session_id.into());
            s.status = SessionStatus::Alive;
        }
        self.save(&records)
    }

    pub fn find(&self, job_id: &JobId) -> Result<Option<Session>> {
        Ok(self.load()?.get(&job_id.to_string()).cloned())
    }

    pub fn remove(&self, job_id: &JobId) -> Result<Option<Session>> {
        let mut records = self.load()?;
        let removed = records.remove(&job_id.to_string());
        self.save(&records)?;
        Ok(removed)
    }

    pub fn all(&self) -> Result<Vec<Session>> {
        Ok(self.load()?.into_values().collect())
    }

    /// Walk every record; drop any whose pid is not alive and report its
    /// job-id so the caller can flip that job's status to `interrupted`.
    /// Live records are left untouched. Runs once at orchestrator start
    /// and on every scheduler tick (spec.md §4.7).
    pub fn reconcile(&self, probe: &dyn PidProbe) -> Result<ReconcileReport> {
        let mut records = self.load()?;
        let mut report = ReconcileReport::default();
        let dead: Vec<String> = records
            .iter()
            .filter(|(_, s)| !probe.is_alive(s.pid, &s.provider))
            .map(|(k, _)| k.clone())
            .collect();
        for key in dead {
            if let Some(session) = records.remove(&key) {
                report.interrupted.push(session.job_id);
            }
        }
        self.save(&records)?;
        Ok(report)
    }
}

fn dirs_config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
#[path = "session_registry_tests.rs"]
mod tests;
