// SPDX-License-Identifier: MIT

//! Version control adapter backing the Worktree Manager (spec.md §4.6).
//!
//! Deliberately shells out to the `git` binary rather than linking
//! `git2`/libgit2: worktrees are a thin wrapper around `git worktree`
//! plumbing the repo already has installed, and shelling out keeps the
//! adapter surface (and its fake) small.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

use crate::subprocess::{run_with_timeout, GIT_WORKTREE_TIMEOUT};

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git command failed: {0}")]
    CommandFailed(String),
    #[error("worktree not found: {0}")]
    NotFound(String),
}

/// One entry of `git worktree list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeEntry {
    pub name: String,
    pub path: PathBuf,
    pub branch: Option<String>,
}

/// Adapter for the git worktree operations the Worktree Manager needs:
/// create-if-missing, enumerate, and remove.
#[async_trait]
pub trait VcsAdapter: Clone + Send + Sync + 'static {
    /// Create a worktree named `name` at `path` off `branch` if one doesn't
    /// already exist there; idempotent when the worktree is already present.
    async fn ensure(&self, repo_root: &Path, name: &str, path: &Path, branch: &str) -> Result<(), VcsError>;

    /// List worktrees known to the repository at `repo_root`.
    async fn list(&self, repo_root: &Path) -> Result<Vec<WorktreeEntry>, VcsError>;

    /// Remove the worktree at `path`, forcing removal of any uncommitted changes.
    async fn destroy(&self, repo_root: &Path, path: &Path) -> Result<(), VcsError>;
}

/// Real adapter, shelling out to the system `git`.
#[derive(Clone, Copy, Default)]
pub struct GitVcsAdapter;

impl GitVcsAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VcsAdapter for GitVcsAdapter {
    async fn ensure(&self, repo_root: &Path, name: &str, path: &Path, branch: &str) -> Result<(), VcsError> {
        if path.exists() {
            return Ok(());
        }

        let mut cmd = Command::new("git");
        cmd.current_dir(repo_root).args(["worktree", "add", "-b", branch]).arg(path).arg("HEAD");

        let output =
            run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree add").await.map_err(VcsError::CommandFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Branch may already exist from a previous interrupted run; retry
            // without -b, reusing the existing branch.
            if stderr.contains("already exists") {
                let mut retry = Command::new("git");
                retry.current_dir(repo_root).args(["worktree", "add"]).arg(path).arg(branch);
                let retry_output = run_with_timeout(retry, GIT_WORKTREE_TIMEOUT, "git worktree add (retry)")
                    .await
                    .map_err(VcsError::CommandFailed)?;
                if !retry_output.status.success() {
                    return Err(VcsError::CommandFailed(String::from_utf8_lossy(&retry_output.stderr).to_string()));
                }
                return Ok(());
            }
            return Err(VcsError::CommandFailed(format!("worktree {name}: {stderr}")));
        }

        Ok(())
    }

    async fn list(&self, repo_root: &Path) -> Result<Vec<WorktreeEntry>, VcsError> {
        let mut cmd = Command::new("git");
        cmd.current_dir(repo_root).args(["worktree", "list", "--porcelain"]);

        let output =
            run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree list").await.map_err(VcsError::CommandFailed)?;

        if !output.status.success() {
            return Err(VcsError::CommandFailed(String::from_utf8_lossy(&output.stderr).to_string()));
        }

        Ok(parse_porcelain(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn destroy(&self, repo_root: &Path, path: &Path) -> Result<(), VcsError> {
        let mut cmd = Command::new("git");
        cmd.current_dir(repo_root).args(["worktree", "remove", "--force"]).arg(path);

        let output =
            run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree remove").await.map_err(VcsError::CommandFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("not a working tree") {
                return Err(VcsError::NotFound(path.display().to_string()));
            }
            return Err(VcsError::CommandFailed(stderr.to_string()));
        }

        Ok(())
    }
}

fn parse_porcelain(text: &str) -> Vec<WorktreeEntry> {
    let mut entries = Vec::new();
    let mut path: Option<PathBuf> = None;
    let mut branch: Option<String> = None;

    for line in text.lines() {
        if let Some(p) = line.strip_prefix("worktree ") {
            if let Some(prev_path) = path.take() {
                entries.push(entry_from(prev_path, branch.take()));
            }
            path = Some(PathBuf::from(p));
        } else if let Some(b) = line.strip_prefix("branch ") {
            branch = Some(b.trim_start_matches("refs/heads/").to_string());
        } else if line.is_empty() {
            if let Some(prev_path) = path.take() {
                entries.push(entry_from(prev_path, branch.take()));
            }
        }
    }
    if let Some(prev_path) = path.take() {
        entries.push(entry_from(prev_path, branch.take()));
    }

    entries
}

fn entry_from(path: PathBuf, branch: Option<String>) -> WorktreeEntry {
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    WorktreeEntry { name, path, branch }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{VcsAdapter, VcsError, WorktreeEntry};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::Path;
    use std::sync::Arc;

    /// In-memory double for [`VcsAdapter`]: tracks worktrees by path without
    /// touching the filesystem or a real git repository.
    #[derive(Clone, Default)]
    pub struct FakeVcsAdapter {
        entries: Arc<Mutex<Vec<WorktreeEntry>>>,
    }

    impl FakeVcsAdapter {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl VcsAdapter for FakeVcsAdapter {
        async fn ensure(&self, _repo_root: &Path, name: &str, path: &Path, branch: &str) -> Result<(), VcsError> {
            let mut entries = self.entries.lock();
            if !entries.iter().any(|e| e.path == path) {
                entries.push(WorktreeEntry {
                    name: name.to_string(),
                    path: path.to_path_buf(),
                    branch: Some(branch.to_string()),
                });
            }
            Ok(())
        }

        async fn list(&self, _repo_root: &Path) -> Result<Vec<WorktreeEntry>, VcsError> {
            Ok(self.entries.lock().clone())
        }

        async fn destroy(&self, _repo_root: &Path, path: &Path) -> Result<(), VcsError> {
            let mut entries = self.entries.lock();
            let before = entries.len();
            entries.retain(|e| e.path != path);
            if entries.len() == before {
                return Err(VcsError::NotFound(path.display().to_string()));
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeVcsAdapter;

#[cfg(test)]
#[path = "vcs_tests.rs"]
mod tests;
