// SPDX-License-Identifier: MIT

//! Worktree Manager (spec.md §4.6): creates and tears down the isolated,
//! linked repository checkouts a job's `worktree` frontmatter field names.
//! `Ensure` is idempotent and keyed only by name — two plans that happen to
//! name the same worktree share it, matching spec.md §6's single
//! `<repo>/.grove-worktrees/<name>/` namespace. Concurrent callers for the
//! same name serialize on an in-process lock; distinct names proceed in
//! parallel (spec.md §5).

use oj_adapters::{VcsAdapter, VcsError, WorktreeEntry};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;

#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// Owns the `.grove-worktrees/` namespace for one repository.
pub struct WorktreeManager<V> {
    vcs: V,
    repo_root: PathBuf,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<V: VcsAdapter> WorktreeManager<V> {
    pub fn new(vcs: V, repo_root: PathBuf) -> Self {
        Self { vcs, repo_root, locks: Mutex::new(HashMap::new()) }
    }

    fn lock_for(&self, name: &str) -> Arc<AsyncMutex<()>> {
        self.locks.lock().entry(name.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.repo_root.join(".grove-worktrees").join(name)
    }

    /// `Ensure(plan, job) -> workdir` (spec.md §4.6). When `worktree_name` is
    /// `None` the job runs against the repo root directly, matching spec.md
    /// "if `job.worktree` is empty, returns the repo root".
    pub async fn ensure(&self, worktree_name: Option<&str>) -> Result<PathBuf, WorktreeError> {
        let Some(name) = worktree_name else {
            return Ok(self.repo_root.clone());
        };
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;
        let path = self.path_for(name);
        let branch = format!("oj/{name}");
        self.vcs.ensure(&self.repo_root, name, &path, &branch).await?;
        Ok(path)
    }

    pub async fn list(&self) -> Result<Vec<WorktreeEntry>, WorktreeError> {
        Ok(self.vcs.list(&self.repo_root).await?)
    }

    pub async fn destroy(&self, worktree_name: &str) -> Result<(), WorktreeError> {
        let lock = self.lock_for(worktree_name);
        let _guard = lock.lock().await;
        let path = self.path_for(worktree_name);
        self.vcs.destroy(&self.repo_root, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;
