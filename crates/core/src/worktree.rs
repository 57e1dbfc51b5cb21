// SPDX-License-Identifier: MIT

//! Worktree identifier and lifecycle status.
//!
//! A worktree is a named, linked working-tree checkout living at
//! `<repo>/.grove-worktrees/<name>/` (spec.md §4.6). It is the unit of
//! isolation and rollback for a job: `job.worktree` names one, several jobs
//! may share a name, and at most one `interactive_agent` may run against a
//! given worktree at a time.

use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Unique identifier for a worktree lease, distinct from its human-chosen
    /// name (the name is stable across runs; the id identifies one lifetime).
    pub struct WorktreeId("wkt-");
}

/// Status of a worktree in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorktreeStatus {
    /// Linked checkout is being created.
    #[default]
    Creating,
    /// Ready for a job to acquire it.
    Ready,
    /// Held by a running job; `interactive_agent` enforces exclusivity here.
    InUse {
        /// Job id currently holding the worktree.
        by: String,
    },
    /// Checkout removal in progress.
    Destroying,
    /// Creation or teardown failed.
    Failed {
        reason: String,
    },
}

crate::simple_display! {
    WorktreeStatus {
        Creating => "creating",
        Ready => "ready",
        InUse(..) => "in_use",
        Destroying => "destroying",
        Failed(..) => "failed",
    }
}

/// A named worktree and its current lease state, as tracked by the daemon.
/// The directory itself is owned by the `VcsAdapter` in `oj-adapters`; this
/// type is the bookkeeping record, not the checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worktree {
    pub id: WorktreeId,
    /// The `<worktree-name>` from frontmatter; also the directory name under
    /// `.grove-worktrees/`.
    pub name: String,
    pub status: WorktreeStatus,
}

impl Worktree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorktreeId::new(),
            name: name.into(),
            status: WorktreeStatus::Creating,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.status, WorktreeStatus::Ready)
    }
}

impl fmt::Display for Worktree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.status)
    }
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;
