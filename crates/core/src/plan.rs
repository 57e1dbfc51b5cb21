// SPDX-License-Identifier: MIT

//! Plan: the in-memory projection of a plan directory and its jobs
//! (spec.md §3). Loading from and persisting to disk is `oj-storage`'s job;
//! this type only holds the data model and the lookups built on top of it.

use crate::job::{Job, JobId};
use crate::worktree::WorktreeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

crate::define_id! {
    /// Derived from the plan directory name; stable as long as the
    /// directory isn't renamed.
    pub struct PlanId("pln-");
}

/// Plan-level defaults read from `<plan>/.grove-plan.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanDefaults {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub worktree: Option<String>,
    #[serde(default)]
    pub chat_directory: Option<String>,
    #[serde(default)]
    pub needs_review_satisfies_dependency: bool,
}

/// One loaded plan: its jobs plus the lookup indices the orchestrator and
/// dependency graph build on top of.
#[derive(Debug, Clone)]
pub struct Plan {
    pub id: PlanId,
    /// Canonical name, derived from `directory`'s final path component.
    pub name: String,
    pub directory: PathBuf,
    pub defaults: PlanDefaults,
    jobs: Vec<Job>,
    by_id: HashMap<JobId, usize>,
    by_filename: HashMap<String, JobId>,
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("duplicate job id {0} in plan")]
    DuplicateId(JobId),
    #[error("duplicate filename {0} in plan")]
    DuplicateFilename(String),
}

impl Plan {
    pub fn new(directory: PathBuf, defaults: PlanDefaults, jobs: Vec<Job>) -> Result<Self, PlanError> {
        let name = directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| directory.to_string_lossy().into_owned());

        let mut by_id = HashMap::with_capacity(jobs.len());
        let mut by_filename = HashMap::with_capacity(jobs.len());
        for (idx, job) in jobs.iter().enumerate() {
            if by_id.insert(job.id, idx).is_some() {
                return Err(PlanError::DuplicateId(job.id));
            }
            if by_filename.insert(job.filename.clone(), job.id).is_some() {
                return Err(PlanError::DuplicateFilename(job.filename.clone()));
            }
        }

        Ok(Self { id: PlanId::new(), name, directory, defaults, jobs, by_id, by_filename })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut [Job] {
        &mut self.jobs
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.by_id.get(&id).map(|&idx| &self.jobs[idx])
    }

    pub fn job_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.by_id.get(&id).copied().map(move |idx| &mut self.jobs[idx])
    }

    pub fn job_by_filename(&self, filename: &str) -> Option<&Job> {
        self.by_filename.get(filename).and_then(|id| self.job(*id))
    }

    pub fn filename_index(&self) -> &HashMap<String, JobId> {
        &self.by_filename
    }

    pub fn known_ids(&self) -> std::collections::HashSet<JobId> {
        self.by_id.keys().copied().collect()
    }

    /// Re-resolve every job's `depends_on` against the current id/filename
    /// indices. Returns the resolved dependency map keyed by job id, the
    /// input the dependency graph builds from.
    pub fn resolve_all_dependencies(&mut self) -> HashMap<JobId, Vec<JobId>> {
        let by_filename = self.by_filename.clone();
        let known = self.known_ids();
        let mut resolved = HashMap::with_capacity(self.jobs.len());
        for job in self.jobs.iter_mut() {
            resolved.insert(job.id, job.resolve_dependencies(&by_filename, &known));
        }
        resolved
    }

    pub fn append(&mut self, job: Job) -> Result<(), PlanError> {
        if self.by_id.contains_key(&job.id) {
            return Err(PlanError::DuplicateId(job.id));
        }
        if self.by_filename.contains_key(&job.filename) {
            return Err(PlanError::DuplicateFilename(job.filename.clone()));
        }
        self.by_filename.insert(job.filename.clone(), job.id);
        self.by_id.insert(job.id, self.jobs.len());
        self.jobs.push(job);
        Ok(())
    }

    pub fn worktree_dir(&self, worktree_name: &str) -> PathBuf {
        self.directory.join(".grove-worktrees").join(worktree_name)
    }
}

/// A Worktree lease keyed by plan, so two plans never contend on the same
/// `.grove-worktrees/<name>` directory by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorktreeKey {
    pub plan: PlanId,
    pub worktree: WorktreeId,
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
