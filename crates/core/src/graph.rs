// SPDX-License-Identifier: MIT

//! Dependency graph over a plan's jobs: topological order, ready-set
//! computation, cycle detection, and dependent lookups (spec.md §4.3).
//!
//! Kahn's algorithm with a deterministic, lexicographic tie-break keeps
//! `Build` reproducible across runs on the same plan snapshot.

use crate::job::{Job, JobId, JobStatus};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("dependency cycle: {0}")]
    Cycle(String),
}

/// Whether `needs_review` counts as a satisfied dependency. Plan-level
/// configuration (`.grove-plan.yml`); see DESIGN.md for the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadyPolicy {
    pub needs_review_satisfies: bool,
}

/// A built dependency graph over one snapshot of a plan's jobs. Immutable:
/// re-`Build` on every ReadySet computation so a run always sees a
/// consistent snapshot (spec.md §4.8 ordering guarantee).
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    order: Vec<JobId>,
    dependents: HashMap<JobId, Vec<JobId>>,
    depends_on: HashMap<JobId, Vec<JobId>>,
}

impl DependencyGraph {
    /// Build the graph from a plan's jobs, each already carrying resolved
    /// `depends_on` ids (see [`crate::job::Job::resolve_dependencies`]).
    /// Jobs are keyed by `(filename, id)` so tie-breaking is lexicographic
    /// on filename, matching the on-disk ordering a human would expect.
    pub fn build(jobs: &[Job], resolved: &HashMap<JobId, Vec<JobId>>) -> Result<Self, GraphError> {
        let mut filename_by_id: BTreeMap<String, JobId> = BTreeMap::new();
        for job in jobs {
            filename_by_id.insert(job.filename.clone(), job.id);
        }

        let ids: BTreeSet<JobId> = jobs.iter().map(|j| j.id).collect();
        let mut in_degree: HashMap<JobId, usize> = ids.iter().map(|id| (*id, 0)).collect();
        let mut dependents: HashMap<JobId, Vec<JobId>> = ids.iter().map(|id| (*id, Vec::new())).collect();
        let mut depends_on: HashMap<JobId, Vec<JobId>> = HashMap::new();

        for job in jobs {
            let deps = resolved.get(&job.id).cloned().unwrap_or_default();
            let mut within_plan: Vec<JobId> = Vec::new();
            for dep in &deps {
                if ids.contains(dep) {
                    if let Some(deg) = in_degree.get_mut(&job.id) {
                        *deg += 1;
                    }
                    if let Some(list) = dependents.get_mut(dep) {
                        list.push(job.id);
                    }
                    within_plan.push(*dep);
                }
            }
            depends_on.insert(job.id, within_plan);
        }

        // Lexicographic tie-break: order candidate ids by filename.
        let filename_of: HashMap<JobId, &str> =
            filename_by_id.iter().map(|(name, id)| (*id, name.as_str())).collect();

        let mut queue: VecDeque<JobId> = VecDeque::new();
        let mut ready: Vec<JobId> =
            in_degree.iter().filter(|(_, deg)| **deg == 0).map(|(id, _)| *id).collect();
        ready.sort_by_key(|id| filename_of.get(id).copied().unwrap_or_default());
        queue.extend(ready);

        let mut order = Vec::with_capacity(jobs.len());
        while let Some(current) = queue.pop_front() {
            order.push(current);
            let mut next_batch = Vec::new();
            for dependent in dependents.get(&current).cloned().unwrap_or_default() {
                let Some(deg) = in_degree.get_mut(&dependent) else { continue };
                *deg = deg.saturating_sub(1);
                if *deg == 0 {
                    next_batch.push(dependent);
                }
            }
            next_batch.sort_by_key(|id| filename_of.get(id).copied().unwrap_or_default());
            queue.extend(next_batch);
        }

        if order.len() != ids.len() {
            let stuck: Vec<&str> = in_degree
                .iter()
                .filter(|(_, deg)| **deg > 0)
                .map(|(id, _)| filename_of.get(id).copied().unwrap_or("?"))
                .collect();
            let mut stuck = stuck;
            stuck.sort_unstable();
            return Err(GraphError::Cycle(stuck.join(", ")));
        }

        Ok(Self { order, dependents, depends_on })
    }

    /// Topological order, ties broken by filename.
    pub fn order(&self) -> &[JobId] {
        &self.order
    }

    pub fn dependents(&self, id: JobId) -> &[JobId] {
        self.dependents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All jobs that transitively depend on `id`, in no particular order.
    pub fn transitive_dependents(&self, id: JobId) -> HashSet<JobId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<JobId> = self.dependents(id).to_vec();
        while let Some(current) = stack.pop() {
            if seen.insert(current) {
                stack.extend(self.dependents(current).iter().copied());
            }
        }
        seen
    }

    /// Direct dependencies of `id` that are part of this plan.
    pub fn depends_on(&self, id: JobId) -> &[JobId] {
        self.depends_on.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Compute the ready set against a status snapshot (spec.md §4.3).
    ///
    /// A job is ready iff every in-plan dependency is satisfied, the job's
    /// own status is schedulable, and no dependency is dangling. A job with
    /// any dependency in `{failed, abandoned, blocked}` is reported as
    /// blocked rather than scheduled.
    pub fn ready_set(
        &self,
        jobs: &[Job],
        policy: ReadyPolicy,
    ) -> (Vec<JobId>, HashSet<JobId>) {
        let status_by_id: HashMap<JobId, JobStatus> = jobs.iter().map(|j| (j.id, j.status)).collect();
        let dangling_by_id: HashMap<JobId, bool> =
            jobs.iter().map(|j| (j.id, j.has_dangling_dependency)).collect();

        let schedulable = |s: JobStatus| {
            matches!(
                s,
                JobStatus::Pending
                    | JobStatus::Todo
                    | JobStatus::Failed
                    | JobStatus::Blocked
                    | JobStatus::NeedsReview
                    | JobStatus::PendingUser
                    | JobStatus::PendingLlm
            )
        };

        let dep_satisfied = |s: JobStatus| {
            s == JobStatus::Completed || (policy.needs_review_satisfies && s == JobStatus::NeedsReview)
        };

        let mut ready = Vec::new();
        let mut blocked = HashSet::new();

        for job in jobs {
            if !schedulable(job.status) {
                continue;
            }
            if *dangling_by_id.get(&job.id).unwrap_or(&false) {
                blocked.insert(job.id);
                continue;
            }
            let deps = self.depends_on(job.id);
            let mut all_satisfied = true;
            let mut any_blocking = false;
            for dep in deps {
                let dep_status = status_by_id.get(dep).copied().unwrap_or(JobStatus::Pending);
                if matches!(dep_status, JobStatus::Failed | JobStatus::Abandoned | JobStatus::Blocked) {
                    any_blocking = true;
                }
                if !dep_satisfied(dep_status) {
                    all_satisfied = false;
                }
            }
            if any_blocking {
                blocked.insert(job.id);
            } else if all_satisfied {
                ready.push(job.id);
            }
        }

        ready.sort_by_key(|id| self.order.iter().position(|o| o == id).unwrap_or(usize::MAX));
        (ready, blocked)
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
