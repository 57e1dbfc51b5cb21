// SPDX-License-Identifier: MIT

//! Job identifier, frontmatter fields, and the job status state machine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a job (frontmatter `id`), stable across renames.
    pub struct JobId("job-");
}

/// The five kinds of work a job can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Oneshot,
    Chat,
    HeadlessAgent,
    InteractiveAgent,
    Shell,
}

crate::simple_display! {
    JobType {
        Oneshot => "oneshot",
        Chat => "chat",
        HeadlessAgent => "headless_agent",
        InteractiveAgent => "interactive_agent",
        Shell => "shell",
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oneshot" => Ok(JobType::Oneshot),
            "chat" => Ok(JobType::Chat),
            "headless_agent" => Ok(JobType::HeadlessAgent),
            "interactive_agent" => Ok(JobType::InteractiveAgent),
            "shell" => Ok(JobType::Shell),
            other => Err(format!("unknown job type: {other}")),
        }
    }
}

/// Lifecycle status of a job (spec.md §3 and the state machine of §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Todo,
    Hold,
    Running,
    Completed,
    Failed,
    Blocked,
    NeedsReview,
    Abandoned,
    PendingUser,
    PendingLlm,
    Interrupted,
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Todo => "todo",
        Hold => "hold",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Blocked => "blocked",
        NeedsReview => "needs_review",
        Abandoned => "abandoned",
        PendingUser => "pending_user",
        PendingLlm => "pending_llm",
        Interrupted => "interrupted",
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "todo" => Ok(JobStatus::Todo),
            "hold" => Ok(JobStatus::Hold),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "blocked" => Ok(JobStatus::Blocked),
            "needs_review" => Ok(JobStatus::NeedsReview),
            "abandoned" => Ok(JobStatus::Abandoned),
            "pending_user" => Ok(JobStatus::PendingUser),
            "pending_llm" => Ok(JobStatus::PendingLlm),
            "interrupted" => Ok(JobStatus::Interrupted),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Pending
    }
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Abandoned)
    }

    /// `todo`, `hold`, and `abandoned` are user-chosen labels the core never
    /// transitions into; every other edge is validated against the diagram
    /// in spec.md §4.8.
    pub fn can_transition_to(self, to: JobStatus) -> bool {
        use JobStatus::*;
        if to == self {
            return true;
        }
        match (self, to) {
            (_, Pending) if !self.is_terminal() => true,
            (Pending | Todo | Failed | Blocked | NeedsReview | PendingUser | PendingLlm, Running) => true,
            (Running, Completed | Failed | Interrupted | PendingUser | PendingLlm) => true,
            (Completed, NeedsReview) => true,
            (_, Blocked) if !self.is_terminal() => true,
            (s, Todo | Hold | Abandoned) if !s.is_terminal() => true,
            _ => false,
        }
    }

    /// Validate and return the transition, or the rejected target.
    pub fn transition(self, to: JobStatus) -> Result<JobStatus, InvalidTransition> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid job status transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Categories that may be inlined into a briefing rather than referenced by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineCategory {
    Dependencies,
    Include,
    Context,
}

/// `inline` frontmatter value: `"all"|"none"|"files"` or an explicit set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlinePolicy {
    pub all: bool,
    pub categories: Vec<InlineCategory>,
}

impl InlinePolicy {
    pub fn contains(&self, cat: InlineCategory) -> bool {
        self.all || self.categories.contains(&cat)
    }
}

/// One job: the in-memory projection of a Markdown file's frontmatter + body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Current on-disk filename, relative to the plan directory.
    pub filename: String,
    pub title: String,
    pub status: JobStatus,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub worktree: Option<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default, skip_serializing)]
    pub inline: InlinePolicy,
    #[serde(default)]
    pub prepend_dependencies: bool,
    #[serde(default)]
    pub agent_continue: bool,
    #[serde(default)]
    pub generate_plan_from: bool,
    #[serde(default)]
    pub rules_file: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,

    /// Body text, everything after the frontmatter block.
    #[serde(skip)]
    pub body: String,

    /// Exact separator between the closing `---` and `body`, captured at
    /// parse time so the frontmatter codec's `serialize` reproduces it
    /// byte-for-byte instead of normalizing every file to one blank line.
    /// Jobs built in memory rather than parsed from disk default to `"\n\n"`.
    #[serde(skip)]
    pub body_separator: String,

    /// True when a dependency target in `depends_on` did not resolve to a
    /// sibling job (by filename or id). Computed at graph-build time, not
    /// persisted.
    #[serde(skip)]
    pub has_dangling_dependency: bool,
}

impl Job {
    /// Dependencies resolved to job ids, in `depends_on` order. Entries that
    /// fail to resolve (by filename then by id) are reported as dangling.
    pub fn resolve_dependencies(
        &mut self,
        by_filename: &HashMap<String, JobId>,
        known_ids: &std::collections::HashSet<JobId>,
    ) -> Vec<JobId> {
        let mut resolved = Vec::with_capacity(self.depends_on.len());
        let mut dangling = false;
        for dep in &self.depends_on {
            if let Some(id) = by_filename.get(dep) {
                resolved.push(*id);
                continue;
            }
            let candidate = JobId::from_string(dep);
            if known_ids.contains(&candidate) {
                resolved.push(candidate);
                continue;
            }
            dangling = true;
        }
        self.has_dangling_dependency = dangling;
        resolved
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
