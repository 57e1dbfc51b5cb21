// SPDX-License-Identifier: MIT

//! Template & Recipe Store, lookup half (spec.md §4.5). A template is a
//! Markdown file with `{{dependencies}}`/`{{include}}`/`{{rules}}`/`{{body}}`/
//! `{{prompt}}` placeholders, resolved by name with search order: plan
//! directory, plan-config ancestors, built-in embedded set.

use std::path::{Path, PathBuf};

/// Built-in templates, embedded at compile time so a fresh plan always has
/// sane defaults even with no `templates/` directory of its own.
const BUILTIN_ONESHOT: &str = include_str!("templates/oneshot.md");
const BUILTIN_CHAT: &str = include_str!("templates/chat.md");
const BUILTIN_HEADLESS_AGENT: &str = include_str!("templates/headless_agent.md");
const BUILTIN_INTERACTIVE_AGENT: &str = include_str!("templates/interactive_agent.md");

fn builtin(name: &str) -> Option<&'static str> {
    match name {
        "oneshot" => Some(BUILTIN_ONESHOT),
        "chat" => Some(BUILTIN_CHAT),
        "headless_agent" => Some(BUILTIN_HEADLESS_AGENT),
        "interactive_agent" => Some(BUILTIN_INTERACTIVE_AGENT),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template '{0}' not found in plan directory, ancestors, or built-ins")]
    NotFound(String),
    #[error("io error reading template {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

/// Looks up templates by name against a plan directory, per spec.md §4.5:
/// plan directory, plan-config ancestors, built-in embedded set.
pub struct TemplateStore {
    plan_dir: PathBuf,
}

impl TemplateStore {
    pub fn new(plan_dir: impl Into<PathBuf>) -> Self {
        Self { plan_dir: plan_dir.into() }
    }

    /// Resolve a template by name, trying (in order):
    /// 1. `<plan>/templates/<name>.md`
    /// 2. `<ancestor>/templates/<name>.md` for each ancestor of the plan dir
    ///    that carries a `.grove-plan.yml`
    /// 3. the built-in embedded set
    pub fn lookup(&self, name: &str) -> Result<String, TemplateError> {
        let local = self.plan_dir.join("templates").join(format!("{name}.md"));
        if local.is_file() {
            return std::fs::read_to_string(&local)
                .map_err(|source| TemplateError::Io { path: local, source });
        }

        for ancestor in ancestors_with_plan_config(&self.plan_dir) {
            let candidate = ancestor.join("templates").join(format!("{name}.md"));
            if candidate.is_file() {
                return std::fs::read_to_string(&candidate)
                    .map_err(|source| TemplateError::Io { path: candidate, source });
            }
        }

        builtin(name).map(str::to_string).ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// The type-specific default template name when a job sets no
    /// `template` field (spec.md §4.4 step 1).
    pub fn default_for_type(job_type: oj_core::job::JobType) -> &'static str {
        use oj_core::job::JobType::*;
        match job_type {
            Oneshot => "oneshot",
            Chat => "chat",
            HeadlessAgent => "headless_agent",
            InteractiveAgent => "interactive_agent",
            Shell => "oneshot",
        }
    }
}

fn ancestors_with_plan_config(start: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut current = start.parent();
    while let Some(dir) = current {
        if dir.join(".grove-plan.yml").is_file() {
            out.push(dir.to_path_buf());
        }
        current = dir.parent();
    }
    out
}

#[cfg(test)]
#[path = "template_store_tests.rs"]
mod tests;
