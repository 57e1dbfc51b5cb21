// SPDX-License-Identifier: MIT

//! Briefing Assembler (spec.md §4.4): deterministically renders the prompt
//! payload handed to an executor from the job's template, its dependency
//! outputs, its `include` files, and a resolved rules file.

use oj_core::job::{InlineCategory, Job};
use oj_core::plan::Plan;
use oj_runbook::TemplateStore;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BriefingError {
    #[error("template error: {0}")]
    Template(#[from] oj_runbook::TemplateError),
    #[error("prompt exceeds limit of {limit} bytes ({actual} bytes)")]
    PromptTooLong { limit: usize, actual: usize },
    #[error("io error reading {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

/// Assembly-time configuration: the size ceiling (spec.md §4.4 step 6) and
/// the repo-wide fallback rules path used when `rules_file` resolves to
/// nothing (spec.md §4.4 step 4).
#[derive(Debug, Clone)]
pub struct BriefingOptions {
    pub max_size: usize,
    pub default_rules_path: Option<PathBuf>,
}

impl Default for BriefingOptions {
    fn default() -> Self {
        Self { max_size: 512 * 1024, default_rules_path: None }
    }
}

/// A fully rendered briefing, ready to hand to an executor, plus the
/// filenames it referenced (for UI display, not for execution).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Briefing {
    pub text: String,
    pub attachments: Vec<String>,
}

/// Builds briefings against one plan directory's template search path.
pub struct BriefingAssembler {
    templates: TemplateStore,
}

impl BriefingAssembler {
    pub fn new(plan_dir: impl Into<PathBuf>) -> Self {
        let plan_dir = plan_dir.into();
        Self { templates: TemplateStore::new(plan_dir) }
    }

    /// Render `job`'s briefing against `plan`'s current (fresh) state.
    /// Dependencies are read from `plan` as it stands at the moment of the
    /// call — the orchestrator is responsible for re-loading the plan
    /// immediately before each ReadySet computation so this always sees a
    /// consistent snapshot (spec.md §5 ordering guarantee).
    pub fn assemble(
        &self,
        job: &Job,
        plan: &Plan,
        opts: &BriefingOptions,
    ) -> Result<Briefing, BriefingError> {
        let template_name =
            job.template.clone().unwrap_or_else(|| TemplateStore::default_for_type(job.job_type).to_string());
        let template = self.templates.lookup(&template_name)?;

        let mut attachments = Vec::new();

        let dependencies = self.render_dependencies(job, plan, &mut attachments);
        let include = self.render_include(job, plan, &mut attachments);
        let rules = self.resolve_rules(job, plan, opts)?;

        let text = template
            .replace("{{rules}}", &rules)
            .replace("{{dependencies}}", &dependencies)
            .replace("{{include}}", &include)
            .replace("{{prompt}}", &job.body)
            .replace("{{body}}", &job.body);

        if text.len() > opts.max_size {
            return Err(BriefingError::PromptTooLong { limit: opts.max_size, actual: text.len() });
        }

        Ok(Briefing { text, attachments })
    }

    fn render_dependencies(&self, job: &Job, plan: &Plan, attachments: &mut Vec<String>) -> String {
        let inline = job.inline.contains(InlineCategory::Dependencies) || job.prepend_dependencies;
        let mut out = String::new();
        for dep_name in &job.depends_on {
            let Some(dep) = resolve_dependency(plan, dep_name) else { continue };
            if inline {
                out.push_str(&bracket(&dep.filename, &dep.body));
            } else {
                out.push_str(&format!("@{}\n", dep.filename));
            }
            attachments.push(dep.filename.clone());
        }
        out
    }

    fn render_include(&self, job: &Job, plan: &Plan, attachments: &mut Vec<String>) -> String {
        let inline = job.inline.contains(InlineCategory::Include);
        let mut out = String::new();
        for rel_path in &job.include {
            let full_path = plan.directory.join(rel_path);
            if inline {
                match std::fs::read_to_string(&full_path) {
                    Ok(contents) => out.push_str(&bracket(rel_path, &contents)),
                    Err(_) => out.push_str(&format!("@{rel_path} (unreadable)\n")),
                }
            } else {
                out.push_str(&format!("@{rel_path}\n"));
            }
            attachments.push(rel_path.clone());
        }
        out
    }

    fn resolve_rules(&self, job: &Job, plan: &Plan, opts: &BriefingOptions) -> Result<String, BriefingError> {
        let Some(rules_file) = &job.rules_file else {
            return Ok(self.read_default_rules(opts)?.unwrap_or_default());
        };

        for candidate in rules_search_path(&plan.directory, rules_file) {
            if candidate.is_file() {
                return std::fs::read_to_string(&candidate)
                    .map_err(|source| BriefingError::Io { path: candidate, source });
            }
        }

        Ok(self.read_default_rules(opts)?.unwrap_or_default())
    }

    fn read_default_rules(&self, opts: &BriefingOptions) -> Result<Option<String>, BriefingError> {
        match &opts.default_rules_path {
            Some(path) if path.is_file() => {
                Ok(Some(std::fs::read_to_string(path).map_err(|source| BriefingError::Io {
                    path: path.clone(),
                    source,
                })?))
            }
            _ => Ok(None),
        }
    }
}

/// A `depends_on` entry may name either a job's filename or its `id`
/// (spec.md §6, mirrored by `Job::resolve_dependencies` for the graph) —
/// try filename first, then fall back to id, so the rendered briefing
/// doesn't silently drop id-declared dependencies the graph itself honors.
fn resolve_dependency<'a>(plan: &'a Plan, dep_name: &str) -> Option<&'a Job> {
    plan.job_by_filename(dep_name).or_else(|| plan.job(oj_core::JobId::from_string(dep_name)))
}

fn bracket(filename: &str, contents: &str) -> String {
    format!("--- START OF {filename} ---\n{}\n--- END OF {filename} ---\n", contents.trim_end())
}

/// Upward search for `rules_file`: the plan directory itself, then every
/// ancestor, matching the template store's own ancestor-search convention.
fn rules_search_path(plan_dir: &Path, rules_file: &str) -> Vec<PathBuf> {
    let mut out = vec![plan_dir.join(rules_file)];
    let mut current = plan_dir.parent();
    while let Some(dir) = current {
        out.push(dir.join(rules_file));
        current = dir.parent();
    }
    out
}

/// Archive a rendered briefing under `<plan>/.artifacts/<job-id>/briefing-<ts>.xml`
/// (spec.md §4.4 step 5, §6). `timestamp` is caller-supplied so the archive
/// path itself stays a pure function of its inputs, not wall-clock time.
pub fn archive_path(plan_dir: &Path, job_id: oj_core::JobId, timestamp: &str) -> PathBuf {
    plan_dir.join(".artifacts").join(job_id.to_string()).join(format!("briefing-{timestamp}.xml"))
}

pub fn write_archive(plan_dir: &Path, job_id: oj_core::JobId, timestamp: &str, text: &str) -> std::io::Result<PathBuf> {
    let path = archive_path(plan_dir, job_id, timestamp);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, text)?;
    Ok(path)
}

#[cfg(test)]
#[path = "briefing_tests.rs"]
mod tests;
