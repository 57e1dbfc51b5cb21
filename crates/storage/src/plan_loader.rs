// SPDX-License-Identifier: MIT

//! Plan Loader & State Persister (spec.md §4.2). `load_plan` enumerates a
//! directory's job files in deterministic order and builds a [`Plan`];
//! [`PlanPersister`] exposes the narrow mutators over it, each re-reading,
//! patching, and rewriting one job file atomically and emitting an
//! observer event.

use crate::error::{Result, StorageError};
use crate::frontmatter;
use crate::observer::{ObserverEvent, ObserverSink};
use oj_core::job::JobStatus;
use oj_core::plan::{Plan, PlanDefaults};
use oj_core::JobId;
use std::path::{Path, PathBuf};

const ARCHIVE_DIR: &str = ".archive";
const PLAN_CONFIG: &str = ".grove-plan.yml";

/// Load a plan from disk: enumerate non-`.archive` `*.md` files in
/// deterministic filesystem order, parse each with the frontmatter codec,
/// and resolve dependencies.
pub fn load_plan(dir: &Path) -> Result<Plan> {
    if !dir.is_dir() {
        return Err(StorageError::PlanNotFound(dir.to_path_buf()));
    }

    let defaults = load_defaults(dir)?;

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|source| StorageError::Io { path: dir.to_path_buf(), source })?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
        .collect();
    entries.sort();

    let mut jobs = Vec::with_capacity(entries.len());
    let mut seen_ids: std::collections::HashMap<JobId, String> = std::collections::HashMap::new();

    for path in entries {
        let filename = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let contents = std::fs::read_to_string(&path)
            .map_err(|source| StorageError::Io { path: path.clone(), source })?;
        let job = frontmatter::parse(&filename, &contents)?;

        if let Some(first) = seen_ids.get(&job.id) {
            return Err(StorageError::DuplicateId {
                id: job.id.to_string(),
                first: first.clone(),
                second: filename,
            });
        }
        seen_ids.insert(job.id, filename.clone());
        jobs.push(job);
    }

    let mut plan = Plan::new(dir.to_path_buf(), defaults, jobs)?;
    plan.resolve_all_dependencies();
    Ok(plan)
}

fn load_defaults(dir: &Path) -> Result<PlanDefaults> {
    let config_path = dir.join(PLAN_CONFIG);
    if !config_path.exists() {
        return Ok(PlanDefaults::default());
    }
    let contents = std::fs::read_to_string(&config_path)
        .map_err(|source| StorageError::Io { path: config_path.clone(), source })?;
    serde_yaml::from_str(&contents).map_err(|e| StorageError::MalformedFrontmatter {
        filename: PLAN_CONFIG.to_string(),
        reason: e.to_string(),
    })
}

/// Entries excluded from enumeration, per spec.md §3: the job set is
/// exactly the Markdown files in the directory, excluding `.archive/`.
pub fn is_archived(path: &Path, plan_dir: &Path) -> bool {
    path.strip_prefix(plan_dir).map(|rel| rel.starts_with(ARCHIVE_DIR)).unwrap_or(false)
}

/// Per-job-file locking plus the narrow mutator set over a loaded plan's
/// on-disk files. One instance per daemon process; the lock table is
/// in-process (advisory, not cross-process) since every writer in this
/// system is this daemon.
pub struct PlanPersister<'a> {
    plan_dir: PathBuf,
    locks: parking_lot::Mutex<std::collections::HashMap<String, std::sync::Arc<parking_lot::Mutex<()>>>>,
    observer: &'a dyn ObserverSink,
}

impl<'a> PlanPersister<'a> {
    pub fn new(plan_dir: PathBuf, observer: &'a dyn ObserverSink) -> Self {
        Self { plan_dir, locks: parking_lot::Mutex::new(std::collections::HashMap::new()), observer }
    }

    fn file_lock(&self, filename: &str) -> std::sync::Arc<parking_lot::Mutex<()>> {
        self.locks.lock().entry(filename.to_string()).or_default().clone()
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        self.plan_dir.join(filename)
    }

    fn with_lock<T>(&self, filename: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.file_lock(filename);
        let _guard = lock.lock();
        f()
    }

    pub fn update_status(&self, filename: &str, status: JobStatus) -> Result<()> {
        self.with_lock(filename, || {
            let path = self.path_for(filename);
            let job = frontmatter::patch(&path, |j| j.status = status)?;
            self.observer.emit(ObserverEvent::JobUpdated { job_id: job.id, field: "status".into() });
            Ok(())
        })
    }

    pub fn update_type(&self, filename: &str, job_type: oj_core::job::JobType) -> Result<()> {
        self.with_lock(filename, || {
            let path = self.path_for(filename);
            let job = frontmatter::patch(&path, |j| j.job_type = job_type)?;
            self.observer.emit(ObserverEvent::JobUpdated { job_id: job.id, field: "type".into() });
            Ok(())
        })
    }

    pub fn update_template(&self, filename: &str, template: Option<String>) -> Result<()> {
        self.with_lock(filename, || {
            let path = self.path_for(filename);
            let job = frontmatter::patch(&path, |j| j.template = template)?;
            self.observer.emit(ObserverEvent::JobUpdated { job_id: job.id, field: "template".into() });
            Ok(())
        })
    }

    pub fn append_output(&self, filename: &str, text: &str) -> Result<()> {
        self.with_lock(filename, || {
            let path = self.path_for(filename);
            let job = frontmatter::patch(&path, |j| {
                if !j.body.ends_with('\n') && !j.body.is_empty() {
                    j.body.push('\n');
                }
                j.body.push_str(text);
            })?;
            self.observer.emit(ObserverEvent::JobUpdated { job_id: job.id, field: "body".into() });
            Ok(())
        })
    }

    pub fn set_timestamps(
        &self,
        filename: &str,
        created_at: Option<String>,
        updated_at: Option<String>,
        completed_at: Option<String>,
        duration: Option<String>,
    ) -> Result<()> {
        self.with_lock(filename, || {
            let path = self.path_for(filename);
            let job = frontmatter::patch(&path, |j| {
                if created_at.is_some() {
                    j.created_at = created_at.clone();
                }
                if updated_at.is_some() {
                    j.updated_at = updated_at.clone();
                }
                if completed_at.is_some() {
                    j.completed_at = completed_at.clone();
                }
                if duration.is_some() {
                    j.duration = duration.clone();
                }
            })?;
            self.observer.emit(ObserverEvent::JobUpdated { job_id: job.id, field: "timestamps".into() });
            Ok(())
        })
    }

    pub fn set_summary(&self, filename: &str, summary: String) -> Result<()> {
        self.with_lock(filename, || {
            let path = self.path_for(filename);
            let job = frontmatter::patch(&path, |j| j.summary = Some(summary.clone()))?;
            self.observer.emit(ObserverEvent::JobUpdated { job_id: job.id, field: "summary".into() });
            Ok(())
        })
    }

    pub fn update_dependencies(&self, filename: &str, depends_on: Vec<String>) -> Result<()> {
        self.with_lock(filename, || {
            let path = self.path_for(filename);
            let job = frontmatter::patch(&path, |j| j.depends_on = depends_on.clone())?;
            self.observer
                .emit(ObserverEvent::JobUpdated { job_id: job.id, field: "depends_on".into() });
            Ok(())
        })
    }

    /// Rename a job's title and, optionally, its on-disk filename. When the
    /// filename changes, every sibling job whose `depends_on` names the old
    /// filename is rewritten to name the new one.
    pub fn rename(&self, filename: &str, new_title: String, new_filename: Option<String>) -> Result<()> {
        self.with_lock(filename, || {
            let path = self.path_for(filename);
            let job = frontmatter::patch(&path, |j| j.title = new_title.clone())?;

            if let Some(new_name) = new_filename {
                if new_name != filename {
                    let new_path = self.path_for(&new_name);
                    let rendered = frontmatter::serialize(&oj_core::Job { filename: new_name.clone(), ..job.clone() });
                    frontmatter::write_atomic(&new_path, &rendered)?;
                    std::fs::remove_file(&path)
                        .map_err(|source| StorageError::Io { path: path.clone(), source })?;
                    self.retarget_dependents(filename, &new_name)?;
                }
            }

            self.observer.emit(ObserverEvent::JobUpdated { job_id: job.id, field: "title".into() });
            Ok(())
        })
    }

    fn retarget_dependents(&self, old_filename: &str, new_filename: &str) -> Result<()> {
        let plan = load_plan(&self.plan_dir)?;
        for job in plan.jobs() {
            if job.depends_on.iter().any(|d| d == old_filename) {
                let updated: Vec<String> = job
                    .depends_on
                    .iter()
                    .map(|d| if d == old_filename { new_filename.to_string() } else { d.clone() })
                    .collect();
                self.update_dependencies(&job.filename, updated)?;
            }
        }
        Ok(())
    }

    pub fn append_job(&self, filename: &str, contents: &str) -> Result<()> {
        let path = self.path_for(filename);
        frontmatter::write_atomic(&path, contents)?;
        let job = frontmatter::parse(filename, contents)?;
        self.observer.emit(ObserverEvent::JobAdded { job_id: job.id });
        Ok(())
    }

    pub fn remove_job(&self, filename: &str) -> Result<()> {
        self.with_lock(filename, || {
            let path = self.path_for(filename);
            let contents = std::fs::read_to_string(&path)
                .map_err(|source| StorageError::Io { path: path.clone(), source })?;
            let job = frontmatter::parse(filename, &contents)?;
            std::fs::remove_file(&path)
                .map_err(|source| StorageError::Io { path: path.clone(), source })?;
            self.observer.emit(ObserverEvent::JobRemoved { job_id: job.id });
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "plan_loader_tests.rs"]
mod tests;
