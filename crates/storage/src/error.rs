// SPDX-License-Identifier: MIT

//! Storage-level error kinds (spec.md §7: ErrMalformedFrontmatter,
//! ErrDuplicateID, ErrDanglingDependency surface here; ErrCycle surfaces
//! from `oj-core::graph` once the plan is loaded).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("malformed frontmatter in {filename}: {reason}")]
    MalformedFrontmatter { filename: String, reason: String },

    #[error("duplicate job id {id} (in {first} and {second})")]
    DuplicateId { id: String, first: String, second: String },

    #[error("duplicate filename {0}")]
    DuplicateFilename(String),

    #[error("job {0} not found in plan")]
    JobNotFound(String),

    #[error("plan directory does not exist: {0}")]
    PlanNotFound(PathBuf),

    #[error(transparent)]
    Plan(#[from] oj_core::PlanError),

    #[error("session for job {0} already registered")]
    SessionAlreadyRegistered(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
