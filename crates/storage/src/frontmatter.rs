// SPDX-License-Identifier: MIT

//! The Frontmatter Codec (spec.md §4.1): `---`-delimited YAML header plus a
//! free-form Markdown body. `serialize` emits keys in a canonical order so
//! that diffs across runs stay stable; `patch` rewrites only the
//! frontmatter, preserving the body byte-for-byte, via write-to-temp +
//! rename.

use crate::error::{Result, StorageError};
use oj_core::job::{InlineCategory, InlinePolicy, Job, JobId, JobStatus, JobType};
use serde_yaml::{Mapping, Value};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

const DELIM: &str = "---";

/// Separator written between the closing `---` and the body for jobs that
/// didn't come from an on-disk parse (freshly constructed in memory), and
/// for a `parse` call against content with no frontmatter to begin with.
pub const DEFAULT_BODY_SEPARATOR: &str = "\n\n";

/// Derive a stable id from a filename for hand-authored files that omit
/// `id`. Must be deterministic across repeated parses of the same
/// unmodified file: callers (e.g. the Session Registry) key off `Job::id`
/// across plan reloads, and `DefaultHasher`'s keys are fixed, so the same
/// filename always hashes to the same id within and across processes.
fn stable_id_for_filename(filename: &str) -> JobId {
    let mut hasher = DefaultHasher::new();
    filename.hash(&mut hasher);
    JobId::from_string(format!("{}{:019x}", JobId::PREFIX, hasher.finish()))
}

/// Split a raw file into (frontmatter YAML, body). A file with no leading
/// `---` line decodes as empty frontmatter and the whole content as body.
pub fn split(contents: &str) -> (Option<&str>, &str) {
    match split_with_separator(contents) {
        Some((yaml, _separator, body)) => (Some(yaml), body),
        None => (None, contents),
    }
}

/// Like [`split`], but also reports the exact run of blank-line bytes
/// between the closing `---` and the body, so a round trip through
/// [`parse`]/[`serialize`] can reproduce it verbatim instead of
/// normalizing every file to exactly one blank line (spec.md §4.1 body
/// byte-for-byte preservation).
fn split_with_separator(contents: &str) -> Option<(&str, &str, &str)> {
    let rest = contents.strip_prefix(DELIM)?;
    // Leading delimiter must start its own line.
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))?;
    let end = find_closing_delim(rest)?;
    let (yaml, after) = rest.split_at(end);
    let after = after
        .strip_prefix(DELIM)
        .and_then(|b| b.strip_prefix('\n').or_else(|| b.strip_prefix("\r\n")).or(Some(b)))
        .unwrap_or(after);
    let body = after.trim_start_matches(['\n', '\r']);
    let separator = &after[..after.len() - body.len()];
    Some((yaml, separator, body))
}

fn find_closing_delim(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == DELIM {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Parse one job file's contents into a [`Job`]. `filename` is the file's
/// name relative to the plan directory, used as the job's identity when the
/// frontmatter omits `id` (a freshly hand-authored file).
pub fn parse(filename: &str, contents: &str) -> Result<Job> {
    let (yaml, body_separator, body) = match split_with_separator(contents) {
        Some((yaml, separator, body)) => (Some(yaml), separator.to_string(), body),
        None => (None, DEFAULT_BODY_SEPARATOR.to_string(), contents),
    };
    let mapping: Mapping = match yaml {
        Some(y) if !y.trim().is_empty() => serde_yaml::from_str(y).map_err(|e| {
            StorageError::MalformedFrontmatter { filename: filename.to_string(), reason: e.to_string() }
        })?,
        _ => Mapping::new(),
    };

    let get_str = |key: &str| -> Option<String> {
        mapping.get(Value::String(key.to_string())).and_then(|v| v.as_str()).map(str::to_string)
    };
    let get_str_list = |key: &str| -> Vec<String> {
        mapping
            .get(Value::String(key.to_string()))
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    };
    let get_bool = |key: &str| -> bool {
        mapping.get(Value::String(key.to_string())).and_then(Value::as_bool).unwrap_or(false)
    };

    let id = match get_str("id") {
        Some(s) => JobId::from_string(s),
        None => stable_id_for_filename(filename),
    };
    let job_type = get_str("type")
        .ok_or_else(|| StorageError::MalformedFrontmatter {
            filename: filename.to_string(),
            reason: "missing required field `type`".to_string(),
        })?
        .parse::<JobType>()
        .map_err(|reason| StorageError::MalformedFrontmatter { filename: filename.to_string(), reason })?;
    let status = get_str("status")
        .map(|s| s.parse::<JobStatus>())
        .transpose()
        .map_err(|reason| StorageError::MalformedFrontmatter { filename: filename.to_string(), reason })?
        .unwrap_or_default();

    let inline = parse_inline(&mapping);

    Ok(Job {
        id,
        filename: filename.to_string(),
        title: get_str("title").unwrap_or_default(),
        status,
        job_type,
        depends_on: get_str_list("depends_on"),
        model: get_str("model"),
        template: get_str("template"),
        worktree: get_str("worktree"),
        include: get_str_list("include"),
        inline,
        prepend_dependencies: get_bool("prepend_dependencies"),
        agent_continue: get_bool("agent_continue"),
        generate_plan_from: get_bool("generate_plan_from"),
        rules_file: get_str("rules_file"),
        created_at: get_str("created_at"),
        updated_at: get_str("updated_at"),
        completed_at: get_str("completed_at"),
        duration: get_str("duration"),
        summary: get_str("summary"),
        body: body.to_string(),
        body_separator,
        has_dangling_dependency: false,
    })
}

fn parse_inline(mapping: &Mapping) -> InlinePolicy {
    match mapping.get(Value::String("inline".to_string())) {
        Some(Value::String(s)) if s == "all" => InlinePolicy { all: true, categories: vec![] },
        Some(Value::String(s)) if s == "none" => InlinePolicy::default(),
        Some(Value::Sequence(seq)) => {
            let categories = seq
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(|s| match s {
                    "dependencies" => Some(InlineCategory::Dependencies),
                    "include" => Some(InlineCategory::Include),
                    "context" => Some(InlineCategory::Context),
                    _ => None,
                })
                .collect();
            InlinePolicy { all: false, categories }
        }
        _ => InlinePolicy::default(),
    }
}

fn inline_value(policy: &InlinePolicy) -> Option<Value> {
    if policy.all {
        return Some(Value::String("all".to_string()));
    }
    if policy.categories.is_empty() {
        return None;
    }
    let seq = policy
        .categories
        .iter()
        .map(|c| {
            Value::String(
                match c {
                    InlineCategory::Dependencies => "dependencies",
                    InlineCategory::Include => "include",
                    InlineCategory::Context => "context",
                }
                .to_string(),
            )
        })
        .collect();
    Some(Value::Sequence(seq))
}

/// Render a job back to full file contents: frontmatter block + body.
/// Keys are grouped identity, execution, context, timestamps, then any
/// remaining field alphabetically, matching spec.md §4.1.
pub fn serialize(job: &Job) -> String {
    let mut map = Mapping::new();
    let mut set = |key: &str, value: Value| {
        map.insert(Value::String(key.to_string()), value);
    };

    // identity
    set("id", Value::String(job.id.to_string()));
    set("title", Value::String(job.title.clone()));
    set("type", Value::String(job.job_type.to_string()));

    // execution
    set("status", Value::String(job.status.to_string()));
    if !job.depends_on.is_empty() {
        set("depends_on", string_seq(&job.depends_on));
    }
    if let Some(m) = &job.model {
        set("model", Value::String(m.clone()));
    }
    if let Some(t) = &job.template {
        set("template", Value::String(t.clone()));
    }
    if let Some(w) = &job.worktree {
        set("worktree", Value::String(w.clone()));
    }

    // context
    if !job.include.is_empty() {
        set("include", string_seq(&job.include));
    }
    if let Some(v) = inline_value(&job.inline) {
        set("inline", v);
    }
    if job.prepend_dependencies {
        set("prepend_dependencies", Value::Bool(true));
    }
    if job.agent_continue {
        set("agent_continue", Value::Bool(true));
    }
    if job.generate_plan_from {
        set("generate_plan_from", Value::Bool(true));
    }
    if let Some(r) = &job.rules_file {
        set("rules_file", Value::String(r.clone()));
    }

    // timestamps
    if let Some(v) = &job.created_at {
        set("created_at", Value::String(v.clone()));
    }
    if let Some(v) = &job.updated_at {
        set("updated_at", Value::String(v.clone()));
    }
    if let Some(v) = &job.completed_at {
        set("completed_at", Value::String(v.clone()));
    }
    if let Some(v) = &job.duration {
        set("duration", Value::String(v.clone()));
    }

    // remainder, alphabetical
    if let Some(v) = &job.summary {
        set("summary", Value::String(v.clone()));
    }

    let yaml = serde_yaml::to_string(&Value::Mapping(map)).unwrap_or_default();
    let mut out = String::with_capacity(yaml.len() + job.body.len() + 16);
    out.push_str(DELIM);
    out.push('\n');
    out.push_str(&yaml);
    out.push_str(DELIM);
    out.push_str(&job.body_separator);
    out.push_str(&job.body);
    out
}

fn string_seq(items: &[String]) -> Value {
    Value::Sequence(items.iter().map(|s| Value::String(s.clone())).collect())
}

/// Atomically rewrite a job's file: re-read, apply `mutate`, serialize,
/// write-to-temp + rename. Returns the patched job.
pub fn patch(path: &Path, mutate: impl FnOnce(&mut Job)) -> Result<Job> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let contents = std::fs::read_to_string(path)
        .map_err(|source| StorageError::Io { path: path.to_path_buf(), source })?;
    let mut job = parse(&filename, &contents)?;
    mutate(&mut job);
    let rendered = serialize(&job);
    write_atomic(path, &rendered)?;
    Ok(job)
}

/// Write `contents` to `path` atomically: write to a sibling temp file then
/// rename over the target, so readers never observe a partial write.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = path.with_extension(match path.extension() {
        Some(ext) => format!("{}.tmp", ext.to_string_lossy()),
        None => "tmp".to_string(),
    });
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
    }
    std::fs::write(&tmp_path, contents)
        .map_err(|source| StorageError::Io { path: tmp_path.clone(), source })?;
    std::fs::rename(&tmp_path, path)
        .map_err(|source| StorageError::Io { path: path.to_path_buf(), source })?;
    Ok(())
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
