// SPDX-License-Identifier: MIT

//! Emergent plan expansion (spec.md §4.9 step f.ii, scenario 6): a
//! `oneshot` job whose `generate_plan_from` is set may answer with one or
//! more concatenated `---`-delimited frontmatter blocks instead of (or in
//! addition to) prose. Each well-formed block becomes a new sibling job
//! file, numbered sequentially from the plan's current highest numeric
//! filename prefix.

use oj_core::job::Job;
use oj_storage::frontmatter;

/// Split `text` into the `---`-delimited blocks it contains, in order.
/// A block runs from an opening `---` line to the next `---` line (its
/// frontmatter) through to the line before the following `---` (its body),
/// or to the end of `text` if there is none. Non-block text interleaved
/// between or around blocks is ignored.
fn scan_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut delim_positions: Vec<usize> = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            delim_positions.push(offset);
        }
        offset += line.len();
    }

    // Pair consecutive delimiters: (open, close) frontmatter fence, then the
    // block body runs until the next open delimiter (or text end).
    let mut i = 0;
    while i + 1 < delim_positions.len() {
        let open = delim_positions[i];
        // The block's content starts at `open` and is allowed to absorb
        // everything up to (but not including) the next open delimiter,
        // so its body can contain arbitrary prose after the closing fence.
        let end = delim_positions.get(i + 2).copied().unwrap_or(text.len());
        blocks.push(text[open..end].trim_end());
        i += 2;
    }
    blocks
}

/// Parse every well-formed frontmatter block out of a oneshot job's output.
/// Malformed blocks are skipped (and logged) rather than failing the whole
/// job — spec.md does not define a failure mode for a partially-garbled
/// emergent-plan response.
pub fn extract_new_jobs(output: &str, next_filename: impl Fn(usize) -> String) -> Vec<Job> {
    let mut jobs = Vec::new();
    for (idx, block) in scan_blocks(output).into_iter().enumerate() {
        let filename = next_filename(idx);
        match frontmatter::parse(&filename, block) {
            Ok(job) => jobs.push(job),
            Err(err) => {
                tracing::warn!(%filename, %err, "skipping malformed emergent-plan block");
            }
        }
    }
    jobs
}

/// The next available numeric filename prefix for a plan, one past the
/// current highest leading-digit-run among its job filenames. Unprefixed
/// filenames don't contribute and default the search floor to zero.
pub fn next_numeric_prefix(filenames: impl Iterator<Item = impl AsRef<str>>) -> usize {
    filenames
        .filter_map(|f| leading_digits(f.as_ref()))
        .max()
        .map(|max| max + 1)
        .unwrap_or(1)
}

fn leading_digits(filename: &str) -> Option<usize> {
    let digits: String = filename.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Render a fresh numeric-prefixed filename, e.g. `07-generated.md`, reusing
/// the source job's filename suffix (sans its own numeric prefix) as a stem
/// so generated siblings read naturally next to the job that spawned them.
pub fn filename_for(prefix: usize, source_filename: &str, index: usize) -> String {
    let stem = source_filename
        .trim_end_matches(".md")
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '-');
    let stem = if stem.is_empty() { "generated" } else { stem };
    format!("{prefix:02}-{stem}-{index}.md")
}

#[cfg(test)]
#[path = "emergent_tests.rs"]
mod tests;
