// SPDX-License-Identifier: MIT

use super::*;

const TWO_BLOCKS: &str = "\
Some lead-in prose the model added.

---
id: job-aaaaaaaaaaaaaaaaaaaaaaaaaa
title: Write the tests
type: oneshot
status: pending
depends_on: []
---

Write tests for the new parser.

---
id: job-bbbbbbbbbbbbbbbbbbbbbbbbbb
title: Wire it up
type: oneshot
status: pending
depends_on: [job-aaaaaaaaaaaaaaaaaaaaaaaaaa]
---

Wire the parser into the loader.
";

#[test]
fn extracts_two_well_formed_blocks() {
    let jobs = extract_new_jobs(TWO_BLOCKS, |i| format!("{:02}-generated-{i}.md", 7 + i));
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].title, "Write the tests");
    assert!(jobs[0].body.contains("Write tests for the new parser."));
    assert_eq!(jobs[1].title, "Wire it up");
    assert_eq!(jobs[1].depends_on, vec!["job-aaaaaaaaaaaaaaaaaaaaaaaaaa".to_string()]);
}

#[test]
fn malformed_block_is_skipped_not_fatal() {
    let text = "---\ntitle: missing type\n---\n\nbody\n";
    let jobs = extract_new_jobs(text, |i| format!("{i}.md"));
    assert!(jobs.is_empty());
}

#[test]
fn no_blocks_yields_empty() {
    let jobs = extract_new_jobs("just some prose, no frontmatter at all", |i| format!("{i}.md"));
    assert!(jobs.is_empty());
}

#[test]
fn next_numeric_prefix_skips_past_existing_max() {
    let names = vec!["01-first.md", "02-second.md", "07-seventh.md"];
    assert_eq!(next_numeric_prefix(names.into_iter()), 8);
}

#[test]
fn next_numeric_prefix_defaults_to_one_when_unprefixed() {
    let names = vec!["notes.md", "readme.md"];
    assert_eq!(next_numeric_prefix(names.into_iter()), 1);
}

#[test]
fn filename_for_reuses_source_stem() {
    let name = filename_for(7, "03-plan-step.md", 0);
    assert_eq!(name, "07-plan-step-0.md");
}
