// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::io::Write;

use super::{format_or_json, handle_list, OutputFormat};

#[derive(Debug, Clone, Serialize)]
struct FakeEntry {
    name: String,
    detail: String,
}

#[test]
fn handle_list_json_includes_all_fields() {
    let entries = vec![
        FakeEntry { name: "a".into(), detail: "d1".into() },
        FakeEntry { name: "b".into(), detail: "d2".into() },
    ];

    let result = handle_list(OutputFormat::Json, &entries, "none", |items, out| {
        for e in items {
            writeln!(out, "{}", e.name).unwrap();
        }
    });
    assert!(result.is_ok());
}

#[test]
fn handle_list_text_empty_prints_message() {
    let entries: Vec<FakeEntry> = vec![];
    let result = handle_list(OutputFormat::Text, &entries, "no entries found", |_, _| {
        panic!("render_text should not run for an empty list");
    });
    assert!(result.is_ok());
}

#[test]
fn handle_list_text_renders_entries() {
    let entries = vec![FakeEntry { name: "x".into(), detail: "y".into() }];
    let mut rendered = false;
    let result = handle_list(OutputFormat::Text, &entries, "empty", |items, _| {
        assert_eq!(items.len(), 1);
        rendered = true;
    });
    assert!(result.is_ok());
    assert!(rendered);
}

#[test]
fn format_or_json_json_path_does_not_call_text_fn() {
    let data = FakeEntry { name: "a".into(), detail: "b".into() };
    let result = format_or_json(OutputFormat::Json, &data, || {
        panic!("text_fn should not run for json format");
    });
    assert!(result.is_ok());
}

#[test]
fn format_or_json_text_path_calls_text_fn() {
    let data = FakeEntry { name: "a".into(), detail: "b".into() };
    let mut called = false;
    let result = format_or_json(OutputFormat::Text, &data, || called = true);
    assert!(result.is_ok());
    assert!(called);
}
