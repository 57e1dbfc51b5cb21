// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn parses_alternating_turns() {
    let body = "### User\n\nhello\n\n### Assistant\n\nhi there\n";
    let turns = parse_turns(body);
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].speaker, Speaker::User);
    assert_eq!(turns[0].content, "hello");
    assert_eq!(turns[1].speaker, Speaker::Llm);
    assert_eq!(turns[1].content, "hi there");
}

#[test]
fn last_turn_user_means_reply_pending() {
    let body = "### User\n\nhello\n";
    let turns = parse_turns(body);
    assert_eq!(turns.last().unwrap().speaker, Speaker::User);
}

#[test]
fn directive_extracted_from_llm_turn() {
    let body = "### Assistant\n\nhi\n\n<!-- grove: {\"template\":\"review\"} -->";
    let turns = parse_turns(body);
    assert_eq!(turns[0].content, "hi");
    assert_eq!(turns[0].directive.as_ref().unwrap().template.as_deref(), Some("review"));
}

#[test]
fn empty_body_has_no_turns() {
    assert!(parse_turns("").is_empty());
}

#[test]
fn render_turn_round_trips_through_parse() {
    let turn = ChatTurn { speaker: Speaker::User, content: "hi".into(), directive: None };
    let rendered = render_turn(&turn);
    let parsed = parse_turns(&rendered);
    assert_eq!(parsed[0].content, "hi");
    assert_eq!(parsed[0].speaker, Speaker::User);
}
