// SPDX-License-Identifier: MIT

//! ChatTurn: the pure-function view of a `chat` job's body.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Llm,
}

crate::simple_display! {
    Speaker {
        User => "user",
        Llm => "llm",
    }
}

/// A directive embedded in a turn as an HTML comment, e.g.
/// `<!-- grove: {"template": "review"} -->`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnDirective {
    pub template: Option<String>,
    pub frozen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub content: String,
    pub directive: Option<TurnDirective>,
}

const USER_MARKER: &str = "### User";
const LLM_MARKER: &str = "### Assistant";
const DIRECTIVE_PREFIX: &str = "<!-- grove:";
const DIRECTIVE_SUFFIX: &str = "-->";

/// Parse a chat job body into its turn list. Pure function of the text: no
/// hidden state is consulted, so re-parsing the same body always yields the
/// same turns.
pub fn parse_turns(body: &str) -> Vec<ChatTurn> {
    let mut turns = Vec::new();
    let mut current: Option<(Speaker, String)> = None;

    for line in body.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim_start() == USER_MARKER {
            flush(&mut turns, current.take());
            current = Some((Speaker::User, String::new()));
            continue;
        }
        if trimmed.trim_start() == LLM_MARKER {
            flush(&mut turns, current.take());
            current = Some((Speaker::Llm, String::new()));
            continue;
        }
        if let Some((_, buf)) = current.as_mut() {
            if !buf.is_empty() {
                buf.push('\n');
            }
            buf.push_str(line);
        }
    }
    flush(&mut turns, current.take());
    turns
}

fn flush(turns: &mut Vec<ChatTurn>, pending: Option<(Speaker, String)>) {
    if let Some((speaker, raw)) = pending {
        let content = raw.trim().to_string();
        let (content, directive) = extract_directive(&content);
        turns.push(ChatTurn { speaker, content, directive });
    }
}

fn extract_directive(content: &str) -> (String, Option<TurnDirective>) {
    if let Some(start) = content.rfind(DIRECTIVE_PREFIX) {
        if let Some(end_rel) = content[start..].find(DIRECTIVE_SUFFIX) {
            let end = start + end_rel + DIRECTIVE_SUFFIX.len();
            let json_part = content[start + DIRECTIVE_PREFIX.len()..start + end_rel].trim();
            let directive = serde_json::from_str::<TurnDirective>(json_part).ok();
            let remaining = format!("{}{}", &content[..start], &content[end..]);
            return (remaining.trim().to_string(), directive);
        }
    }
    (content.to_string(), None)
}

/// Render a single turn back to Markdown (used when appending an LLM reply).
pub fn render_turn(turn: &ChatTurn) -> String {
    let marker = match turn.speaker {
        Speaker::User => USER_MARKER,
        Speaker::Llm => LLM_MARKER,
    };
    let mut out = format!("{marker}\n\n{}", turn.content);
    if let Some(directive) = &turn.directive {
        if let Ok(json) = serde_json::to_string(directive) {
            out.push_str(&format!("\n\n{DIRECTIVE_PREFIX} {json} {DIRECTIVE_SUFFIX}"));
        }
    }
    out
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
