//! Action parsing — raw model text to structured intent.
//!
//! Two wire protocols are supported:
//!
//! 1. The line-oriented ReAct protocol: an optional `Thought: ...` line and
//!    an `Action: ...` line whose payload is either `Finish[answer]` or
//!    `tool_name[argument]`.
//! 2. Inline tagged calls: `[TOOL_CALL:name:params]`, any number per
//!    response, extracted in textual order with the tags stripped from the
//!    surrounding text.
//!
//! All functions here are total: malformed input yields [`Intent::Unparsed`]
//! (or an empty call list), never a panic or an error. Whether that is
//! retried or aborted is the loop's decision.

use reagent_core::tool::ToolInput;
use std::collections::HashMap;

/// The structured interpretation of one model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// A request to invoke a tool with the raw bracketed argument.
    Invoke { name: String, argument: String },
    /// The final answer; terminates the run.
    Finish { answer: String },
    /// No recognizable action. Recoverable — not an error.
    Unparsed,
}

/// A parsed response: the optional thought (informational only) plus the
/// control-affecting intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub thought: Option<String>,
    pub intent: Intent,
}

/// One `[TOOL_CALL:name:params]` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineCall {
    pub name: String,
    pub params: String,
}

/// Parse a response in the line-oriented ReAct protocol.
pub fn parse_response(text: &str) -> ParsedResponse {
    let thought = capture_line(text, "Thought: ");
    let intent = match capture_line(text, "Action: ") {
        Some(action) => parse_action(&action),
        None => Intent::Unparsed,
    };
    ParsedResponse { thought, intent }
}

/// Capture the remainder of the first line containing `label`.
fn capture_line(text: &str, label: &str) -> Option<String> {
    text.lines().find_map(|line| {
        line.find(label)
            .map(|pos| line[pos + label.len()..].trim().to_string())
    })
}

/// Parse an action payload: `Finish[answer]` first, then `name[argument]`.
///
/// The argument spans from the first `[` to the *last* `]`, so nested
/// brackets inside the argument survive; text after the last `]` is
/// ignored. Anything not matching either grammar is `Unparsed`.
fn parse_action(action: &str) -> Intent {
    let Some(open) = action.find('[') else {
        return Intent::Unparsed;
    };
    let name = &action[..open];
    if !is_identifier(name) {
        return Intent::Unparsed;
    }
    let rest = &action[open + 1..];
    let Some(close) = rest.rfind(']') else {
        return Intent::Unparsed;
    };
    let argument = rest[..close].to_string();

    if name == "Finish" {
        Intent::Finish { answer: argument }
    } else {
        Intent::Invoke {
            name: name.to_string(),
            argument,
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Extract every `[TOOL_CALL:name:params]` tag, in textual order, along
/// with the residual text with the tags removed (the clean transcript).
///
/// A tag is well-formed when the name contains no `:` and the params no
/// `]`, and both are non-empty after trimming. Malformed tags are left in
/// place untouched.
pub fn parse_inline_calls(text: &str) -> (Vec<InlineCall>, String) {
    const OPEN: &str = "[TOOL_CALL:";

    let mut calls = Vec::new();
    let mut residual = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let parsed = after_open.find(':').and_then(|sep| {
            let name = &after_open[..sep];
            // a ']' before the separator means the tag closed without params
            if name.contains(']') {
                return None;
            }
            let close = after_open[sep + 1..].find(']')?;
            let params = &after_open[sep + 1..sep + 1 + close];
            if name.trim().is_empty() || params.trim().is_empty() {
                return None;
            }
            Some((name.trim().to_string(), params.trim().to_string(), sep + 1 + close + 1))
        });

        match parsed {
            Some((name, params, consumed)) => {
                residual.push_str(&rest[..start]);
                calls.push(InlineCall { name, params });
                rest = &rest[start + OPEN.len() + consumed..];
            }
            None => {
                // not a well-formed tag; keep the text and move past it
                residual.push_str(&rest[..start + OPEN.len()]);
                rest = &rest[start + OPEN.len()..];
            }
        }
    }
    residual.push_str(rest);

    (calls, residual)
}

/// Decode raw parameter text into a [`ToolInput`].
///
/// Heuristic, kept for protocol compatibility: text containing `=` is
/// split on `,` (when present) into trimmed `key=value` pairs; otherwise
/// the whole text is wrapped under a tool-specific default key. The
/// heuristic cannot distinguish a literal `=` or `,` inside argument
/// content from a delimiter — there is no escaping in this protocol, so
/// such arguments will be mis-split.
pub fn decode_params(tool_name: &str, raw: &str) -> ToolInput {
    if raw.contains('=') {
        let mut map = HashMap::new();
        if raw.contains(',') {
            for pair in raw.split(',') {
                if let Some((key, value)) = pair.split_once('=') {
                    map.insert(key.trim().to_string(), value.trim().to_string());
                }
            }
        } else if let Some((key, value)) = raw.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
        return ToolInput::Params(map);
    }

    let default_key = match tool_name {
        "search" => "query",
        "memory" => {
            // memory defaults to a search action over the bare text
            let mut map = HashMap::new();
            map.insert("action".to_string(), "search".to_string());
            map.insert("query".to_string(), raw.trim().to_string());
            return ToolInput::Params(map);
        }
        _ => "input",
    };
    let mut map = HashMap::new();
    map.insert(default_key.to_string(), raw.trim().to_string());
    ToolInput::Params(map)
}
