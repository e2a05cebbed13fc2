//! Tool call extraction from model output.
//!
//! The model signals tool usage by emitting a JSON object with a
//! `tool_calls` array somewhere in its reply:
//!
//! ```json
//! {
//!   "reasoning": "I need the policy text first",
//!   "tool_calls": [
//!     {"tool_name": "search_documents", "arguments": {"query": "refund policy"}}
//!   ]
//! }
//! ```
//!
//! Anything else, including prose, malformed JSON, or an empty array, is
//! treated as a final answer.

use crate::tool::entities::ToolCall;
use serde_json::Value;

/// Keys accepted for the tool name of one entry, in priority order
const NAME_KEYS: [&str; 3] = ["tool_name", "name", "tool"];
/// Keys accepted for the arguments of one entry, in priority order
const ARGUMENT_KEYS: [&str; 3] = ["arguments", "args", "parameters"];

/// Parse tool calls from a model reply.
///
/// Looks at the span between the first `{` and the last `}`. Returns an
/// empty vector when no usable calls are found, which the caller treats as
/// "this reply is the final answer".
pub fn parse_tool_calls(response: &str) -> Vec<ToolCall> {
    let Some(candidate) = json_span(response) else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(json) => parse_tool_calls_json(&json),
        Err(_) => Vec::new(),
    }
}

/// Parse tool calls from an already-decoded JSON value.
pub fn parse_tool_calls_json(json: &Value) -> Vec<ToolCall> {
    let Some(entries) = json.get("tool_calls").and_then(Value::as_array) else {
        return Vec::new();
    };

    let reasoning = json
        .get("reasoning")
        .and_then(Value::as_str)
        .filter(|r| !r.trim().is_empty());

    entries
        .iter()
        .filter_map(|entry| {
            let name = NAME_KEYS
                .iter()
                .find_map(|key| entry.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|n| !n.is_empty())?;

            let mut call = ToolCall::new(name);

            if let Some(args) = ARGUMENT_KEYS
                .iter()
                .find_map(|key| entry.get(*key).and_then(Value::as_object))
            {
                for (key, value) in args {
                    call = call.with_arg(key, value.clone());
                }
            }

            // Per-entry reasoning wins over the shared one
            let entry_reasoning = entry.get("reasoning").and_then(Value::as_str);
            if let Some(r) = entry_reasoning.or(reasoning) {
                call = call.with_reasoning(r);
            }

            Some(call)
        })
        .collect()
}

/// Whether the reply contains at least one usable tool call
pub fn has_tool_calls(response: &str) -> bool {
    !parse_tool_calls(response).is_empty()
}

fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
