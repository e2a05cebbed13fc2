//! Conversation entities

use crate::tool::entities::ToolCall;
use crate::tool::value_objects::ToolResult;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload of a message: exactly one of these per turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageBody {
    Content(String),
    ToolCall(ToolCall),
    ToolResult(ToolResult),
}

/// One turn in the conversation (Entity)
///
/// The ordered sequence of messages is the conversation's ground truth.
/// Constructors pair roles with bodies: `assistant` turns carry content or a
/// tool call, `tool` turns carry a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub role: Role,
    pub body: MessageBody,
}

impl AgentMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            body: MessageBody::Content(content.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            body: MessageBody::Content(content.into()),
        }
    }

    pub fn tool_call(call: ToolCall) -> Self {
        Self {
            role: Role::Assistant,
            body: MessageBody::ToolCall(call),
        }
    }

    pub fn tool_result(result: ToolResult) -> Self {
        Self {
            role: Role::Tool,
            body: MessageBody::ToolResult(result),
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Content(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_tool_call(&self) -> Option<&ToolCall> {
        match &self.body {
            MessageBody::ToolCall(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_tool_result(&self) -> Option<&ToolResult> {
        match &self.body {
            MessageBody::ToolResult(result) => Some(result),
            _ => None,
        }
    }

    /// Number of characters this turn contributes to the transcript
    pub fn char_len(&self) -> usize {
        match &self.body {
            MessageBody::Content(c) => c.chars().count(),
            MessageBody::ToolCall(call) => {
                call.tool_name.chars().count()
                    + serde_json::to_string(call.arguments())
                        .map(|s| s.chars().count())
                        .unwrap_or(0)
            }
            MessageBody::ToolResult(result) => result.display_content().chars().count(),
        }
    }
}
