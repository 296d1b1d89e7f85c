use serde::{Deserialize, Serialize};

use super::content::Content;
use super::tool::ToolCall;

/// One conversation turn.
///
/// `id` is `None` until the message has been persisted; the store back-fills
/// it once, right after allocating the row, so that the in-memory identity
/// always matches the stored identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub payload: MessagePayload,
}

/// Message payload union, tagged by role (high-level, provider-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum MessagePayload {
    /// System prompt (instructions)
    System { content: Content },

    /// User/Human message
    #[serde(rename = "user")]
    Human { content: Content },

    /// Assistant/AI message
    #[serde(rename = "assistant")]
    Ai {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<Content>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },

    /// Tool result message
    Tool { tool_call_id: String, content: Content },

    /// Escape hatch for roles the other variants do not cover
    Generic { kind: String, content: Content },
}

impl ChatMessage {
    /// Create system message
    pub fn system(content: impl Into<Content>) -> Self {
        Self {
            id: None,
            payload: MessagePayload::System {
                content: content.into(),
            },
        }
    }

    /// Create human message
    pub fn human(content: impl Into<Content>) -> Self {
        Self {
            id: None,
            payload: MessagePayload::Human {
                content: content.into(),
            },
        }
    }

    /// Create AI message with text
    pub fn ai(content: impl Into<Content>) -> Self {
        Self {
            id: None,
            payload: MessagePayload::Ai {
                content: Some(content.into()),
                tool_calls: None,
            },
        }
    }

    /// Create AI message with tool calls
    pub fn ai_with_tools(content: Option<Content>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            id: None,
            payload: MessagePayload::Ai {
                content,
                tool_calls: Some(tool_calls),
            },
        }
    }

    /// Create tool result message
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<Content>) -> Self {
        Self {
            id: None,
            payload: MessagePayload::Tool {
                tool_call_id: tool_call_id.into(),
                content: content.into(),
            },
        }
    }

    /// Create a message with a caller-defined role
    pub fn generic(kind: impl Into<String>, content: impl Into<Content>) -> Self {
        Self {
            id: None,
            payload: MessagePayload::Generic {
                kind: kind.into(),
                content: content.into(),
            },
        }
    }

    /// Get role as string
    pub fn role(&self) -> &str {
        match &self.payload {
            MessagePayload::System { .. } => "system",
            MessagePayload::Human { .. } => "user",
            MessagePayload::Ai { .. } => "assistant",
            MessagePayload::Tool { .. } => "tool",
            MessagePayload::Generic { .. } => "generic",
        }
    }

    /// Get content as plain text, if the payload carries any
    pub fn content_text(&self) -> Option<&str> {
        match &self.payload {
            MessagePayload::System { content }
            | MessagePayload::Human { content }
            | MessagePayload::Tool { content, .. }
            | MessagePayload::Generic { content, .. } => Some(content.as_str()),
            MessagePayload::Ai { content, .. } => content.as_ref().map(|c| c.as_str()),
        }
    }

    /// Tool calls carried by an AI message, if any
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match &self.payload {
            MessagePayload::Ai {
                tool_calls: Some(calls),
                ..
            } => Some(calls),
            _ => None,
        }
    }

    /// True for an AI message that still carries tool calls
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls().map(|c| !c.is_empty()).unwrap_or(false)
    }
}
