use aide_llm::{ChatMessage, ToolCall};

/// Running state of one assistant invocation
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    /// The full in-memory trace, starting with the system instructions
    pub messages: Vec<ChatMessage>,

    /// Prior turns loaded from the store before this invocation
    pub history: Vec<ChatMessage>,

    /// Index of the first message the persistence hook has not examined yet
    pub(crate) persisted: usize,
}

impl AgentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn has_pending_tool_calls(&self) -> bool {
        self.last_message()
            .map(|m| m.has_tool_calls())
            .unwrap_or(false)
    }

    pub fn pending_tool_calls(&self) -> Vec<ToolCall> {
        self.last_message()
            .and_then(|m| m.tool_calls())
            .map(|calls| calls.to_vec())
            .unwrap_or_default()
    }
}
