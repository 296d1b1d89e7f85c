use aide_llm::ChatMessage;
use serde_json::Value;

/// Final answer of one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantOutput {
    Text(String),
    /// Value conforming to the configured structured-output schema
    Structured(Value),
}

impl AssistantOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Text(_) => None,
            Self::Structured(value) => Some(value),
        }
    }
}

/// Everything one invocation produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The raw user input that started the invocation
    pub input: String,

    /// Prior turns that were loaded from the store
    pub history: Vec<ChatMessage>,

    /// The full in-memory trace, including the system instructions
    pub messages: Vec<ChatMessage>,

    pub output: AssistantOutput,
}
