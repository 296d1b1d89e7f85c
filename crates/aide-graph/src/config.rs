use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder the instructions must contain when retrieval-augmentation is
/// enabled; retrieved context is spliced in its place.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Declarative configuration for one assistant invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// System prompt template
    pub instructions: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Retrieval-augmentation: splice retrieved context into the prompt
    pub has_rag: bool,
    /// JSON Schema the final answer must conform to, if any
    pub structured_output: Option<Value>,
    /// Upper bound on concurrent tool calls within one batch
    pub tool_max_concurrency: usize,
    /// Separator between retrieved documents in the context block
    pub document_separator: String,
    /// Guardrail against a runaway agent/tools cycle
    pub max_iterations: usize,
}

impl AgentConfig {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            model: "gpt-4o".to_string(),
            temperature: Some(1.0),
            max_tokens: None,
            has_rag: false,
            structured_output: None,
            tool_max_concurrency: 1,
            document_separator: "\n\n".to_string(),
            max_iterations: 50,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn with_rag(mut self, enabled: bool) -> Self {
        self.has_rag = enabled;
        self
    }

    pub fn with_structured_output(mut self, schema: Value) -> Self {
        self.structured_output = Some(schema);
        self
    }

    pub fn with_tool_max_concurrency(mut self, max: usize) -> Self {
        self.tool_max_concurrency = max.max(1);
        self
    }

    pub fn with_document_separator(mut self, separator: impl Into<String>) -> Self {
        self.document_separator = separator.into();
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }
}
