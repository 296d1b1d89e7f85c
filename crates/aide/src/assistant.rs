use std::sync::Arc;

use aide_graph::AgentConfig;
use aide_llm::Retriever;
use aide_tools::Toolset;
use serde_json::Value;

use crate::permissions::User;

/// Context an assistant instance is bound to at construction time
#[derive(Debug, Clone, Default)]
pub struct AssistantContext {
    pub user: Option<User>,
}

impl AssistantContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: User) -> Self {
        Self { user: Some(user) }
    }
}

/// The declarative bundle describing one assistant.
///
/// Implementations are constructed per invocation by their registered
/// factory, bound to the acting user's context. Tool descriptors are built
/// fresh by `tools()` on every instance, so instances never share mutable
/// schema state.
///
/// Most methods have defaults; a minimal assistant provides `id`, `name`,
/// and `instructions`.
pub trait Assistant: Send + Sync {
    /// Stable identifier, `^[a-zA-Z0-9_-]+$`
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// System prompt. Must contain the `{context}` placeholder when
    /// `has_rag` is enabled.
    fn instructions(&self) -> String;

    fn model(&self) -> &str {
        "gpt-4o"
    }

    fn temperature(&self) -> Option<f32> {
        Some(1.0)
    }

    fn max_tokens(&self) -> Option<u32> {
        None
    }

    /// Enable retrieval-augmentation
    fn has_rag(&self) -> bool {
        false
    }

    /// JSON Schema the final answer must conform to, if any
    fn structured_output(&self) -> Option<Value> {
        None
    }

    /// Upper bound on concurrent tool calls within one batch
    fn tool_max_concurrency(&self) -> usize {
        1
    }

    fn document_separator(&self) -> String {
        "\n\n".to_string()
    }

    /// Build this instance's toolset, in declaration order
    fn tools(&self) -> Toolset {
        Toolset::new()
    }

    /// Retriever backing `has_rag`
    fn retriever(&self) -> Option<Arc<dyn Retriever>> {
        None
    }

    /// Orchestration configuration derived from the declarative bundle
    fn agent_config(&self) -> AgentConfig {
        let mut config = AgentConfig::new(self.instructions())
            .with_model(self.model())
            .with_rag(self.has_rag())
            .with_tool_max_concurrency(self.tool_max_concurrency())
            .with_document_separator(self.document_separator());
        if let Some(temperature) = self.temperature() {
            config = config.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens() {
            config = config.with_max_tokens(max_tokens);
        }
        if let Some(schema) = self.structured_output() {
            config = config.with_structured_output(schema);
        }
        config
    }
}
