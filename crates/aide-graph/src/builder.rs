use std::sync::Arc;

use aide_llm::{ChatClient, Retriever};
use aide_tools::{ToolDispatcher, Toolset};

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::graph::{AssistantGraph, PersistenceContext};

/// Builder for constructing an [`AssistantGraph`] with optional components
pub struct AssistantGraphBuilder {
    llm: Option<Arc<dyn ChatClient>>,
    toolset: Toolset,
    retriever: Option<Arc<dyn Retriever>>,
    config: Option<AgentConfig>,
    persistence: Option<PersistenceContext>,
}

impl AssistantGraphBuilder {
    pub fn new() -> Self {
        Self {
            llm: None,
            toolset: Toolset::new(),
            retriever: None,
            config: None,
            persistence: None,
        }
    }

    /// Set the LLM client
    pub fn llm_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.llm = Some(client);
        self
    }

    /// Set the toolset bound to this invocation
    pub fn toolset(mut self, toolset: Toolset) -> Self {
        self.toolset = toolset;
        self
    }

    /// Set the retriever used when retrieval-augmentation is enabled
    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Set the agent configuration
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Bind the invocation to a persisted thread
    pub fn persistence(mut self, persistence: PersistenceContext) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Build the graph, failing fast on configuration errors.
    pub fn build(self) -> Result<AssistantGraph, AgentError> {
        let llm = self
            .llm
            .ok_or_else(|| AgentError::Misconfigured("an LLM client is required".to_string()))?;
        let config = self.config.ok_or_else(|| {
            AgentError::Misconfigured("an agent configuration is required".to_string())
        })?;

        if config.has_rag {
            if !config
                .instructions
                .contains(crate::config::CONTEXT_PLACEHOLDER)
            {
                return Err(AgentError::Misconfigured(format!(
                    "retrieval-augmented instructions must contain the {} placeholder",
                    crate::config::CONTEXT_PLACEHOLDER
                )));
            }
            if self.retriever.is_none() {
                return Err(AgentError::Misconfigured(
                    "retrieval-augmentation requires a retriever".to_string(),
                ));
            }
        }

        let dispatcher = ToolDispatcher::new(config.tool_max_concurrency);
        Ok(AssistantGraph {
            llm,
            toolset: self.toolset,
            dispatcher,
            retriever: self.retriever,
            config,
            persistence: self.persistence,
        })
    }
}

impl Default for AssistantGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
