use aide_llm::{ChatMessage, ToolCall};
use anyhow::{anyhow, Result};
use futures::StreamExt;

use crate::toolset::Toolset;

/// Executes batches of pending tool calls against a toolset.
///
/// Concurrency is bounded by `max_concurrency` (1 = fully sequential, the
/// default posture for rate-limited downstream services). Calls within a
/// batch may complete in any order internally, but results are reassembled
/// in the order the calls were requested.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    max_concurrency: usize,
}

impl ToolDispatcher {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Execute every call in the batch.
    ///
    /// A failing tool never aborts the batch: its error is converted into an
    /// error-content tool result so the LLM can see what went wrong.
    pub async fn execute(&self, toolset: &Toolset, calls: &[ToolCall]) -> Vec<ChatMessage> {
        let calls: Vec<_> = calls
            .iter()
            .map(|call| self.execute_call(toolset, call))
            .collect();
        futures::stream::iter(calls)
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    async fn execute_call(&self, toolset: &Toolset, call: &ToolCall) -> ChatMessage {
        match self.try_execute(toolset, call).await {
            Ok(content) => {
                tracing::debug!(tool = %call.function.name, call_id = %call.id, "tool call succeeded");
                ChatMessage::tool_result(call.id.clone(), content)
            }
            Err(e) => {
                tracing::warn!(tool = %call.function.name, call_id = %call.id, error = %e, "tool call failed");
                ChatMessage::tool_result(call.id.clone(), format!("Tool execution failed: {e}"))
            }
        }
    }

    async fn try_execute(&self, toolset: &Toolset, call: &ToolCall) -> Result<String> {
        let tool = toolset
            .get(&call.function.name)
            .ok_or_else(|| anyhow!("tool '{}' not found", call.function.name))?;
        let arguments = call
            .arguments_value()
            .map_err(|e| anyhow!("invalid arguments: {e}"))?;
        tool.call(arguments).await
    }
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::new(1)
    }
}
