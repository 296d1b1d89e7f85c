use std::sync::Arc;

use aide_graph::{AssistantGraph, AssistantOutput};
use aide_llm::ChatClient;
use aide_tools::FunctionTool;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::assistant::Assistant;

#[derive(Deserialize, JsonSchema)]
struct AssistantToolArgs {
    /// The question or task to hand to the assistant
    input: String,
}

/// Expose an assistant as a single callable tool of another assistant.
///
/// The wrapped assistant runs its own orchestration loop with no thread
/// context (empty history, nothing persisted). A failing sub-assistant
/// degrades to an error-content tool result in the parent loop; it never
/// crashes the parent.
pub fn assistant_tool(
    assistant: Arc<dyn Assistant>,
    llm: Arc<dyn ChatClient>,
    description: impl Into<String>,
) -> FunctionTool {
    let name = assistant.id().to_string();
    FunctionTool::new::<AssistantToolArgs, _, _>(
        name,
        description,
        move |args: AssistantToolArgs| {
            let assistant = Arc::clone(&assistant);
            let llm = Arc::clone(&llm);
            async move {
                let mut builder = AssistantGraph::builder()
                    .llm_client(llm)
                    .toolset(assistant.tools())
                    .config(assistant.agent_config());
                if let Some(retriever) = assistant.retriever() {
                    builder = builder.retriever(retriever);
                }
                let graph = builder.build()?;

                let outcome = graph.invoke(&args.input).await?;
                Ok(match outcome.output {
                    AssistantOutput::Text(text) => text,
                    AssistantOutput::Structured(value) => value.to_string(),
                })
            }
        },
    )
}
