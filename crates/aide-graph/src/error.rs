use aide_persist::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Configuration problems: fatal until the assistant is fixed,
    /// never retried.
    #[error("Misconfigured assistant: {0}")]
    Misconfigured(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Provider failures propagate untouched; retries belong to the
    /// LLM-call capability, not to the loop.
    #[error("LLM call failed: {0}")]
    Llm(anyhow::Error),

    #[error("Retriever call failed: {0}")]
    Retriever(anyhow::Error),

    #[error("Max iterations ({0}) reached")]
    MaxIterations(usize),
}
