use aide_graph::AgentError;
use aide_persist::StoreError;
use thiserror::Error;

/// User-facing error taxonomy.
///
/// The wording of `NotDefined` and `NotAllowed` is part of the observable
/// contract; callers surface them as 404- and 403-equivalents.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Assistant with id={0} not found")]
    NotDefined(String),

    #[error("{0}")]
    NotAllowed(String),

    #[error("{0}")]
    Misconfigured(String),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}
