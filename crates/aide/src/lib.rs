//! # Aide
//!
//! Define AI assistants as values with callable tools, persisted
//! conversation threads, and a permission-gated chat facade.
//!
//! ## Overview
//!
//! Aide wires four concerns together:
//!
//! - **Assistants**: declarative bundles (instructions, model, tools,
//!   retrieval flag, structured-output schema) registered under a stable
//!   string id
//! - **Orchestration**: a step-wise loop driving LLM calls, tool dispatch,
//!   and optional retrieval-augmentation
//! - **Persistence**: append-only per-thread message logs whose stored
//!   identities match the in-memory trace
//! - **Permissions**: pluggable predicates gating every thread, message,
//!   and assistant operation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use aide::prelude::*;
//!
//! struct WeatherAssistant;
//!
//! impl Assistant for WeatherAssistant {
//!     fn id(&self) -> &str { "weather_assistant" }
//!     fn name(&self) -> &str { "Weather Assistant" }
//!     fn instructions(&self) -> String { "You are a weather bot.".to_string() }
//! }
//!
//! # async fn run(llm: Arc<dyn ChatClient>) -> Result<(), aide::AssistantError> {
//! let service = AssistantService::builder().llm_client(llm).build()?;
//! service.registry().register("weather_assistant", |_ctx| {
//!     Arc::new(WeatherAssistant) as Arc<dyn Assistant>
//! })?;
//!
//! let user = User::new("alice");
//! let thread = service.create_thread("Weather chat", None, Some(&user)).await?;
//! let outcome = service
//!     .create_message("weather_assistant", &thread.id, Some(&user), "Will it rain?")
//!     .await?;
//! println!("{:?}", outcome.output);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Aide is organized into focused crates:
//!
//! - **`aide-llm`**: provider-agnostic message/tool types and the
//!   `ChatClient`/`Retriever` capability traits
//! - **`aide-tools`**: declarative tool descriptors and bounded-concurrency
//!   dispatch
//! - **`aide-persist`**: thread/message stores with identity back-fill
//! - **`aide-graph`**: the orchestration state machine
//!
//! This crate re-exports the stack and adds the registry, the permission
//! policies, and the `AssistantService` facade.

pub mod assistant;
pub mod compose;
pub mod error;
pub mod permissions;
pub mod prelude;
pub mod registry;
pub mod service;

pub use assistant::{Assistant, AssistantContext};
pub use compose::assistant_tool;
pub use error::AssistantError;
pub use permissions::{AllowAll, OwnerOrSuperuser, PermissionPolicy, User};
pub use registry::{AssistantFactory, AssistantRegistry};
pub use service::{AssistantInfo, AssistantService, AssistantServiceBuilder};

pub use aide_graph::{
    AgentConfig, AgentError, AssistantGraph, AssistantGraphBuilder, AssistantOutput,
    PersistenceContext, RunOutcome, CONTEXT_PLACEHOLDER,
};

pub use aide_llm::{
    ChatClient, ChatMessage, ChatOptions, ChatRequest, ChatResponse, Content, Document,
    MessagePayload, Retriever, ToolCall, ToolChoice, ToolSpec,
};

pub use aide_tools::{FunctionTool, ToolDispatcher, Toolset};

pub use aide_persist::{
    BlockingMessageStore, MemoryStore, MessageStore, StoreError, StoredMessage, Thread,
    ThreadStore,
};

#[cfg(feature = "mongodb")]
pub use aide_persist::MongoStore;
