//! Prelude module for convenient imports
//!
//! Import everything you need with:
//! ```rust
//! use aide::prelude::*;
//! ```

pub use crate::{
    assistant_tool, AgentConfig, AllowAll, Assistant, AssistantContext, AssistantError,
    AssistantGraph, AssistantInfo, AssistantOutput, AssistantRegistry, AssistantService,
    ChatClient, ChatMessage, ChatResponse, Content, Document, FunctionTool, MemoryStore,
    MessageStore, OwnerOrSuperuser, PermissionPolicy, Retriever, RunOutcome, Thread,
    ThreadStore, ToolCall, Toolset, User,
};
