pub mod client;
pub mod retriever;
pub mod types;

pub use client::{
    ChatClient,
    ChatRequest, ChatResponse, ChatOptions,
    TokenUsage,
};

pub use retriever::{Document, Retriever};
pub use types::{ChatMessage, Content, MessagePayload, ToolCall, ToolChoice, ToolSpec};
