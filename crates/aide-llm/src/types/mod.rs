pub mod content;
pub mod message;
pub mod tool;

pub use content::Content;
pub use message::{ChatMessage, MessagePayload};
pub use tool::{FunctionCall, ToolCall, ToolChoice, ToolSpec};
