use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A retrieved document, usually a chunk of indexed content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Trait for retrieval-augmentation backends.
///
/// Given a query string, return an ordered sequence of documents. The
/// orchestration loop concatenates their content into the system prompt's
/// context block; it never inspects the metadata.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>>;
}
