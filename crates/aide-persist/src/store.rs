use aide_llm::ChatMessage;
use async_trait::async_trait;

use crate::error::Result;
use crate::models::Thread;

/// Append-only, thread-scoped message log with identity back-fill.
///
/// `add` is a two-phase protocol: allocate a row to obtain the store
/// identifier, stamp it onto the in-memory message, serialize the
/// now-identified message, persist the payload. The whole batch is one
/// atomic unit: either every message is durably stored with a consistent
/// identity, or none is.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append messages to a thread, back-filling each message's `id`.
    async fn add(&self, thread_id: &str, messages: &mut [ChatMessage]) -> Result<()>;

    /// All messages in a thread, strictly ordered by creation time
    /// ascending (ties broken by insertion order within a batch).
    async fn get(&self, thread_id: &str) -> Result<Vec<ChatMessage>>;

    /// Remove specific messages from a thread.
    async fn remove(&self, thread_id: &str, message_ids: &[String]) -> Result<()>;

    /// Remove every message in a thread.
    async fn clear(&self, thread_id: &str) -> Result<()>;
}

/// Thread CRUD. The orchestration core only touches threads through this
/// contract; row management is an implementation concern.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn create_thread(
        &self,
        name: &str,
        created_by: Option<&str>,
        assistant_id: Option<&str>,
    ) -> Result<Thread>;

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// Threads, newest first, optionally filtered by owner and assistant.
    async fn list_threads(
        &self,
        created_by: Option<&str>,
        assistant_id: Option<&str>,
    ) -> Result<Vec<Thread>>;

    async fn update_thread_name(&self, thread_id: &str, name: &str) -> Result<Thread>;

    /// Bump `updated_at`.
    async fn touch_thread(&self, thread_id: &str) -> Result<()>;

    /// Delete a thread and, cascading, its messages.
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;
}
