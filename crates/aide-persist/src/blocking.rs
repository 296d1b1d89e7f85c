use std::sync::Arc;

use aide_llm::ChatMessage;

use crate::error::{Result, StoreError};
use crate::store::MessageStore;

/// Synchronous adapter over any [`MessageStore`].
///
/// Runs the async store on a dedicated current-thread runtime, so the
/// semantics are identical to the async variants; only how control yields
/// while awaiting storage I/O differs. Must not be used from inside an
/// async context (blocking there would stall the caller's runtime).
pub struct BlockingMessageStore<S: MessageStore> {
    inner: Arc<S>,
    runtime: tokio::runtime::Runtime,
}

impl<S: MessageStore> BlockingMessageStore<S> {
    pub fn new(inner: Arc<S>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Internal(format!("failed to build blocking runtime: {e}")))?;
        Ok(Self { inner, runtime })
    }

    pub fn add(&self, thread_id: &str, messages: &mut [ChatMessage]) -> Result<()> {
        self.runtime.block_on(self.inner.add(thread_id, messages))
    }

    pub fn get(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        self.runtime.block_on(self.inner.get(thread_id))
    }

    pub fn remove(&self, thread_id: &str, message_ids: &[String]) -> Result<()> {
        self.runtime
            .block_on(self.inner.remove(thread_id, message_ids))
    }

    pub fn clear(&self, thread_id: &str) -> Result<()> {
        self.runtime.block_on(self.inner.clear(thread_id))
    }
}
