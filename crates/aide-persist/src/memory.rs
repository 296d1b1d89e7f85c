use std::collections::HashMap;

use aide_llm::ChatMessage;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::models::{StoredMessage, Thread};
use crate::store::{MessageStore, ThreadStore};

/// In-process store backing both the thread and message contracts.
///
/// Every operation runs inside one lock scope, so a batch append is atomic
/// and partial writes are never observable. Message rows live in per-thread
/// vectors, which preserves insertion order for same-timestamp batches.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    threads: Vec<Thread>,
    messages: HashMap<String, Vec<StoredMessage>>,
    next_message_id: u64,
}

impl Inner {
    fn allocate_message_id(&mut self) -> String {
        self.next_message_id += 1;
        self.next_message_id.to_string()
    }

    fn thread_exists(&self, thread_id: &str) -> bool {
        self.threads.iter().any(|t| t.id == thread_id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn add(&self, thread_id: &str, messages: &mut [ChatMessage]) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let mut inner = self.inner.lock().await;
        if !inner.thread_exists(thread_id) {
            return Err(StoreError::ThreadNotFound(thread_id.to_string()));
        }

        // Phase one: allocate identifiers and stamp them onto the in-memory
        // messages, so the serialized payload embeds the store identity.
        let mut ids = Vec::with_capacity(messages.len());
        for message in messages.iter_mut() {
            let id = inner.allocate_message_id();
            message.id = Some(id.clone());
            ids.push(id);
        }

        // Phase two: serialize and persist. A serialization failure leaves
        // the store untouched; the batch is all-or-nothing.
        let created_at = Utc::now();
        let mut rows = Vec::with_capacity(messages.len());
        for (message, id) in messages.iter().zip(&ids) {
            rows.push(StoredMessage {
                id: id.clone(),
                thread_id: thread_id.to_string(),
                message: serde_json::to_value(message)?,
                created_at,
            });
        }

        inner
            .messages
            .entry(thread_id.to_string())
            .or_default()
            .extend(rows);

        tracing::debug!(thread_id, count = messages.len(), "appended messages");
        Ok(())
    }

    async fn get(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        let inner = self.inner.lock().await;
        let rows = match inner.messages.get(thread_id) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };
        rows.iter()
            .map(|row| serde_json::from_value(row.message.clone()).map_err(StoreError::from))
            .collect()
    }

    async fn remove(&self, thread_id: &str, message_ids: &[String]) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(rows) = inner.messages.get_mut(thread_id) {
            rows.retain(|row| !message_ids.contains(&row.id));
        }
        Ok(())
    }

    async fn clear(&self, thread_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.messages.remove(thread_id);
        Ok(())
    }
}

#[async_trait]
impl ThreadStore for MemoryStore {
    async fn create_thread(
        &self,
        name: &str,
        created_by: Option<&str>,
        assistant_id: Option<&str>,
    ) -> Result<Thread> {
        let now = Utc::now();
        let thread = Thread {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_by: created_by.map(str::to_string),
            assistant_id: assistant_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.lock().await;
        inner.threads.push(thread.clone());
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let inner = self.inner.lock().await;
        Ok(inner.threads.iter().find(|t| t.id == thread_id).cloned())
    }

    async fn list_threads(
        &self,
        created_by: Option<&str>,
        assistant_id: Option<&str>,
    ) -> Result<Vec<Thread>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .threads
            .iter()
            .rev() // newest first
            .filter(|t| t.created_by.as_deref() == created_by)
            .filter(|t| assistant_id.is_none() || t.assistant_id.as_deref() == assistant_id)
            .cloned()
            .collect())
    }

    async fn update_thread_name(&self, thread_id: &str, name: &str) -> Result<Thread> {
        let mut inner = self.inner.lock().await;
        let thread = inner
            .threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))?;
        thread.name = name.to_string();
        thread.updated_at = Utc::now();
        Ok(thread.clone())
    }

    async fn touch_thread(&self, thread_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let thread = inner
            .threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))?;
        thread.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let before = inner.threads.len();
        inner.threads.retain(|t| t.id != thread_id);
        if inner.threads.len() == before {
            return Err(StoreError::ThreadNotFound(thread_id.to_string()));
        }
        // Cascade
        inner.messages.remove(thread_id);
        Ok(())
    }
}
