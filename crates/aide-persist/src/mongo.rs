use aide_llm::ChatMessage;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson};
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::models::Thread;
use crate::store::{MessageStore, ThreadStore};

#[derive(Debug, Serialize, Deserialize)]
struct ThreadDoc {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    created_by: Option<String>,
    assistant_id: Option<String>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<ThreadDoc> for Thread {
    fn from(doc: ThreadDoc) -> Self {
        Thread {
            id: doc.id.to_hex(),
            name: doc.name,
            created_by: doc.created_by,
            assistant_id: doc.assistant_id,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MessageDoc {
    #[serde(rename = "_id")]
    id: ObjectId,
    thread_id: ObjectId,
    message: Bson,
    created_at: bson::DateTime,
}

/// MongoDB-backed store implementing both persistence contracts.
///
/// The batch append runs inside a session transaction so the two-phase
/// allocate/stamp/serialize/finalize sequence is all-or-nothing, matching
/// the in-process store's atomicity.
pub struct MongoStore {
    client: Client,
    threads: Collection<ThreadDoc>,
    messages: Collection<MessageDoc>,
}

impl MongoStore {
    /// Connect to MongoDB and create the store
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let db = client.database(database);
        let threads = db.collection("threads");
        let messages = db.collection("messages");

        Ok(Self {
            client,
            threads,
            messages,
        })
    }

    fn parse_id(id: &str) -> Result<ObjectId> {
        ObjectId::parse_str(id).map_err(|e| StoreError::InvalidObjectId(e.to_string()))
    }
}

#[async_trait]
impl MessageStore for MongoStore {
    async fn add(&self, thread_id: &str, messages: &mut [ChatMessage]) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }
        let thread_oid = Self::parse_id(thread_id)?;

        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        // Phase one: allocate rows with empty payloads and stamp the ids
        // onto the in-memory messages.
        let created_at = bson::DateTime::now();
        let mut docs = Vec::with_capacity(messages.len());
        for message in messages.iter_mut() {
            let oid = ObjectId::new();
            message.id = Some(oid.to_hex());
            docs.push(MessageDoc {
                id: oid,
                thread_id: thread_oid,
                message: Bson::Null,
                created_at,
            });
        }
        self.messages
            .insert_many(&docs)
            .session(&mut session)
            .await?;

        // Phase two: serialize the now-identified messages and finalize the
        // payloads inside the same transaction.
        for (doc_row, message) in docs.iter().zip(messages.iter()) {
            let payload = bson::to_bson(message)?;
            self.messages
                .update_one(
                    doc! { "_id": doc_row.id },
                    doc! { "$set": { "message": payload } },
                )
                .session(&mut session)
                .await?;
        }

        session.commit_transaction().await?;
        tracing::debug!(thread_id, count = messages.len(), "appended messages");
        Ok(())
    }

    async fn get(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        let thread_oid = Self::parse_id(thread_id)?;
        let docs: Vec<MessageDoc> = self
            .messages
            .find(doc! { "thread_id": thread_oid })
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?
            .try_collect()
            .await?;

        docs.into_iter()
            .map(|d| bson::from_bson(d.message).map_err(StoreError::from))
            .collect()
    }

    async fn remove(&self, thread_id: &str, message_ids: &[String]) -> Result<()> {
        let thread_oid = Self::parse_id(thread_id)?;
        let ids = message_ids
            .iter()
            .map(|id| Self::parse_id(id))
            .collect::<Result<Vec<_>>>()?;

        self.messages
            .delete_many(doc! { "thread_id": thread_oid, "_id": { "$in": ids } })
            .await?;
        Ok(())
    }

    async fn clear(&self, thread_id: &str) -> Result<()> {
        let thread_oid = Self::parse_id(thread_id)?;
        self.messages
            .delete_many(doc! { "thread_id": thread_oid })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ThreadStore for MongoStore {
    async fn create_thread(
        &self,
        name: &str,
        created_by: Option<&str>,
        assistant_id: Option<&str>,
    ) -> Result<Thread> {
        let now = bson::DateTime::now();
        let doc_row = ThreadDoc {
            id: ObjectId::new(),
            name: name.to_string(),
            created_by: created_by.map(str::to_string),
            assistant_id: assistant_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        self.threads.insert_one(&doc_row).await?;
        Ok(doc_row.into())
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let oid = Self::parse_id(thread_id)?;
        let found = self.threads.find_one(doc! { "_id": oid }).await?;
        Ok(found.map(Thread::from))
    }

    async fn list_threads(
        &self,
        created_by: Option<&str>,
        assistant_id: Option<&str>,
    ) -> Result<Vec<Thread>> {
        let mut filter = doc! { "created_by": created_by };
        if let Some(assistant_id) = assistant_id {
            filter.insert("assistant_id", assistant_id);
        }

        let docs: Vec<ThreadDoc> = self
            .threads
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(docs.into_iter().map(Thread::from).collect())
    }

    async fn update_thread_name(&self, thread_id: &str, name: &str) -> Result<Thread> {
        let oid = Self::parse_id(thread_id)?;
        let update = doc! {
            "$set": { "name": name, "updated_at": bson::DateTime::now() }
        };
        self.threads.update_one(doc! { "_id": oid }, update).await?;

        self.get_thread(thread_id)
            .await?
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))
    }

    async fn touch_thread(&self, thread_id: &str) -> Result<()> {
        let oid = Self::parse_id(thread_id)?;
        let update = doc! { "$set": { "updated_at": bson::DateTime::now() } };
        self.threads.update_one(doc! { "_id": oid }, update).await?;
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let oid = Self::parse_id(thread_id)?;
        self.threads.delete_one(doc! { "_id": oid }).await?;
        // Cascade
        self.messages.delete_many(doc! { "thread_id": oid }).await?;
        Ok(())
    }
}
