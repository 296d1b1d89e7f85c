use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A conversation container.
///
/// The identifier is assigned by the store and immutable afterwards. The
/// owner is optional and cleared, not cascaded, when the owning user goes
/// away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub name: String,
    pub created_by: Option<String>,
    pub assistant_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted message row.
///
/// `message` is the serialized `ChatMessage`, embedding the row id that the
/// store back-filled before the payload was finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub thread_id: String,
    pub message: Value,
    pub created_at: DateTime<Utc>,
}
