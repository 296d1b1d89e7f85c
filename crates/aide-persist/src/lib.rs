pub mod blocking;
pub mod error;
pub mod memory;
pub mod models;
pub mod store;

#[cfg(feature = "mongodb")]
pub mod mongo;

pub use blocking::BlockingMessageStore;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use models::{StoredMessage, Thread};
pub use store::{MessageStore, ThreadStore};

#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;
