//! Durable storage for the favorites and watchlist collections.
//!
//! [`StorageAdapter`] is a plain key/value seam holding serialized text. It
//! keeps no cache of its own: every read and write goes straight to the
//! backing medium. [`CollectionStore`] owns the in-memory collections and
//! writes through to an adapter on every mutation.

pub mod collections;
pub mod file;
pub mod memory;

pub use collections::{
    CollectionChange, CollectionStore, MutationOutcome, PersistenceWarning, SubscriptionId,
};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::AppResult;

/// Key/value access to durable storage
pub trait StorageAdapter: Send + Sync {
    /// Read the value stored under `key`, or `None` if nothing was ever written
    fn read(&self, key: &str) -> AppResult<Option<String>>;

    /// Replace the value stored under `key`
    fn write(&self, key: &str, value: &str) -> AppResult<()>;
}
