use ::redis::RedisError;
use async_trait::async_trait;
use color_eyre::Report;
use std::error::Error as StdError;
use std::fmt;

mod collection;
mod memory;
mod redis;

pub use collection::{Collection, Record};
pub use memory::MemoryStore;
pub use redis::RedisStore;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Error type for record store operations.
#[derive(Debug)]
pub struct StoreError {
    error: Report,
}

impl StoreError {
    pub fn new<T>(error: T) -> Self
    where
        T: StdError + Send + Sync + 'static,
    {
        Self {
            error: Report::new(error),
        }
    }

    pub fn msg<T>(message: T) -> Self
    where
        T: fmt::Debug + fmt::Display + Send + Sync + 'static,
    {
        Self {
            error: Report::msg(message),
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.error.source()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl From<RedisError> for StoreError {
    fn from(error: RedisError) -> Self {
        Self::new(error)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error)
    }
}

/// Abstract interface for record storage backends.
///
/// Records are opaque byte blobs grouped into named collections and addressed
/// by a numeric id. Unique indexes map a string key to a record id, and
/// markers are expiring flags used for short-lived state such as revoked
/// tokens.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Allocates the next id of a collection. Ids start at 1 and are never reused.
    async fn next_id(&self, collection: &str) -> Result<u64>;

    /// Inserts or replaces a record.
    async fn save(&self, collection: &str, id: u64, data: &[u8]) -> Result<()>;

    /// Loads a record by id.
    async fn load(&self, collection: &str, id: u64) -> Result<Option<Vec<u8>>>;

    /// Loads every record of a collection in ascending id order.
    async fn load_all(&self, collection: &str) -> Result<Vec<Vec<u8>>>;

    /// Deletes a record. Returns `false` if it did not exist.
    async fn delete(&self, collection: &str, id: u64) -> Result<bool>;

    /// Binds `key` to `id` in a unique index.
    ///
    /// Returns `false` without touching the index when the key is already bound.
    async fn claim(&self, index: &str, key: &str, id: u64) -> Result<bool>;

    /// Resolves a key of a unique index.
    async fn lookup(&self, index: &str, key: &str) -> Result<Option<u64>>;

    /// Frees a key of a unique index.
    async fn release(&self, index: &str, key: &str) -> Result<()>;

    /// Sets a marker that expires after `ttl` seconds.
    async fn mark(&self, key: &str, ttl: u64) -> Result<()>;

    /// Checks whether an unexpired marker exists.
    async fn is_marked(&self, key: &str) -> Result<bool>;
}

/// Provides a method for purging expired markers.
#[async_trait]
pub trait ExpiredDeletion: Store
where
    Self: Sized,
{
    /// Deletes expired markers from the store.
    async fn delete_expired(&self) -> Result<()>;

    /// Keeps running indefinitely, purging expired markers and then waiting
    /// for the specified period before purging again.
    async fn delete_expired_markers(self, period: tokio::time::Duration) -> Result<()> {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            self.delete_expired().await?;
        }
    }
}
