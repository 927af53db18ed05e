use crate::store::{Result, Store};
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use std::collections::HashMap;

const DEFAULT_PREFIX: &str = "portal";

/// A Redis record store.
///
/// Each collection is a hash `<prefix>:<collection>` keyed by record id, with
/// its id sequence kept in `<prefix>:<collection>:seq`. Unique indexes are
/// hashes `<prefix>:index:<name>` and markers are plain keys with a TTL.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    /// Creates a new Redis store from a connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            prefix: DEFAULT_PREFIX.to_owned(),
        }
    }

    fn collection_key(&self, collection: &str) -> String {
        format!("{}:{collection}", self.prefix)
    }

    fn sequence_key(&self, collection: &str) -> String {
        format!("{}:{collection}:seq", self.prefix)
    }

    fn index_key(&self, index: &str) -> String {
        format!("{}:index:{index}", self.prefix)
    }

    fn marker_key(&self, key: &str) -> String {
        format!("{}:marker:{key}", self.prefix)
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn next_id(&self, collection: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        let id: u64 = conn.incr(self.sequence_key(collection), 1).await?;
        Ok(id)
    }

    async fn save(&self, collection: &str, id: u64, data: &[u8]) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.hset(self.collection_key(collection), id, data).await?;
        Ok(())
    }

    async fn load(&self, collection: &str, id: u64) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let data = conn.hget(self.collection_key(collection), id).await?;
        Ok(data)
    }

    async fn load_all(&self, collection: &str) -> Result<Vec<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let records: HashMap<u64, Vec<u8>> =
            conn.hgetall(self.collection_key(collection)).await?;
        let mut records: Vec<_> = records.into_iter().collect();
        records.sort_unstable_by_key(|(id, _)| *id);
        Ok(records.into_iter().map(|(_, data)| data).collect())
    }

    async fn delete(&self, collection: &str, id: u64) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.hdel(self.collection_key(collection), id).await?;
        Ok(removed > 0)
    }

    async fn claim(&self, index: &str, key: &str, id: u64) -> Result<bool> {
        let mut conn = self.conn.clone();
        let claimed: bool = conn.hset_nx(self.index_key(index), key, id).await?;
        Ok(claimed)
    }

    async fn lookup(&self, index: &str, key: &str) -> Result<Option<u64>> {
        let mut conn = self.conn.clone();
        let id = conn.hget(self.index_key(index), key).await?;
        Ok(id)
    }

    async fn release(&self, index: &str, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.hdel(self.index_key(index), key).await?;
        Ok(())
    }

    async fn mark(&self, key: &str, ttl: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero TTL.
        let _: () = conn.set_ex(self.marker_key(key), 1u8, ttl.max(1)).await?;
        Ok(())
    }

    async fn is_marked(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(self.marker_key(key)).await?;
        Ok(exists)
    }
}
