use crate::store::{ExpiredDeletion, Result, Store};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use std::collections::BTreeMap;
use std::sync::Arc;

/// An in-memory record store.
///
/// Useful for testing and development. Nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Arc<DashMap<String, BTreeMap<u64, Vec<u8>>>>,
    sequences: Arc<DashMap<String, u64>>,
    indexes: Arc<DashMap<(String, String), u64>>,
    markers: Arc<DashMap<String, DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn next_id(&self, collection: &str) -> Result<u64> {
        let mut seq = self.sequences.entry(collection.to_owned()).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }

    async fn save(&self, collection: &str, id: u64, data: &[u8]) -> Result<()> {
        self.records
            .entry(collection.to_owned())
            .or_default()
            .insert(id, data.to_vec());
        Ok(())
    }

    async fn load(&self, collection: &str, id: u64) -> Result<Option<Vec<u8>>> {
        Ok(self
            .records
            .get(collection)
            .and_then(|records| records.get(&id).cloned()))
    }

    async fn load_all(&self, collection: &str) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .records
            .get(collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, collection: &str, id: u64) -> Result<bool> {
        Ok(self
            .records
            .get_mut(collection)
            .map(|mut records| records.remove(&id).is_some())
            .unwrap_or(false))
    }

    async fn claim(&self, index: &str, key: &str, id: u64) -> Result<bool> {
        match self.indexes.entry((index.to_owned(), key.to_owned())) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(true)
            }
        }
    }

    async fn lookup(&self, index: &str, key: &str) -> Result<Option<u64>> {
        Ok(self
            .indexes
            .get(&(index.to_owned(), key.to_owned()))
            .map(|id| *id))
    }

    async fn release(&self, index: &str, key: &str) -> Result<()> {
        self.indexes.remove(&(index.to_owned(), key.to_owned()));
        Ok(())
    }

    async fn mark(&self, key: &str, ttl: u64) -> Result<()> {
        let now = Utc::now();
        let expiry = i64::try_from(ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.markers.insert(key.to_owned(), expiry);
        Ok(())
    }

    async fn is_marked(&self, key: &str) -> Result<bool> {
        // The read guard must be gone before removing from the same shard.
        let expiry = self.markers.get(key).map(|entry| *entry.value());
        match expiry {
            Some(expiry) if is_active(expiry) => Ok(true),
            Some(_) => {
                self.markers.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ExpiredDeletion for MemoryStore {
    async fn delete_expired(&self) -> Result<()> {
        self.markers.retain(|_, expiry| is_active(*expiry));
        Ok(())
    }
}

fn is_active(expiry: DateTime<Utc>) -> bool {
    expiry > Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_flow() {
        let store = MemoryStore::new();
        let id = store.next_id("users").await.unwrap();
        assert_eq!(id, 1);

        store.save("users", id, b"alice").await.unwrap();
        assert_eq!(
            store.load("users", id).await.unwrap(),
            Some(b"alice".to_vec())
        );

        assert!(store.delete("users", id).await.unwrap());
        assert!(!store.delete("users", id).await.unwrap());
        assert_eq!(store.load("users", id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ids_are_per_collection_and_not_reused() {
        let store = MemoryStore::new();
        assert_eq!(store.next_id("users").await.unwrap(), 1);
        assert_eq!(store.next_id("users").await.unwrap(), 2);
        assert_eq!(store.next_id("announcements").await.unwrap(), 1);

        store.save("users", 2, b"x").await.unwrap();
        store.delete("users", 2).await.unwrap();
        assert_eq!(store.next_id("users").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_load_all_is_ordered_by_id() {
        let store = MemoryStore::new();
        store.save("items", 3, b"c").await.unwrap();
        store.save("items", 1, b"a").await.unwrap();
        store.save("items", 2, b"b").await.unwrap();

        let all = store.load_all("items").await.unwrap();
        assert_eq!(all, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        assert!(store.load_all("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_claim_is_exclusive_until_released() {
        let store = MemoryStore::new();
        assert!(store.claim("email", "a@b.ph", 1).await.unwrap());
        assert!(!store.claim("email", "a@b.ph", 2).await.unwrap());
        assert_eq!(store.lookup("email", "a@b.ph").await.unwrap(), Some(1));

        store.release("email", "a@b.ph").await.unwrap();
        assert_eq!(store.lookup("email", "a@b.ph").await.unwrap(), None);
        assert!(store.claim("email", "a@b.ph", 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_markers_expire() {
        let store = MemoryStore::new();
        store.mark("revoked:live", 60).await.unwrap();
        store.mark("revoked:dead", 0).await.unwrap();

        assert!(store.is_marked("revoked:live").await.unwrap());
        assert!(!store.is_marked("revoked:dead").await.unwrap());
        assert!(!store.is_marked("revoked:unknown").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_live_markers() {
        let store = MemoryStore::new();
        store.mark("live", 60).await.unwrap();
        store.mark("dead", 0).await.unwrap();

        store.delete_expired().await.unwrap();
        assert_eq!(store.markers.len(), 1);
        assert!(store.is_marked("live").await.unwrap());
    }
}
