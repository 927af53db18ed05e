use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::store::{Result, Store};

/// A value persisted in its own collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Name of the collection the record lives in.
    const COLLECTION: &'static str;

    fn id(&self) -> u64;
}

/// Typed, JSON-encoded view over one collection of a [`Store`].
pub struct Collection<T> {
    store: Arc<dyn Store>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// The underlying store, for index and marker operations.
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub async fn next_id(&self) -> Result<u64> {
        self.store.next_id(T::COLLECTION).await
    }

    /// Inserts or replaces the record under its own id.
    pub async fn put(&self, record: &T) -> Result<()> {
        let data = serde_json::to_vec(record)?;
        self.store.save(T::COLLECTION, record.id(), &data).await
    }

    pub async fn get(&self, id: u64) -> Result<Option<T>> {
        let Some(data) = self.store.load(T::COLLECTION, id).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Every record of the collection in ascending id order.
    pub async fn all(&self) -> Result<Vec<T>> {
        self.store
            .load_all(T::COLLECTION)
            .await?
            .iter()
            .map(|data| serde_json::from_slice(data).map_err(Into::into))
            .collect()
    }

    pub async fn remove(&self, id: u64) -> Result<bool> {
        self.store.delete(T::COLLECTION, id).await
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::store::MemoryStore;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: u64,
        text: String,
    }

    impl Record for Note {
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> u64 {
            self.id
        }
    }

    fn notes() -> Collection<Note> {
        Collection::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let notes = notes();
        let id = notes.next_id().await.unwrap();
        let note = Note {
            id,
            text: "hello".into(),
        };

        notes.put(&note).await.unwrap();
        assert_eq!(notes.get(id).await.unwrap(), Some(note));

        assert!(notes.remove(id).await.unwrap());
        assert_eq!(notes.get(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces_existing_record() {
        let notes = notes();
        notes
            .put(&Note {
                id: 1,
                text: "draft".into(),
            })
            .await
            .unwrap();
        notes
            .put(&Note {
                id: 1,
                text: "final".into(),
            })
            .await
            .unwrap();

        let all = notes.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].text, "final");
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        store.save("notes", 1, b"not json").await.unwrap();

        let notes: Collection<Note> = Collection::new(store);
        assert!(notes.get(1).await.is_err());
        assert!(notes.all().await.is_err());
    }
}
