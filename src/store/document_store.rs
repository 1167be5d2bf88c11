use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

// ============================================================================
// Document Store - Single-Record Atomic Persistence
// ============================================================================
//
// Every call is atomic for one record. There is no cross-record transaction,
// which is why membership changes have to travel through events.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document {id} already exists in container {container}")]
    Duplicate { container: String, id: String },

    #[error("Store backend failure: {0}")]
    Backend(String),
}

/// A record that can live in a [`DocumentStore`] container
pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

#[async_trait]
pub trait DocumentStore<D: Document>: Send + Sync {
    async fn insert(&self, document: D) -> Result<D, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<D>, StoreError>;

    async fn find_all(&self) -> Result<Vec<D>, StoreError>;

    async fn upsert(&self, document: D) -> Result<D, StoreError>;

    /// Returns whether a record was actually removed
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    async fn query(
        &self,
        predicate: &(dyn for<'p> Fn(&'p D) -> bool + Send + Sync),
    ) -> Result<Vec<D>, StoreError>;
}

/// Process-local container keyed by document id
pub struct InMemoryStore<D: Document> {
    container: String,
    documents: RwLock<HashMap<String, D>>,
    writes: AtomicU64,
}

impl<D: Document> InMemoryStore<D> {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            documents: RwLock::new(HashMap::new()),
            writes: AtomicU64::new(0),
        }
    }

    /// Number of insert/upsert/delete calls that touched the container
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl<D: Document> DocumentStore<D> for InMemoryStore<D> {
    async fn insert(&self, document: D) -> Result<D, StoreError> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(document.id()) {
            return Err(StoreError::Duplicate {
                container: self.container.clone(),
                id: document.id().to_string(),
            });
        }
        documents.insert(document.id().to_string(), document.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(document)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<D>, StoreError> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<D>, StoreError> {
        Ok(self.documents.read().await.values().cloned().collect())
    }

    async fn upsert(&self, document: D) -> Result<D, StoreError> {
        self.documents
            .write()
            .await
            .insert(document.id().to_string(), document.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(document)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.documents.write().await.remove(id).is_some();
        if removed {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }

    async fn query(
        &self,
        predicate: &(dyn for<'p> Fn(&'p D) -> bool + Send + Sync),
    ) -> Result<Vec<D>, StoreError> {
        Ok(self
            .documents
            .read()
            .await
            .values()
            .filter(|document| predicate(document))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: String,
        body: String,
    }

    impl Document for Note {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: id.to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store: InMemoryStore<Note> = InMemoryStore::new("notes");
        store.insert(note("n-1", "first")).await.unwrap();

        let result = store.insert(note("n-1", "second")).await;
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let store: InMemoryStore<Note> = InMemoryStore::new("notes");
        store.insert(note("n-1", "first")).await.unwrap();
        store.upsert(note("n-1", "second")).await.unwrap();

        let found = store.find_by_id("n-1").await.unwrap().unwrap();
        assert_eq!(found.body, "second");
        assert_eq!(store.writes(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_a_write() {
        let store: InMemoryStore<Note> = InMemoryStore::new("notes");
        assert!(!store.delete("missing").await.unwrap());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_query_filters_by_predicate() {
        let store: InMemoryStore<Note> = InMemoryStore::new("notes");
        store.insert(note("n-1", "keep")).await.unwrap();
        store.insert(note("n-2", "drop")).await.unwrap();

        let kept = store.query(&|n: &Note| n.body == "keep").await.unwrap();
        assert_eq!(kept, vec![note("n-1", "keep")]);
    }

    async fn bodies_containing(store: &dyn DocumentStore<Note>, needle: &str) -> Vec<String> {
        let mut ids: Vec<String> = store
            .query(&|n: &Note| n.body.contains(needle))
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_query_through_trait_object_with_borrowed_capture() {
        let store: InMemoryStore<Note> = InMemoryStore::new("notes");
        store.insert(note("n-1", "red apple")).await.unwrap();
        store.insert(note("n-2", "green pear")).await.unwrap();
        store.insert(note("n-3", "red cherry")).await.unwrap();

        let needle = String::from("red");
        assert_eq!(
            bodies_containing(&store, &needle).await,
            vec!["n-1".to_string(), "n-3".to_string()]
        );
    }
}
