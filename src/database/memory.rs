use async_trait::async_trait;
use regex::RegexBuilder;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::document::{Collection, StoredDocument};
use super::store::{BodyCheck, DocumentStore, StoreConnection, StoreError};
use crate::models::version::UpdateDocument;

type Collections = HashMap<&'static str, Vec<StoredDocument>>;

/// In-process document store. Documents keep insertion order per collection.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
    open: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connections handed out and not yet released.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Number of documents currently held in a collection.
    pub async fn count(&self, collection: &Collection) -> usize {
        self.collections
            .read()
            .await
            .get(collection.name)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            collections: self.collections.clone(),
            open: self.open.clone(),
        }))
    }
}

pub struct MemoryConnection {
    collections: Arc<RwLock<Collections>>,
    open: Arc<AtomicUsize>,
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

fn ensure_unique(
    collection: &Collection,
    existing: &[StoredDocument],
    body: &Map<String, Value>,
) -> Result<(), StoreError> {
    for field in collection.unique {
        let Some(value) = body.get(*field) else { continue };
        if existing.iter().any(|doc| doc.field(field) == Some(value)) {
            return Err(StoreError::Duplicate {
                collection: collection.name.to_string(),
                detail: format!("{} {}", field, value),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl StoreConnection for MemoryConnection {
    async fn insert(
        &mut self,
        collection: &Collection,
        body: Map<String, Value>,
    ) -> Result<StoredDocument, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.name).or_default();
        ensure_unique(collection, docs, &body)?;

        let doc = StoredDocument::new(body);
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn find_all(&mut self, collection: &Collection) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection.name).cloned().unwrap_or_default())
    }

    async fn find_by_id(
        &mut self,
        collection: &Collection,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection.name)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn find_one_by(
        &mut self,
        collection: &Collection,
        field: &str,
        value: &Value,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection.name)
            .and_then(|docs| docs.iter().find(|doc| doc.field(field) == Some(value)))
            .cloned())
    }

    async fn find_matching(
        &mut self,
        collection: &Collection,
        field: &str,
        pattern: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| StoreError::InvalidPattern(e.to_string()))?;

        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection.name) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .filter(|doc| matches!(doc.field(field), Some(Value::String(s)) if regex.is_match(s)))
            .cloned()
            .collect())
    }

    async fn update_by_id(
        &mut self,
        collection: &Collection,
        id: Uuid,
        update: &UpdateDocument,
        check: BodyCheck<'_>,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection.name) else {
            return Ok(None);
        };
        let Some(index) = docs.iter().position(|doc| doc.id == id) else {
            return Ok(None);
        };

        let original = docs[index].clone();
        let mut body = original.body.clone();
        let mut version = original.version;
        update.apply(&mut body, &mut version);
        check(&body)?;

        let others: Vec<StoredDocument> = docs
            .iter()
            .filter(|doc| doc.id != id)
            .cloned()
            .collect();
        ensure_unique(collection, &others, &body)?;

        docs[index].body = body;
        docs[index].version = version;
        Ok(Some(original))
    }

    async fn delete_by_id(
        &mut self,
        collection: &Collection,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection.name) else {
            return Ok(None);
        };
        let index = docs.iter().position(|doc| doc.id == id);
        Ok(index.map(|index| docs.remove(index)))
    }

    async fn ping(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
