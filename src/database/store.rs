use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use super::document::{Collection, StoredDocument};
use crate::models::version::UpdateDocument;
use crate::models::SchemaError;

/// Errors raised by document store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Connection attempt timed out after {0}s")]
    Timeout(u64),

    #[error("Cast to id failed for value \"{0}\"")]
    InvalidId(String),

    #[error("Duplicate key in collection {collection}: {detail}")]
    Duplicate { collection: String, detail: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Unsupported update operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Invalid regular expression: {0}")]
    InvalidPattern(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Validation applied to the merged document body before an update is written.
pub type BodyCheck<'a> = &'a (dyn Fn(&Map<String, Value>) -> Result<(), StoreError> + Send + Sync);

/// Opens connections to a document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError>;
}

/// A single open connection. Every operation is attempted exactly once.
#[async_trait]
pub trait StoreConnection: Send {
    async fn insert(
        &mut self,
        collection: &Collection,
        body: Map<String, Value>,
    ) -> Result<StoredDocument, StoreError>;

    async fn find_all(&mut self, collection: &Collection) -> Result<Vec<StoredDocument>, StoreError>;

    async fn find_by_id(
        &mut self,
        collection: &Collection,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// First document whose `field` equals `value`.
    async fn find_one_by(
        &mut self,
        collection: &Collection,
        field: &str,
        value: &Value,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Documents whose string `field` matches `pattern`, case-insensitively.
    async fn find_matching(
        &mut self,
        collection: &Collection,
        field: &str,
        pattern: &str,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Applies `update` and returns the document as it was before the write,
    /// or `None` when no document has that id.
    async fn update_by_id(
        &mut self,
        collection: &Collection,
        id: Uuid,
        update: &UpdateDocument,
        check: BodyCheck<'_>,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Removes the document and returns it, or `None` when absent.
    async fn delete_by_id(
        &mut self,
        collection: &Collection,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, StoreError>;

    async fn ping(&mut self) -> Result<(), StoreError>;

    async fn close(self: Box<Self>) -> Result<(), StoreError>;
}

/// Run `op` on a freshly opened connection and release it afterwards,
/// whatever `op` returned.
pub async fn scoped<T, E, F>(store: &dyn DocumentStore, op: F) -> Result<T, E>
where
    E: From<StoreError>,
    F: for<'c> FnOnce(&'c mut Box<dyn StoreConnection>) -> BoxFuture<'c, Result<T, E>>,
{
    let mut conn = store.connect().await?;
    let result = op(&mut conn).await;

    if let Err(e) = conn.close().await {
        warn!("Failed to release {} connection: {}", store.backend(), e);
    }

    result
}
