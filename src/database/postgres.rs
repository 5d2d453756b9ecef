use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::types::Json;
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::document::{Collection, StoredDocument};
use super::store::{BodyCheck, DocumentStore, StoreConnection, StoreError};
use crate::config::DatabaseConfig;
use crate::models::version::UpdateDocument;

/// PostgreSQL SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

type DocumentRow = (Uuid, i64, Json<Map<String, Value>>);

/// Document store on PostgreSQL: one table per collection holding a JSONB body.
///
/// No pool is kept; every `connect` opens a new server connection that the
/// caller closes when its single operation is done.
pub struct PgDocumentStore {
    options: PgConnectOptions,
    connect_timeout: Duration,
}

impl PgDocumentStore {
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let options = PgConnectOptions::from_str(url).map_err(|_| StoreError::InvalidDatabaseUrl)?;

        Ok(Self {
            options: options.disable_statement_logging(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        })
    }

    /// Create collection tables and unique indexes if they do not exist yet.
    pub async fn bootstrap(&self, collections: &[Collection]) -> Result<(), StoreError> {
        let mut conn = self.open().await?;

        for collection in collections {
            for statement in schema_statements(collection) {
                sqlx::query(&statement).execute(&mut conn).await?;
            }
            debug!("Ensured table for collection: {}", collection.name);
        }

        conn.close().await?;
        info!("Document tables ready ({} collections)", collections.len());
        Ok(())
    }

    async fn open(&self) -> Result<PgConnection, StoreError> {
        let secs = self.connect_timeout.as_secs();
        tokio::time::timeout(self.connect_timeout, PgConnection::connect_with(&self.options))
            .await
            .map_err(|_| StoreError::Timeout(secs))?
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        let conn = self.open().await?;
        Ok(Box::new(PgStoreConnection { conn }))
    }
}

pub struct PgStoreConnection {
    conn: PgConnection,
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn schema_statements(collection: &Collection) -> Vec<String> {
    let table = quote_identifier(collection.name);
    let mut statements = vec![format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id UUID PRIMARY KEY,
            version BIGINT NOT NULL DEFAULT 0,
            doc JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
        table
    )];

    for field in collection.unique {
        let index = quote_identifier(&format!("{}_{}_key", collection.name, field));
        statements.push(format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ((doc ->> '{}'))",
            index,
            table,
            field.replace('\'', "''")
        ));
    }

    statements
}

fn into_document((id, version, Json(body)): DocumentRow) -> StoredDocument {
    StoredDocument { id, body, version }
}

fn map_write_error(collection: &Collection, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => StoreError::Duplicate {
            collection: collection.name.to_string(),
            detail: db.message().to_string(),
        },
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl StoreConnection for PgStoreConnection {
    async fn insert(
        &mut self,
        collection: &Collection,
        body: Map<String, Value>,
    ) -> Result<StoredDocument, StoreError> {
        let doc = StoredDocument::new(body);
        let sql = format!(
            "INSERT INTO {} (id, version, doc) VALUES ($1, $2, $3)",
            quote_identifier(collection.name)
        );

        sqlx::query(&sql)
            .bind(doc.id)
            .bind(doc.version)
            .bind(Json(&doc.body))
            .execute(&mut self.conn)
            .await
            .map_err(|e| map_write_error(collection, e))?;

        Ok(doc)
    }

    async fn find_all(&mut self, collection: &Collection) -> Result<Vec<StoredDocument>, StoreError> {
        let sql = format!(
            "SELECT id, version, doc FROM {} ORDER BY created_at, id",
            quote_identifier(collection.name)
        );

        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows.into_iter().map(into_document).collect())
    }

    async fn find_by_id(
        &mut self,
        collection: &Collection,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let sql = format!(
            "SELECT id, version, doc FROM {} WHERE id = $1",
            quote_identifier(collection.name)
        );

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .fetch_optional(&mut self.conn)
            .await?;
        Ok(row.map(into_document))
    }

    async fn find_one_by(
        &mut self,
        collection: &Collection,
        field: &str,
        value: &Value,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let sql = format!(
            "SELECT id, version, doc FROM {} WHERE doc -> $1 = $2 ORDER BY created_at, id LIMIT 1",
            quote_identifier(collection.name)
        );

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(field)
            .bind(Json(value))
            .fetch_optional(&mut self.conn)
            .await?;
        Ok(row.map(into_document))
    }

    async fn find_matching(
        &mut self,
        collection: &Collection,
        field: &str,
        pattern: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let sql = format!(
            "SELECT id, version, doc FROM {}
             WHERE jsonb_typeof(doc -> $1) = 'string' AND doc ->> $1 ~* $2
             ORDER BY created_at, id",
            quote_identifier(collection.name)
        );

        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(field)
            .bind(pattern)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows.into_iter().map(into_document).collect())
    }

    async fn update_by_id(
        &mut self,
        collection: &Collection,
        id: Uuid,
        update: &UpdateDocument,
        check: BodyCheck<'_>,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let table = quote_identifier(collection.name);
        let mut tx = self.conn.begin().await?;

        let select = format!("SELECT id, version, doc FROM {} WHERE id = $1 FOR UPDATE", table);
        let Some(row) = sqlx::query_as::<_, DocumentRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let original = into_document(row);
        let mut body = original.body.clone();
        let mut version = original.version;
        update.apply(&mut body, &mut version);
        check(&body)?;

        let write = format!("UPDATE {} SET doc = $2, version = $3 WHERE id = $1", table);
        sqlx::query(&write)
            .bind(id)
            .bind(Json(&body))
            .bind(version)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(collection, e))?;

        tx.commit().await?;
        Ok(Some(original))
    }

    async fn delete_by_id(
        &mut self,
        collection: &Collection,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 RETURNING id, version, doc",
            quote_identifier(collection.name)
        );

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .fetch_optional(&mut self.conn)
            .await?;
        Ok(row.map(into_document))
    }

    async fn ping(&mut self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&mut self.conn).await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        self.conn.close().await?;
        Ok(())
    }
}
