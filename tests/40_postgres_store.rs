//! Runs the PostgreSQL document store against a live database. Skipped when
//! `DATABASE_URL` is not set (directly or through `.env`).

use alt_apps_api::config::DatabaseConfig;
use alt_apps_api::database::{Collection, DocumentStore, PgDocumentStore, StoreConnection, StoreError};
use alt_apps_api::models::UpdateDocument;
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use sqlx::{Connection, PgConnection};
use uuid::Uuid;

fn database_url() -> Option<String> {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

/// Fresh collections per run so tests never touch the service's own tables.
struct Scratch {
    url: String,
    store: PgDocumentStore,
    users: Collection,
    programs: Collection,
}

impl Scratch {
    async fn create(url: String) -> Result<Self> {
        let suffix = Uuid::new_v4().simple().to_string();
        let users: &'static str = Box::leak(format!("it_users_{}", suffix).into_boxed_str());
        let programs: &'static str = Box::leak(format!("it_programs_{}", suffix).into_boxed_str());

        let store = PgDocumentStore::from_config(&DatabaseConfig {
            url: Some(url.clone()),
            connect_timeout_secs: 10,
        })?;
        let scratch = Self {
            url,
            store,
            users: Collection::with_unique(users, &["email"]),
            programs: Collection::new(programs),
        };

        // Twice: bootstrap must be idempotent.
        for _ in 0..2 {
            scratch.store.bootstrap(&[scratch.users, scratch.programs]).await?;
        }
        Ok(scratch)
    }

    async fn drop_tables(self) -> Result<()> {
        let mut conn = PgConnection::connect(&self.url).await?;
        for collection in [self.users, self.programs] {
            sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", collection.name))
                .execute(&mut conn)
                .await?;
        }
        conn.close().await?;
        Ok(())
    }
}

fn body(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn accept(_: &Map<String, Value>) -> Result<(), StoreError> {
    Ok(())
}

async fn exercise(scratch: &Scratch, conn: &mut Box<dyn StoreConnection>) -> Result<()> {
    // Users: lookup by email and the unique index
    let alice = conn
        .insert(&scratch.users, body(json!({ "name": "Alice Smith", "email": "alice@x.com" })))
        .await?;
    assert_eq!(alice.version, 0);

    let found = conn
        .find_one_by(&scratch.users, "email", &json!("alice@x.com"))
        .await?
        .context("user by email")?;
    assert_eq!(found.id, alice.id);
    assert!(conn
        .find_one_by(&scratch.users, "email", &json!("bob@x.com"))
        .await?
        .is_none());

    let duplicate = conn
        .insert(&scratch.users, body(json!({ "name": "Alice Again", "email": "alice@x.com" })))
        .await;
    assert!(matches!(duplicate, Err(StoreError::Duplicate { .. })), "got {:?}", duplicate);

    // Programs: case-insensitive matching on string fields only
    let editor = conn
        .insert(&scratch.programs, body(json!({ "name": "Photo Editor", "country": "US", "isHidden": false })))
        .await?;
    conn.insert(&scratch.programs, body(json!({ "name": "Text Editor", "country": "DK" })))
        .await?;
    conn.insert(&scratch.programs, body(json!({ "name": "Mail Client", "country": "US" })))
        .await?;

    assert_eq!(conn.find_all(&scratch.programs).await?.len(), 3);
    assert_eq!(conn.find_matching(&scratch.programs, "name", "EDIT").await?.len(), 2);
    assert_eq!(conn.find_matching(&scratch.programs, "country", "^us$").await?.len(), 2);
    assert!(conn.find_matching(&scratch.programs, "isHidden", "false").await?.is_empty());

    // Update: client counter ignored, stored counter moves by one
    let update = UpdateDocument::prepare(json!({ "name": "Photo Studio", "__v": 40 }))?;
    let before = conn
        .update_by_id(&scratch.programs, editor.id, &update, &accept)
        .await?
        .context("updated document")?;
    assert_eq!(before.version, 0);
    assert_eq!(before.body["name"], json!("Photo Editor"));

    let after = conn
        .find_by_id(&scratch.programs, editor.id)
        .await?
        .context("document after update")?;
    assert_eq!(after.version, 1);
    assert_eq!(after.body["name"], json!("Photo Studio"));
    assert_eq!(after.body["country"], json!("US"));

    // A failed check rolls the write back
    let reject = |_: &Map<String, Value>| -> Result<(), StoreError> { Err(StoreError::InvalidUpdate("rejected".into())) };
    let update = UpdateDocument::prepare(json!({ "name": "Never Stored" }))?;
    assert!(conn
        .update_by_id(&scratch.programs, editor.id, &update, &reject)
        .await
        .is_err());
    let unchanged = conn
        .find_by_id(&scratch.programs, editor.id)
        .await?
        .context("document after rejected update")?;
    assert_eq!(unchanged.version, 1);
    assert_eq!(unchanged.body["name"], json!("Photo Studio"));

    assert!(conn
        .update_by_id(&scratch.programs, Uuid::new_v4(), &update, &accept)
        .await?
        .is_none());

    // Delete twice
    assert!(conn.delete_by_id(&scratch.programs, editor.id).await?.is_some());
    assert!(conn.delete_by_id(&scratch.programs, editor.id).await?.is_none());
    assert!(conn.find_by_id(&scratch.programs, editor.id).await?.is_none());

    conn.ping().await?;
    Ok(())
}

#[tokio::test]
async fn postgres_store_round_trip() -> Result<()> {
    let Some(url) = database_url() else {
        eprintln!("DATABASE_URL not set; skipping postgres store test");
        return Ok(());
    };

    let scratch = Scratch::create(url).await?;
    let mut conn = scratch.store.connect().await?;
    let outcome = exercise(&scratch, &mut conn).await;
    conn.close().await?;
    scratch.drop_tables().await?;
    outcome
}
