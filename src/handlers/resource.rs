//! Create/read/update/delete for any [`Entity`].
//!
//! Every operation follows the same shape: open a store connection, attempt
//! one operation, map any failure to a 500 carrying a descriptive message,
//! and release the connection on every path.

use axum::{http::StatusCode, Json};
use serde_json::Value;
use tracing::debug;

use crate::database::{parse_id, scoped, StoreError, StoredDocument};
use crate::error::ApiError;
use crate::models::{Entity, UpdateDocument};
use crate::state::AppState;

pub type Created = (StatusCode, Json<StoredDocument>);

pub async fn create<E: Entity>(state: &AppState, payload: Value) -> Result<Created, ApiError> {
    let document = scoped::<_, StoreError, _>(state.store(), move |conn| {
        Box::pin(async move {
            let entity = E::from_payload(payload)?;
            entity.validate()?;
            conn.insert(&E::COLLECTION, entity.to_body()?).await
        })
    })
    .await
    .map_err(|e| state.internal_error(&format!("Error creating {}", E::SINGULAR), e))?;

    debug!("Created {} {}", E::SINGULAR, document.id);
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn list<E: Entity>(state: &AppState) -> Result<Json<Vec<StoredDocument>>, ApiError> {
    let documents = scoped::<_, StoreError, _>(state.store(), |conn| {
        Box::pin(async move { conn.find_all(&E::COLLECTION).await })
    })
    .await
    .map_err(|e| state.internal_error(&format!("Error retrieving {}", E::PLURAL), e))?;

    Ok(Json(documents))
}

/// A missing document is a 200 with a `null` body, not a 404.
pub async fn get_by_id<E: Entity>(state: &AppState, id: String) -> Result<Json<Option<StoredDocument>>, ApiError> {
    let document = scoped::<_, StoreError, _>(state.store(), move |conn| {
        Box::pin(async move {
            let id = parse_id(&id)?;
            conn.find_by_id(&E::COLLECTION, id).await
        })
    })
    .await
    .map_err(|e| state.internal_error(&format!("Error retrieving {} by id", E::SINGULAR), e))?;

    Ok(Json(document))
}

/// Documents whose `key` field contains `pattern`, ignoring case. `pattern`
/// is a regular expression.
pub async fn query_by_field<E: Entity>(
    state: &AppState,
    key: String,
    pattern: String,
) -> Result<Json<Vec<StoredDocument>>, ApiError> {
    let documents = scoped::<_, StoreError, _>(state.store(), move |conn| {
        Box::pin(async move { conn.find_matching(&E::COLLECTION, &key, &pattern).await })
    })
    .await
    .map_err(|e| state.internal_error(&format!("Error retrieving {} with the query", E::SINGULAR), e))?;

    Ok(Json(documents))
}

pub async fn update_by_id<E: Entity>(state: &AppState, id: String, payload: Value) -> Result<String, ApiError> {
    let lookup = id.clone();
    let original = scoped::<_, StoreError, _>(state.store(), move |conn| {
        Box::pin(async move {
            let id = parse_id(&lookup)?;
            let update = UpdateDocument::prepare(payload)?.retain_fields(E::FIELDS);
            conn.update_by_id(&E::COLLECTION, id, &update, &E::check_body).await
        })
    })
    .await
    .map_err(|e| state.internal_error(&format!("Error updating {} by id", E::TARGET), e))?;

    match original {
        Some(_) => {
            debug!("Updated {} {}", E::SINGULAR, id);
            Ok(format!("{} updated successfully.", E::TITLE))
        }
        None => Err(ApiError::not_found(format!("Cannot find {} with id: {}", E::TARGET, id))),
    }
}

pub async fn delete_by_id<E: Entity>(state: &AppState, id: String) -> Result<String, ApiError> {
    let lookup = id.clone();
    let removed = scoped::<_, StoreError, _>(state.store(), move |conn| {
        Box::pin(async move {
            let id = parse_id(&lookup)?;
            conn.delete_by_id(&E::COLLECTION, id).await
        })
    })
    .await
    .map_err(|e| state.internal_error(&format!("Error deleting {} by id", E::TARGET), e))?;

    match removed {
        Some(_) => {
            debug!("Deleted {} {}", E::SINGULAR, id);
            Ok(format!("{} successfully deleted.", E::TITLE))
        }
        None => Err(ApiError::not_found(format!("Cannot delete {} with id: {}", E::TARGET, id))),
    }
}
