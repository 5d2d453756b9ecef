use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::database::{scoped, StoreError};
use crate::error::ApiError;
use crate::state::AppState;

/// Liveness banner
#[utoipa::path(
    get,
    path = "/",
    tag = "root",
    responses((status = 200, description = "Service is running", body = Value))
)]
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Alt apps API is running!" }))
}

/// Opens and releases one store connection.
#[utoipa::path(
    get,
    path = "/health",
    tag = "root",
    responses(
        (status = 200, description = "Store reachable", body = Value),
        (status = 503, description = "Store unreachable", body = Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let backend = state.store().backend();

    scoped::<_, StoreError, _>(state.store(), |conn| Box::pin(async move { conn.ping().await }))
        .await
        .map_err(|e| {
            warn!("Health check against {} store failed: {}", backend, e);
            ApiError::service_unavailable(format!("{} store unreachable", backend))
        })?;

    Ok(Json(json!({ "status": "ok", "store": backend })))
}
