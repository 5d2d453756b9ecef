use axum::{extract::State, Json};
use serde_json::Value;

use super::resource::{self, Created};
use crate::error::ApiError;
use crate::models::{Application, CatalogEntry};
use crate::state::AppState;

/// Submit an application. Open to anonymous callers.
#[utoipa::path(
    post,
    path = "/applications",
    tag = "applications",
    request_body = CatalogEntry,
    responses(
        (status = 201, description = "Application created", body = CatalogEntry),
        (status = 500, description = "Error creating application")
    )
)]
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> Result<Created, ApiError> {
    resource::create::<Application>(&state, payload).await
}
