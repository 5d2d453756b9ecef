use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use super::resource::{self, Created};
use crate::database::StoredDocument;
use crate::error::ApiError;
use crate::models::{AltProgram, CatalogEntry};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/alt-programs",
    tag = "alt-programs",
    request_body = CatalogEntry,
    security(("ApiKeyAuth" = [])),
    responses(
        (status = 201, description = "Alternative program created", body = CatalogEntry),
        (status = 401, description = "Missing auth-token header"),
        (status = 400, description = "Invalid token"),
        (status = 500, description = "Error creating alternative program")
    )
)]
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> Result<Created, ApiError> {
    resource::create::<AltProgram>(&state, payload).await
}

#[utoipa::path(
    get,
    path = "/alt-programs",
    tag = "alt-programs",
    responses(
        (status = 200, description = "All alternative programs", body = [CatalogEntry]),
        (status = 500, description = "Error retrieving alternative programs")
    )
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<StoredDocument>>, ApiError> {
    resource::list::<AltProgram>(&state).await
}

#[utoipa::path(
    get,
    path = "/alt-programs/{id}",
    tag = "alt-programs",
    params(("id" = String, Path, description = "Alternative program id")),
    responses(
        (status = 200, description = "The alternative program, or null when absent", body = CatalogEntry),
        (status = 500, description = "Error retrieving alternative program by id")
    )
)]
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<StoredDocument>>, ApiError> {
    resource::get_by_id::<AltProgram>(&state, id).await
}

#[utoipa::path(
    put,
    path = "/alt-programs/{id}",
    tag = "alt-programs",
    params(("id" = String, Path, description = "Alternative program id")),
    request_body = CatalogEntry,
    security(("ApiKeyAuth" = [])),
    responses(
        (status = 200, description = "Program updated successfully.", body = String),
        (status = 404, description = "Cannot find program"),
        (status = 500, description = "Error updating program by id")
    )
)]
pub async fn update_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<String, ApiError> {
    resource::update_by_id::<AltProgram>(&state, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/alt-programs/{id}",
    tag = "alt-programs",
    params(("id" = String, Path, description = "Alternative program id")),
    security(("ApiKeyAuth" = [])),
    responses(
        (status = 200, description = "Program successfully deleted.", body = String),
        (status = 404, description = "Cannot delete program"),
        (status = 500, description = "Error deleting program by id")
    )
)]
pub async fn delete_by_id(State(state): State<AppState>, Path(id): Path<String>) -> Result<String, ApiError> {
    resource::delete_by_id::<AltProgram>(&state, id).await
}
