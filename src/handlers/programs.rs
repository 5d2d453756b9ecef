use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use super::resource::{self, Created};
use crate::database::StoredDocument;
use crate::error::ApiError;
use crate::models::Program;
use crate::state::AppState;

/// Create a program
#[utoipa::path(
    post,
    path = "/programs",
    tag = "programs",
    request_body = Program,
    security(("ApiKeyAuth" = [])),
    responses(
        (status = 201, description = "Program created", body = Program),
        (status = 401, description = "Missing auth-token header"),
        (status = 400, description = "Invalid token"),
        (status = 500, description = "Error creating program")
    )
)]
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> Result<Created, ApiError> {
    resource::create::<Program>(&state, payload).await
}

/// List all programs
#[utoipa::path(
    get,
    path = "/programs",
    tag = "programs",
    responses(
        (status = 200, description = "All programs", body = [Program]),
        (status = 500, description = "Error retrieving programs")
    )
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<StoredDocument>>, ApiError> {
    resource::list::<Program>(&state).await
}

/// Get a program by id
#[utoipa::path(
    get,
    path = "/programs/{id}",
    tag = "programs",
    params(("id" = String, Path, description = "Program id")),
    responses(
        (status = 200, description = "The program, or null when absent", body = Program),
        (status = 500, description = "Error retrieving program by id")
    )
)]
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<StoredDocument>>, ApiError> {
    resource::get_by_id::<Program>(&state, id).await
}

/// Find programs whose field contains a value, ignoring case
#[utoipa::path(
    get,
    path = "/programs/query/{key}/{val}",
    tag = "programs",
    params(
        ("key" = String, Path, description = "Field to match, e.g. name or country"),
        ("val" = String, Path, description = "Case-insensitive pattern")
    ),
    responses(
        (status = 200, description = "Matching programs", body = [Program]),
        (status = 500, description = "Error retrieving program with the query")
    )
)]
pub async fn query(
    State(state): State<AppState>,
    Path((key, val)): Path<(String, String)>,
) -> Result<Json<Vec<StoredDocument>>, ApiError> {
    resource::query_by_field::<Program>(&state, key, val).await
}

/// Update a program by id
#[utoipa::path(
    put,
    path = "/programs/{id}",
    tag = "programs",
    params(("id" = String, Path, description = "Program id")),
    request_body = Program,
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
    resource::update_by_id::<Program>(&state, id, payload).await
}

/// Delete a program by id
#[utoipa::path(
    delete,
    path = "/programs/{id}",
    tag = "programs",
    params(("id" = String, Path, description = "Program id")),
    security(("ApiKeyAuth" = [])),
    responses(
        (status = 200, description = "Program successfully deleted.", body = String),
        (status = 404, description = "Cannot delete program"),
        (status = 500, description = "Error deleting program by id")
    )
)]
pub async fn delete_by_id(State(state): State<AppState>, Path(id): Path<String>) -> Result<String, ApiError> {
    resource::delete_by_id::<Program>(&state, id).await
}
