use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::verify_token;
use crate::error::ApiError;
use crate::state::AppState;

/// Request header carrying the signed token on protected routes
pub const TOKEN_HEADER: &str = "auth-token";

/// Gate for protected routes: 401 without a token, 400 when the token does
/// not verify. Decoded claims are not forwarded to handlers.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())?;

    if let Err(e) = verify_token(token, state.token_secret()) {
        debug!("Rejected token on {}: {}", request.uri().path(), e);
        return Err(ApiError::bad_request(format!("Invalid token. Error: {}", e)));
    }

    Ok(next.run(request).await)
}

fn extract_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(TOKEN_HEADER)
        .ok_or_else(|| ApiError::unauthorized("Access denied"))?;

    let token = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid token. Error: header is not valid ASCII"))?;

    if token.trim().is_empty() {
        return Err(ApiError::unauthorized("Access denied"));
    }

    Ok(token)
}
