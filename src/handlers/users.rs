//! Account registration and login.

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::auth::{issue_token, Claims, TokenError};
use crate::database::{scoped, StoreError, StoredDocument};
use crate::error::ApiError;
use crate::middleware::TOKEN_HEADER;
use crate::models::{Entity, User};
use crate::state::AppState;
use crate::validation::{validate_login, validate_registration, LoginInfo, RegistrationInfo};

const DUPLICATE_EMAIL: &str = "Email already exists";
const BAD_CREDENTIALS: &str = "Email or password is incorrect";

/// Failures inside a register or login exchange.
#[derive(Debug, Error)]
enum AccountError {
    #[error("{0}")]
    Rejected(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl AccountError {
    fn into_api_error(self, state: &AppState, context: &str) -> ApiError {
        match self {
            AccountError::Rejected(message) => ApiError::bad_request(message),
            other => state.internal_error(context, other),
        }
    }
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/user/register",
    tag = "user",
    request_body = RegistrationInfo,
    responses(
        (status = 200, description = "Id of the new user", body = Value),
        (status = 400, description = "Validation failure or email already registered"),
        (status = 500, description = "Error registering user")
    )
)]
pub async fn register(State(state): State<AppState>, Json(payload): Json<Value>) -> Result<Json<Value>, ApiError> {
    let info = validate_registration(&payload).map_err(|e| ApiError::validation(e.message))?;
    let cost = state.config.security.bcrypt_cost;

    let id = scoped::<_, AccountError, _>(state.store(), move |conn| {
        Box::pin(async move {
            let email = Value::String(info.email.clone());
            if conn.find_one_by(&User::COLLECTION, "email", &email).await?.is_some() {
                return Err(AccountError::Rejected(DUPLICATE_EMAIL));
            }

            let hashed = hash_password(info.password, cost).await?;
            let user = User::new(info.name, info.email, hashed);
            user.validate().map_err(StoreError::from)?;

            let stored = conn.insert(&User::COLLECTION, user.to_body()?).await?;
            Ok(stored.id)
        })
    })
    .await
    .map_err(|e| e.into_api_error(&state, "Error registering user"))?;

    info!("Registered user {}", id);
    Ok(Json(json!({ "error": null, "data": id })))
}

/// Exchange credentials for a signed token
#[utoipa::path(
    post,
    path = "/user/login",
    tag = "user",
    request_body = LoginInfo,
    responses(
        (status = 200, description = "User id and token; the token is also sent in the auth-token header", body = Value),
        (status = 400, description = "Validation failure or incorrect credentials"),
        (status = 500, description = "Error logging in user")
    )
)]
pub async fn login(State(state): State<AppState>, Json(payload): Json<Value>) -> Result<Response, ApiError> {
    let LoginInfo { email, password } = validate_login(&payload).map_err(|e| ApiError::validation(e.message))?;

    let lookup = Value::String(email);
    let user = scoped::<_, AccountError, _>(state.store(), move |conn| {
        Box::pin(async move { Ok(conn.find_one_by(&User::COLLECTION, "email", &lookup).await?) })
    })
    .await
    .map_err(|e| e.into_api_error(&state, "Error logging in user"))?;

    let (user_id, token) = authenticate(&state, user, password)
        .await
        .map_err(|e| e.into_api_error(&state, "Error logging in user"))?;
    let header = HeaderValue::from_str(&token)
        .map_err(|e| state.internal_error("Error logging in user", e))?;

    debug!("Issued token for user {}", user_id);
    let body = Json(json!({ "error": null, "data": { "userId": user_id, "token": token } }));
    Ok(([(HeaderName::from_static(TOKEN_HEADER), header)], body).into_response())
}

/// Checks the password against the stored hash and signs a token. Unknown
/// email and wrong password are indistinguishable to the caller.
async fn authenticate(
    state: &AppState,
    stored: Option<StoredDocument>,
    password: String,
) -> Result<(String, String), AccountError> {
    let Some(stored) = stored else {
        return Err(AccountError::Rejected(BAD_CREDENTIALS));
    };
    let user = User::from_body(&stored.body).map_err(StoreError::from)?;

    if !verify_password(password, user.password).await? {
        return Err(AccountError::Rejected(BAD_CREDENTIALS));
    }

    let user_id = stored.id.to_string();
    let claims = Claims::new(
        user.name,
        user.email,
        user_id.clone(),
        state.config.security.token_expiry_hours,
    )?;
    let token = issue_token(&claims, state.token_secret())?;
    Ok((user_id, token))
}
