pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims embedded in issued tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub name: String,
    pub email: String,
    pub id: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Fails when `expiry_hours` puts the expiry outside the representable range.
    pub fn new(name: String, email: String, id: String, expiry_hours: i64) -> Result<Self, TokenError> {
        let now = Utc::now();
        let exp = Duration::try_hours(expiry_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| TokenError::Generation(format!("token expiry of {} hours is out of range", expiry_hours)))?;

        Ok(Self {
            name,
            email,
            id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token secret")]
    InvalidSecret,

    #[error("Token generation error: {0}")]
    Generation(String),

    #[error("{0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),
}

pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| TokenError::Generation(e.to_string()))
}

/// Check signature and expiry, returning the decoded claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
    Ok(token_data.claims)
}
