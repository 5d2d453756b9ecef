mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_then_login_returns_token_in_body_and_header() -> Result<()> {
    let server = common::start_server().await?;

    let resp = server.register("Alice Smith", "alice@x.com", "secret1").await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"], Value::Null);
    let user_id = body["data"].as_str().context("user id")?.to_string();

    let resp = server.login("alice@x.com", "secret1").await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let header = resp
        .headers()
        .get(common::TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .context("auth-token header")?;
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["userId"], json!(user_id));
    assert_eq!(body["data"]["token"], json!(header));
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_rejected() -> Result<()> {
    let server = common::start_server().await?;

    server.register("Alice Smith", "alice@x.com", "secret1").await?;
    let resp = server.register("Alice Smith", "alice@x.com", "secret1").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>().await?, json!({ "error": "Email already exists" }));
    Ok(())
}

#[tokio::test]
async fn bad_credentials_get_a_generic_message() -> Result<()> {
    let server = common::start_server().await?;
    server.register("Alice Smith", "alice@x.com", "secret1").await?;

    let resp = server.login("alice@x.com", "wrong-password").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>().await?, json!({ "error": "Email or password is incorrect" }));

    let resp = server.login("not-an-email", "secret1").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>().await?, json!({ "error": "\"email\" must be a valid email" }));
    Ok(())
}
