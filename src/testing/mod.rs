//! Helpers for driving the router in-process against the memory store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::database::MemoryStore;
use crate::middleware::TOKEN_HEADER;
use crate::routes;
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret";

/// Router plus a handle on the store behind it.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        let state = AppState::new(config, Arc::new(store.clone()));
        Self {
            router: routes::app(state),
            store,
        }
    }

    /// Registers a fresh user and returns a token for it.
    pub async fn token(&self) -> String {
        register(&self.router, "Token Holder", "holder@x.com", "secret1").await;
        let res = login(&self.router, "holder@x.com", "secret1").await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.text());
        res.json()["data"]["token"].as_str().expect("token").to_string()
    }

    /// Creates a program and returns its id.
    pub async fn create_program(&self, token: &str, name: &str) -> String {
        let body = json!({ "name": name, "logo": "l.png", "country": "US" });
        let res = send(&self.router, Method::POST, "/aa-api/programs", Some(token), Some(body)).await;
        assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.text());
        res.json()["_id"].as_str().expect("id").to_string()
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.token_secret = TEST_SECRET.to_string();
    config.security.bcrypt_cost = 4;
    config
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub async fn send(router: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(TOKEN_HEADER, token);
    }
    let request = match body {
        Some(body) => request
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    let response = router.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body").to_vec();

    TestResponse { status, headers, body }
}

pub async fn register(router: &Router, name: &str, email: &str, password: &str) -> TestResponse {
    let body = json!({ "name": name, "email": email, "password": password });
    send(router, Method::POST, "/aa-api/user/register", None, Some(body)).await
}

pub async fn login(router: &Router, email: &str, password: &str) -> TestResponse {
    let body = json!({ "email": email, "password": password });
    send(router, Method::POST, "/aa-api/user/login", None, Some(body)).await
}
