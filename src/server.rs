use anyhow::Context;
use tracing::{info, warn};
use url::Url;

use crate::routes;
use crate::state::AppState;

/// Opens and closes one store connection so a misconfigured store shows up
/// in the startup log. The server starts either way.
pub async fn check_connection(state: &AppState) -> bool {
    let store = state.store();
    match store.connect().await {
        Ok(conn) => {
            if let Err(e) = conn.close().await {
                warn!("Connected to {} store but failed to disconnect: {}", store.backend(), e);
            }
            info!("Connected to {} store", store.backend());
            true
        }
        Err(e) => {
            warn!("Unable to connect to {} store: {}", store.backend(), e);
            false
        }
    }
}

/// Connection URL with credentials removed, for logging.
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}

pub async fn start(state: AppState) -> anyhow::Result<()> {
    let bind_addr = state.config.bind_addr();
    check_connection(&state).await;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Alt apps API listening on http://{}{}", bind_addr, routes::BASE_PATH);
    axum::serve(listener, routes::app(state)).await.context("server error")?;
    Ok(())
}
