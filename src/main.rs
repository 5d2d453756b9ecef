use std::sync::Arc;

use alt_apps_api::{
    config::AppConfig,
    database::{DocumentStore, MemoryStore, PgDocumentStore},
    models, server,
    state::AppState,
};
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "alt-apps-api")]
#[command(about = "Alternative Apps API server")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, value_enum, default_value = "postgres", help = "Document store backend")]
    store: StoreKind,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreKind {
    Postgres,
    Memory,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and TOKEN_SECRET can live there
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    info!("Starting Alt apps API in {:?} mode", config.environment);
    if config.security.token_secret.is_empty() {
        warn!("TOKEN_SECRET is not set; login and protected routes will fail");
    }

    let store: Arc<dyn DocumentStore> = match cli.store {
        StoreKind::Memory => {
            info!("Using in-memory document store");
            Arc::new(MemoryStore::new())
        }
        StoreKind::Postgres => {
            let store = PgDocumentStore::from_config(&config.database)?;
            if let Some(url) = &config.database.url {
                info!("Using PostgreSQL document store at {}", server::redact_url(url));
            }
            if let Err(e) = store.bootstrap(models::COLLECTIONS).await {
                error!("Failed to prepare collections: {}", e);
            }
            Arc::new(store)
        }
    };

    server::start(AppState::new(config, store)).await
}
