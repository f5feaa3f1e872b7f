mod auth;
mod config;
mod db;
mod errors;
mod linkedin;
mod models;
mod retention;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::linkedin::LinkedInStub;
use crate::retention::spawn_retention_worker;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Chocadies API v{}", env!("CARGO_PKG_VERSION"));

    if config.uses_default_jwt_secret() {
        warn!("JWT_SECRET is not set; tokens are signed with the development secret");
    }
    if config.bootstrap_secret.is_none() {
        info!("BOOTSTRAP_SECRET is not set; admin bootstrap is disabled");
    }

    let store: Arc<dyn Store> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = create_pool(url).await?;
            info!("PostgreSQL store initialized");
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    spawn_retention_worker(
        store.clone(),
        Duration::from_secs(config.retention_interval_secs.max(1)),
    );
    info!(
        "Retention worker running every {}s",
        config.retention_interval_secs
    );

    let state = AppState::new(store, Arc::new(LinkedInStub), config.clone());

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
