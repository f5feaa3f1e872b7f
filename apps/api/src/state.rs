use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::linkedin::JobBoard;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory without `DATABASE_URL`.
    pub store: Arc<dyn Store>,
    pub tokens: TokenIssuer,
    /// Outbound job board. Default: the LinkedIn stub.
    pub job_board: Arc<dyn JobBoard>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, job_board: Arc<dyn JobBoard>, config: Config) -> Self {
        let tokens = TokenIssuer::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.jwt_expires_hours),
        );
        Self {
            store,
            tokens,
            job_board,
            config,
        }
    }
}
