use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_JWT_SECRET: &str = "dev-secret";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the in-memory store is used.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expires_hours: i64,
    /// Unset disables `POST /api/auth/bootstrap-admin`.
    pub bootstrap_secret: Option<String>,
    pub bcrypt_cost: u32,
    pub port: u16,
    pub rust_log: String,
    pub retention_interval_secs: u64,
    pub application_retention_days: i64,
    pub account_deletion_grace_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            jwt_secret: optional_env("JWT_SECRET")
                .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            jwt_expires_hours: parsed_env("JWT_EXPIRES_HOURS", 24)?,
            bootstrap_secret: optional_env("BOOTSTRAP_SECRET"),
            bcrypt_cost: parsed_env("BCRYPT_COST", 10)?,
            port: parsed_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            retention_interval_secs: parsed_env("RETENTION_INTERVAL_SECS", 3600)?,
            application_retention_days: parsed_env("APPLICATION_RETENTION_DAYS", 180)?,
            account_deletion_grace_days: parsed_env("ACCOUNT_DELETION_GRACE_DAYS", 30)?,
        })
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn application_retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.application_retention_days)
    }

    pub fn account_deletion_grace(&self) -> chrono::Duration {
        chrono::Duration::days(self.account_deletion_grace_days)
    }
}

/// Empty values count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by handler tests: no database, fast hashing.
    pub fn for_tests() -> Self {
        Config {
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            jwt_expires_hours: 1,
            bootstrap_secret: Some("let-me-in".to_string()),
            bcrypt_cost: 4,
            port: 0,
            rust_log: "debug".to_string(),
            retention_interval_secs: 3600,
            application_retention_days: 180,
            account_deletion_grace_days: 30,
        }
    }
}
