use anyhow::{Context, Result};

/// bcrypt is deliberately slow, so hashing runs on the blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("password hashing task failed")?
        .context("failed to hash password")
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("password verification task failed")?
        .context("stored password hash is malformed")
}
