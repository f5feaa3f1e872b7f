use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::{normalize_email, Role, User};
use crate::routes::extract::JsonBody;
use crate::routes::{conflict_as, non_blank, optional_birthdate};
use crate::state::AppState;

pub const BOOTSTRAP_SECRET_HEADER: &str = "x-bootstrap-secret";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Both fields present and non-blank; the password is not trimmed.
fn credentials<'a>(
    email: Option<&'a str>,
    password: Option<&'a str>,
) -> Result<(&'a str, &'a str), AppError> {
    match (non_blank(email), password.filter(|p| !p.is_empty())) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(AppError::Validation("missing_fields")),
    }
}

/// POST /api/public/register
pub async fn handle_register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (email, password) = credentials(req.email.as_deref(), req.password.as_deref())?;
    let birthdate = optional_birthdate(req.birthdate.as_deref())?;

    if state
        .store
        .find_user_by_email(&normalize_email(email))
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("email_already_registered"));
    }

    let hash = hash_password(password, state.config.bcrypt_cost).await?;
    let mut user = User::new(email, Role::Applicant, Some(hash));
    user.name = non_blank(req.name.as_deref()).map(str::to_string);
    user.birthdate = birthdate;
    user.address = non_blank(req.address.as_deref()).map(str::to_string);

    state
        .store
        .insert_user(&user)
        .await
        .map_err(conflict_as("email_already_registered"))?;

    info!(user_id = %user.id, "Applicant registered");
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "id": user.id }))))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (email, password) = credentials(req.email.as_deref(), req.password.as_deref())?;

    let user = state
        .store
        .find_user_by_email(&normalize_email(email))
        .await?
        .ok_or(AppError::Unauthorized("invalid_credentials"))?;

    // imported accounts have no password and cannot log in
    let hash = user
        .password_hash
        .as_deref()
        .ok_or(AppError::Unauthorized("invalid_credentials"))?;
    if !verify_password(password, hash).await? {
        return Err(AppError::Unauthorized("invalid_credentials"));
    }

    let token = state
        .tokens
        .issue(&user)
        .map_err(|e| AppError::Internal(e.into()))?;

    info!(user_id = %user.id, role = %user.role, "User logged in");
    Ok(Json(LoginResponse {
        token,
        email: user.email,
        role: user.role,
    }))
}

/// GET /api/auth/me
pub async fn handle_me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth.id,
        email: auth.email,
        role: auth.role,
    })
}

/// POST /api/auth/bootstrap-admin
///
/// Creates the first admin, or promotes an existing account. Disabled unless
/// `BOOTSTRAP_SECRET` is configured.
pub async fn handle_bootstrap_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<Json<Value>, AppError> {
    let presented = headers
        .get(BOOTSTRAP_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    match (state.config.bootstrap_secret.as_deref(), presented) {
        (Some(expected), Some(presented)) if expected == presented => {}
        _ => {
            warn!("Rejected admin bootstrap attempt");
            return Err(AppError::Forbidden);
        }
    }

    let (email, password) = credentials(req.email.as_deref(), req.password.as_deref())?;

    let user = match state
        .store
        .find_user_by_email(&normalize_email(email))
        .await?
    {
        None => {
            let hash = hash_password(password, state.config.bcrypt_cost).await?;
            let user = User::new(email, Role::Admin, Some(hash));
            state.store.insert_user(&user).await?;
            info!(user_id = %user.id, "Bootstrapped admin account");
            user
        }
        Some(mut user) if user.role != Role::Admin => {
            user.role = Role::Admin;
            user.updated_at = chrono::Utc::now();
            state.store.update_user(&user).await?;
            info!(user_id = %user.id, "Promoted existing account to admin");
            user
        }
        Some(user) => user,
    };

    Ok(Json(json!({
        "ok": true,
        "user": { "id": user.id, "email": user.email, "role": user.role }
    })))
}
