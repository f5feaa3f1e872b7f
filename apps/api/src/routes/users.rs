use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::{normalize_email, Role, User, UserView};
use crate::routes::extract::{JsonBody, UrlPath};
use crate::routes::{conflict_as, double_option, non_blank, optional_birthdate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub role: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birthdate: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
}

fn parse_role(raw: &str) -> Result<Role, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation("invalid_role"))
}

/// GET /api/v2/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserView>>, AppError> {
    auth.require_admin()?;
    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(User::view).collect()))
}

/// POST /api/v2/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    auth.require_admin()?;

    let (email, password, role) = match (
        non_blank(req.email.as_deref()),
        req.password.as_deref().filter(|p| !p.is_empty()),
        non_blank(req.role.as_deref()),
    ) {
        (Some(email), Some(password), Some(role)) => (email, password, role),
        _ => return Err(AppError::Validation("missing_fields")),
    };
    let role = parse_role(role)?;
    let birthdate = optional_birthdate(req.birthdate.as_deref())?;

    if state
        .store
        .find_user_by_email(&normalize_email(email))
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("email_exists"));
    }

    let hash = hash_password(password, state.config.bcrypt_cost).await?;
    let mut user = User::new(email, role, Some(hash));
    user.name = non_blank(req.name.as_deref()).map(str::to_string);
    user.birthdate = birthdate;
    user.address = non_blank(req.address.as_deref()).map(str::to_string);

    state
        .store
        .insert_user(&user)
        .await
        .map_err(conflict_as("email_exists"))?;

    info!(user_id = %user.id, role = %user.role, created_by = %auth.id, "User created");
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "id": user.id }))))
}

/// PATCH /api/v2/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_admin()?;
    let mut user = state
        .store
        .find_user(id)
        .await?
        .ok_or(AppError::NotFound("user_not_found"))?;

    if let Some(role) = req.role.as_deref() {
        user.role = parse_role(role)?;
    }
    if let Some(password) = req.password.as_deref().filter(|p| !p.is_empty()) {
        user.password_hash = Some(hash_password(password, state.config.bcrypt_cost).await?);
    }
    if let Some(name) = req.name {
        user.name = non_blank(name.as_deref()).map(str::to_string);
    }
    if let Some(birthdate) = req.birthdate {
        user.birthdate = optional_birthdate(birthdate.as_deref())?;
    }
    if let Some(address) = req.address {
        user.address = non_blank(address.as_deref()).map(str::to_string);
    }
    user.updated_at = Utc::now();
    state.store.update_user(&user).await?;

    Ok(Json(json!({ "ok": true })))
}

/// DELETE /api/v2/users/:id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    auth.require_admin()?;
    if state.store.delete_user(id).await? {
        info!(user_id = %id, deleted_by = %auth.id, "User deleted");
    }
    Ok(Json(json!({ "ok": true })))
}
