//! Applicant self-service: profile edits and the account deletion request.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::UserView;
use crate::routes::extract::JsonBody;
use crate::routes::{double_option, non_blank, optional_birthdate};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birthdate: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
}

/// GET /api/v2/account/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserView>, AppError> {
    let user = auth.load(state.store.as_ref()).await?;
    Ok(Json(user.view()))
}

/// PUT /api/v2/account/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<UserView>, AppError> {
    let mut user = auth.load(state.store.as_ref()).await?;

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

    Ok(Json(user.view()))
}

/// POST /api/v2/account/request-deletion
///
/// The account and everything attached to it is purged by the retention
/// worker once the grace period has passed.
pub async fn handle_request_deletion(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    auth.require_applicant()?;
    let mut user = auth.load(state.store.as_ref()).await?;

    let now = Utc::now();
    let due = now + state.config.account_deletion_grace();
    user.deletion_requested_at = Some(now);
    user.deletion_due_at = Some(due);
    user.updated_at = now;
    state.store.update_user(&user).await?;

    info!(user_id = %user.id, due = %due, "Account deletion requested");
    Ok(Json(json!({ "ok": true, "deletionDueAt": due })))
}

/// DELETE /api/v2/account/request-deletion
pub async fn handle_cancel_deletion(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    auth.require_applicant()?;
    let mut user = auth.load(state.store.as_ref()).await?;

    user.deletion_requested_at = None;
    user.deletion_due_at = None;
    user.updated_at = Utc::now();
    state.store.update_user(&user).await?;

    info!(user_id = %user.id, "Account deletion request withdrawn");
    Ok(Json(json!({ "ok": true })))
}
