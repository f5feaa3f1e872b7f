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

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::agency::{Agency, AgencyView, Permission};
use crate::routes::extract::{JsonBody, UrlPath};
use crate::routes::non_blank;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAgencyRequest {
    pub name: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAgencyRequest {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub permissions: Option<Vec<String>>,
}

fn parse_permissions(raw: &[String]) -> Result<Vec<Permission>, AppError> {
    let mut permissions = Vec::with_capacity(raw.len());
    for value in raw {
        let permission: Permission = value
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("invalid_permission"))?;
        if !permissions.contains(&permission) {
            permissions.push(permission);
        }
    }
    Ok(permissions)
}

async fn find_agency(state: &AppState, id: Uuid) -> Result<Agency, AppError> {
    state
        .store
        .find_agency(id)
        .await?
        .ok_or(AppError::NotFound("agency_not_found"))
}

/// GET /api/v2/agencies
pub async fn handle_list_agencies(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<AgencyView>>, AppError> {
    auth.require_admin()?;
    let agencies = state.store.list_agencies().await?;
    Ok(Json(agencies.iter().map(Agency::view).collect()))
}

/// POST /api/v2/agencies
///
/// The API key is only ever returned here and by rotate-key.
pub async fn handle_create_agency(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<CreateAgencyRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    auth.require_admin()?;
    let name = non_blank(req.name.as_deref()).ok_or(AppError::Validation("missing_name"))?;
    let permissions = match req.permissions.as_deref() {
        Some(raw) => parse_permissions(raw)?,
        None => Permission::DEFAULT.to_vec(),
    };

    let agency = Agency::new(name.to_string(), permissions);
    state.store.insert_agency(&agency).await?;

    info!(agency_id = %agency.id, name = %agency.name, "Agency created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "id": agency.id, "apiKey": agency.api_key })),
    ))
}

/// PATCH /api/v2/agencies/:id
pub async fn handle_update_agency(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
    JsonBody(req): JsonBody<UpdateAgencyRequest>,
) -> Result<Json<AgencyView>, AppError> {
    auth.require_admin()?;
    let mut agency = find_agency(&state, id).await?;

    if let Some(name) = req.name.as_deref() {
        agency.name = non_blank(Some(name))
            .ok_or(AppError::Validation("missing_name"))?
            .to_string();
    }
    if let Some(active) = req.active {
        agency.active = active;
    }
    if let Some(raw) = req.permissions.as_deref() {
        agency.permissions = parse_permissions(raw)?;
    }
    agency.updated_at = Utc::now();
    state.store.update_agency(&agency).await?;

    Ok(Json(agency.view()))
}

/// POST /api/v2/agencies/:id/rotate-key
pub async fn handle_rotate_key(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    auth.require_admin()?;
    let mut agency = find_agency(&state, id).await?;

    let api_key = agency.rotate_key().to_string();
    state.store.update_agency(&agency).await?;

    info!(agency_id = %id, "Agency API key rotated");
    Ok(Json(json!({ "ok": true, "apiKey": api_key })))
}

/// DELETE /api/v2/agencies/:id
pub async fn handle_delete_agency(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    auth.require_admin()?;
    if state.store.delete_agency(id).await? {
        info!(agency_id = %id, "Agency deleted");
    }
    Ok(Json(json!({ "ok": true })))
}
