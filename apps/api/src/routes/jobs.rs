use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::job::{Job, PublicJobView};
use crate::routes::extract::{JsonBody, UrlPath};
use crate::routes::non_blank;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub open: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub open: Option<bool>,
}

/// GET /api/public/jobs
pub async fn handle_public_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicJobView>>, AppError> {
    let jobs = state.store.list_jobs(true).await?;
    Ok(Json(jobs.iter().map(Job::public_view).collect()))
}

/// GET /api/public/jobs/:id
pub async fn handle_public_job(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Json<PublicJobView>, AppError> {
    let job = state
        .store
        .find_job(id)
        .await?
        .filter(|job| job.open)
        .ok_or(AppError::NotFound("job_not_found"))?;
    Ok(Json(job.public_view()))
}

/// GET /api/v2/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Job>>, AppError> {
    auth.require_staff()?;
    Ok(Json(state.store.list_jobs(false).await?))
}

/// POST /api/v2/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    auth.require_staff()?;
    let title = non_blank(req.title.as_deref()).ok_or(AppError::Validation("missing_title"))?;

    let job = Job::new(
        title.to_string(),
        req.short_description.unwrap_or_default(),
        req.description.unwrap_or_default(),
        req.open.unwrap_or(true),
    );
    state.store.insert_job(&job).await?;

    info!(job_id = %job.id, created_by = %auth.id, "Job created");
    Ok((StatusCode::CREATED, Json(job)))
}

/// PATCH /api/v2/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
    JsonBody(req): JsonBody<UpdateJobRequest>,
) -> Result<Json<Job>, AppError> {
    auth.require_staff()?;
    let mut job = state
        .store
        .find_job(id)
        .await?
        .ok_or(AppError::NotFound("job_not_found"))?;

    if let Some(title) = req.title {
        job.title = non_blank(Some(&title))
            .ok_or(AppError::Validation("missing_title"))?
            .to_string();
    }
    if let Some(short_description) = req.short_description {
        job.short_description = short_description;
    }
    if let Some(description) = req.description {
        job.description = description;
    }
    if let Some(open) = req.open {
        job.open = open;
    }
    job.updated_at = chrono::Utc::now();
    state.store.update_job(&job).await?;

    Ok(Json(job))
}

/// DELETE /api/v2/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    auth.require_staff()?;
    if state.store.delete_job(id).await? {
        info!(job_id = %id, "Job deleted with its applications and meetings");
    }
    Ok(Json(json!({ "ok": true })))
}
