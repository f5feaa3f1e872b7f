use axum::{
    extract::State,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::application::Application;
use crate::models::user::{normalize_email, Role, User};
use crate::routes::extract::{JsonBody, UrlPath};
use crate::routes::{non_blank, optional_birthdate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportApplicantRequest {
    pub email: Option<String>,
    pub profile_url: Option<String>,
    pub name: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub job_id: Option<Uuid>,
}

/// POST /api/v2/linkedin/publish/:job_id
pub async fn handle_publish(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(job_id): UrlPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    auth.require_staff()?;
    let mut job = state
        .store
        .find_job(job_id)
        .await?
        .ok_or(AppError::NotFound("job_not_found"))?;

    let publication = state.job_board.publish(&job).await?;
    job.linkedin_post_id = Some(publication.post_id.clone());
    job.updated_at = Utc::now();
    state.store.update_job(&job).await?;

    Ok(Json(json!({
        "ok": true,
        "jobId": job.id,
        "linkedinPostId": publication.post_id,
        "url": publication.url,
    })))
}

/// DELETE /api/v2/linkedin/publish/:job_id
pub async fn handle_unpublish(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(job_id): UrlPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    auth.require_staff()?;
    let mut job = state
        .store
        .find_job(job_id)
        .await?
        .ok_or(AppError::NotFound("job_not_found"))?;

    state.job_board.unpublish(&job).await?;
    job.linkedin_post_id = None;
    job.updated_at = Utc::now();
    state.store.update_job(&job).await?;

    Ok(Json(json!({ "ok": true })))
}

/// POST /api/v2/linkedin/import-applicant
///
/// Ensures an applicant account exists for the email. Imported accounts have
/// no password. With `jobId` the applicant is also attached to the job; an
/// existing application is reused and an unknown job is skipped.
pub async fn handle_import_applicant(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<ImportApplicantRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_staff()?;
    let email = non_blank(req.email.as_deref()).ok_or(AppError::Validation("missing_email"))?;
    let birthdate = optional_birthdate(req.birthdate.as_deref())?;
    let profile_url = non_blank(req.profile_url.as_deref());

    let job = match req.job_id {
        None => None,
        Some(id) => {
            let job = state.store.find_job(id).await?;
            if job.is_none() {
                warn!(job_id = %id, "Import references an unknown job, no application created");
            }
            job
        }
    };

    let profile = state
        .job_board
        .import_profile(&normalize_email(email), req.name.as_deref(), profile_url)
        .await?;

    let user = match state.store.find_user_by_email(&profile.email).await? {
        Some(mut user) => {
            if user.role != Role::Applicant {
                return Err(AppError::Conflict("email_exists"));
            }
            // fill gaps only, never overwrite what the applicant entered
            let mut changed = false;
            if user.name.is_none() {
                user.name = Some(profile.name.clone());
                changed = true;
            }
            if user.birthdate.is_none() && birthdate.is_some() {
                user.birthdate = birthdate;
                changed = true;
            }
            if user.address.is_none() {
                if let Some(address) = non_blank(req.address.as_deref()) {
                    user.address = Some(address.to_string());
                    changed = true;
                }
            }
            if changed {
                user.updated_at = Utc::now();
                state.store.update_user(&user).await?;
            }
            user
        }
        None => {
            let mut user = User::new(&profile.email, Role::Applicant, None);
            user.name = Some(profile.name.clone());
            user.birthdate = birthdate;
            user.address = non_blank(req.address.as_deref()).map(str::to_string);
            state.store.insert_user(&user).await?;
            info!(user_id = %user.id, source = profile.source, "Applicant account created from import");
            user
        }
    };

    let application_id = match job {
        None => None,
        Some(job) => match state.store.find_application_for(job.id, user.id).await? {
            Some(existing) => Some(existing.id),
            None => {
                let application =
                    Application::imported(job.id, user.id, profile.profile_url.clone());
                state.store.insert_application(&application).await?;
                info!(
                    application_id = %application.id,
                    job_id = %job.id,
                    "Imported applicant attached to job"
                );
                Some(application.id)
            }
        },
    };

    let mut body = json!({ "ok": true, "userId": user.id });
    if let Some(id) = application_id {
        body["applicationId"] = json!(id);
    }
    Ok(Json(body))
}
