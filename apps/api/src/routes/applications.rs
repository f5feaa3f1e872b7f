use std::collections::HashMap;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::application::{
    Application, ApplicationSource, ApplicationStatus, StatusFilter,
};
use crate::models::job::{Job, JobRef};
use crate::models::user::User;
use crate::routes::extract::{JsonBody, UrlPath, UrlQuery};
use crate::routes::{conflict_as, double_option, non_blank};
use crate::state::AppState;
use crate::store::{ApplicationFilter, MeetingFilter};

/// Upper bound on the HR listing.
const LIST_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub job_id: Option<Uuid>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApplicationsQuery {
    pub job_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: Option<String>,
    /// `null` clears the note.
    #[serde(default, deserialize_with = "double_option")]
    pub note: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyApplicationView {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub note: Option<String>,
    pub job: Option<JobRef>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRef {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
}

impl ApplicantRef {
    fn of(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            birthdate: user.birthdate,
            address: user.address.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub note: Option<String>,
    pub source: ApplicationSource,
    pub applicant: Option<ApplicantRef>,
    pub job: Option<JobRef>,
    pub created_at: DateTime<Utc>,
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation("invalid_status"))
}

/// Jobs referenced by `applications`, keyed by id.
async fn jobs_for(
    state: &AppState,
    applications: &[Application],
) -> Result<HashMap<Uuid, Job>, AppError> {
    let mut ids: Vec<Uuid> = applications.iter().map(|a| a.job_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let jobs = state.store.jobs_by_ids(&ids).await?;
    Ok(jobs.into_iter().map(|job| (job.id, job)).collect())
}

/// POST /api/v2/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    auth.require_applicant()?;
    let applicant = auth.load(state.store.as_ref()).await?;
    let job_id = req.job_id.ok_or(AppError::Validation("missing_job_id"))?;

    let job = state
        .store
        .find_job(job_id)
        .await?
        .filter(|job| job.open)
        .ok_or(AppError::NotFound("job_not_found"))?;

    if state
        .store
        .find_application_for(job.id, applicant.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("already_applied"));
    }

    let note = non_blank(req.note.as_deref()).map(str::to_string);
    let application = Application::new(job.id, applicant.id, note);
    state
        .store
        .insert_application(&application)
        .await
        .map_err(conflict_as("already_applied"))?;

    info!(
        application_id = %application.id,
        job_id = %job.id,
        user_id = %applicant.id,
        "Application submitted"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "id": application.id,
            "status": application.status,
        })),
    ))
}

/// GET /api/v2/applications/me
pub async fn handle_my_applications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<MyApplicationView>>, AppError> {
    auth.require_applicant()?;
    let applications = state
        .store
        .list_applications(&ApplicationFilter {
            user_id: Some(auth.id),
            ..Default::default()
        })
        .await?;
    let jobs = jobs_for(&state, &applications).await?;

    let views = applications
        .into_iter()
        .map(|a| MyApplicationView {
            id: a.id,
            status: a.status,
            job: jobs.get(&a.job_id).map(JobRef::with_description),
            note: a.note,
            created_at: a.created_at,
        })
        .collect();
    Ok(Json(views))
}

/// GET /api/v2/applications?jobId=&status=
pub async fn handle_list_applications(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlQuery(query): UrlQuery<ListApplicationsQuery>,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    auth.require_staff()?;

    let statuses = match non_blank(query.status.as_deref()) {
        None => Vec::new(),
        Some(raw) => raw
            .parse::<StatusFilter>()
            .map_err(|_| AppError::Validation("invalid_status"))?
            .statuses(),
    };

    let applications = state
        .store
        .list_applications(&ApplicationFilter {
            job_id: query.job_id,
            user_id: None,
            statuses,
            limit: Some(LIST_LIMIT),
        })
        .await?;

    let jobs = jobs_for(&state, &applications).await?;
    let mut user_ids: Vec<Uuid> = applications.iter().map(|a| a.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();
    let users: HashMap<Uuid, User> = state
        .store
        .users_by_ids(&user_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    let views = applications
        .into_iter()
        .map(|a| ApplicationView {
            id: a.id,
            status: a.status,
            source: a.source,
            applicant: users.get(&a.user_id).map(ApplicantRef::of),
            job: jobs.get(&a.job_id).map(JobRef::of),
            note: a.note,
            created_at: a.created_at,
        })
        .collect();
    Ok(Json(views))
}

/// PATCH /api/v2/applications/:id
pub async fn handle_update_application(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
    JsonBody(req): JsonBody<UpdateApplicationRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_staff()?;
    if req.status.is_none() && req.note.is_none() {
        return Err(AppError::Validation("missing_fields"));
    }

    // only the applicant can withdraw
    let status = match req.status.as_deref() {
        None => None,
        Some(raw) => match parse_status(raw)? {
            ApplicationStatus::Withdrawn => return Err(AppError::Validation("invalid_status")),
            status => Some(status),
        },
    };

    let mut application = state
        .store
        .find_application(id)
        .await?
        .ok_or(AppError::NotFound("application_not_found"))?;

    if let Some(status) = status {
        let from = application.status;
        application.set_status(status, state.config.application_retention());
        info!(application_id = %id, from = %from, to = %status, "Application status changed");
    }
    if let Some(note) = req.note {
        application.note = non_blank(note.as_deref()).map(str::to_string);
        application.updated_at = Utc::now();
    }
    state.store.update_application(&application).await?;

    Ok(Json(json!({
        "ok": true,
        "id": application.id,
        "status": application.status,
    })))
}

/// PATCH /api/v2/applications/:id/withdraw
///
/// Withdrawing also cancels every open meeting of the applicant for the job.
pub async fn handle_withdraw_application(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    auth.require_applicant()?;
    let applicant = auth.load(state.store.as_ref()).await?;
    let mut application = state
        .store
        .find_application(id)
        .await?
        .filter(|a| a.user_id == applicant.id)
        .ok_or(AppError::NotFound("application_not_found"))?;

    if !application.status.can_withdraw() {
        return Err(AppError::InvalidState("invalid_state"));
    }
    application.set_status(
        ApplicationStatus::Withdrawn,
        state.config.application_retention(),
    );
    state.store.update_application(&application).await?;

    let meetings = state
        .store
        .list_meetings(&MeetingFilter {
            job_id: Some(application.job_id),
            applicant_id: Some(applicant.id),
            hr_id: None,
        })
        .await?;
    let mut cancelled = 0u64;
    for mut meeting in meetings {
        if meeting.status.is_terminal() {
            continue;
        }
        meeting.cancel()?;
        state.store.update_meeting(&meeting).await?;
        cancelled += 1;
    }

    info!(
        application_id = %id,
        cancelled_meetings = cancelled,
        "Application withdrawn"
    );
    Ok(Json(json!({
        "ok": true,
        "id": application.id,
        "status": application.status,
        "cancelledMeetings": cancelled,
    })))
}

/// DELETE /api/v2/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    auth.require_staff()?;
    if state.store.delete_application(id).await? {
        info!(application_id = %id, "Application deleted");
    }
    Ok(Json(json!({ "ok": true })))
}
