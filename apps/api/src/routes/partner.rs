//! Read-only partner API for recruiting agencies, authenticated by the
//! `x-api-key` header.

use std::collections::HashMap;

use axum::{
    extract::State,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::auth::AgencyAuth;
use crate::errors::AppError;
use crate::models::agency::Permission;
use crate::models::application::ApplicationStatus;
use crate::routes::extract::UrlQuery;
use crate::state::AppState;
use crate::store::ApplicationFilter;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerJobView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub linkedin_post_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PartnerApplicantRef {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerApplicationView {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub job_id: Uuid,
    pub applicant: Option<PartnerApplicantRef>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerApplicationsQuery {
    pub job_id: Option<Uuid>,
}

/// GET /api/agency/jobs
pub async fn handle_partner_jobs(
    State(state): State<AppState>,
    auth: AgencyAuth,
) -> Result<Json<Vec<PartnerJobView>>, AppError> {
    auth.require(Permission::JobsRead)?;
    let jobs = state.store.list_jobs(true).await?;
    debug!(agency_id = %auth.0.id, count = jobs.len(), "Partner listed jobs");

    Ok(Json(
        jobs.into_iter()
            .map(|job| PartnerJobView {
                id: job.id,
                title: job.title,
                description: job.description,
                linkedin_post_id: job.linkedin_post_id,
            })
            .collect(),
    ))
}

/// GET /api/agency/applications?jobId=
pub async fn handle_partner_applications(
    State(state): State<AppState>,
    auth: AgencyAuth,
    UrlQuery(query): UrlQuery<PartnerApplicationsQuery>,
) -> Result<Json<Vec<PartnerApplicationView>>, AppError> {
    auth.require(Permission::ApplicationsRead)?;
    let applications = state
        .store
        .list_applications(&ApplicationFilter {
            job_id: query.job_id,
            ..Default::default()
        })
        .await?;

    let mut user_ids: Vec<Uuid> = applications.iter().map(|a| a.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();
    let emails: HashMap<Uuid, String> = state
        .store
        .users_by_ids(&user_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user.email))
        .collect();
    debug!(agency_id = %auth.0.id, count = applications.len(), "Partner listed applications");

    Ok(Json(
        applications
            .into_iter()
            .map(|a| PartnerApplicationView {
                id: a.id,
                status: a.status,
                job_id: a.job_id,
                applicant: emails
                    .get(&a.user_id)
                    .map(|email| PartnerApplicantRef { email: email.clone() }),
                created_at: a.created_at,
            })
            .collect(),
    ))
}
