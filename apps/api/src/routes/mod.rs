pub mod account;
pub mod agencies;
pub mod applications;
pub mod auth;
pub mod extract;
pub mod health;
pub mod jobs;
pub mod linkedin;
pub mod meetings;
pub mod partner;
pub mod users;

#[cfg(test)]
mod tests;

use axum::{
    routing::{get, patch, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::errors::AppError;
use crate::models::user::parse_birthdate;
use crate::state::AppState;
use crate::store::StoreError;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        // Public
        .route("/api/public/register", post(auth::handle_register))
        .route("/api/public/jobs", get(jobs::handle_public_jobs))
        .route("/api/public/jobs/:id", get(jobs::handle_public_job))
        // Auth
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/me", get(auth::handle_me))
        .route(
            "/api/auth/bootstrap-admin",
            post(auth::handle_bootstrap_admin),
        )
        // Admin: users
        .route(
            "/api/v2/users",
            get(users::handle_list_users).post(users::handle_create_user),
        )
        .route(
            "/api/v2/users/:id",
            patch(users::handle_update_user).delete(users::handle_delete_user),
        )
        // Applicant self-service
        .route(
            "/api/v2/account/profile",
            get(account::handle_get_profile).put(account::handle_update_profile),
        )
        .route(
            "/api/v2/account/request-deletion",
            post(account::handle_request_deletion).delete(account::handle_cancel_deletion),
        )
        // HR: jobs
        .route(
            "/api/v2/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/v2/jobs/:id",
            patch(jobs::handle_update_job).delete(jobs::handle_delete_job),
        )
        // Applications
        .route(
            "/api/v2/applications",
            get(applications::handle_list_applications)
                .post(applications::handle_create_application),
        )
        .route(
            "/api/v2/applications/me",
            get(applications::handle_my_applications),
        )
        .route(
            "/api/v2/applications/:id",
            patch(applications::handle_update_application)
                .delete(applications::handle_delete_application),
        )
        .route(
            "/api/v2/applications/:id/withdraw",
            patch(applications::handle_withdraw_application),
        )
        // Meetings
        .route(
            "/api/v2/meetings",
            get(meetings::handle_list_meetings).post(meetings::handle_create_meeting),
        )
        .route("/api/v2/meetings/me", get(meetings::handle_my_meetings))
        .route(
            "/api/v2/meetings/:id",
            patch(meetings::handle_update_meeting).delete(meetings::handle_delete_meeting),
        )
        .route(
            "/api/v2/meetings/:id/select-slot",
            post(meetings::handle_select_slot),
        )
        .route(
            "/api/v2/meetings/:id/request-reschedule",
            post(meetings::handle_request_reschedule),
        )
        .route(
            "/api/v2/meetings/:id/reschedule",
            post(meetings::handle_reschedule),
        )
        .route("/api/v2/meetings/:id/cancel", post(meetings::handle_cancel))
        // LinkedIn stub
        .route(
            "/api/v2/linkedin/publish/:job_id",
            post(linkedin::handle_publish).delete(linkedin::handle_unpublish),
        )
        .route(
            "/api/v2/linkedin/import-applicant",
            post(linkedin::handle_import_applicant),
        )
        // Admin: agencies
        .route(
            "/api/v2/agencies",
            get(agencies::handle_list_agencies).post(agencies::handle_create_agency),
        )
        .route(
            "/api/v2/agencies/:id",
            patch(agencies::handle_update_agency).delete(agencies::handle_delete_agency),
        )
        .route(
            "/api/v2/agencies/:id/rotate-key",
            post(agencies::handle_rotate_key),
        )
        // Partner API (x-api-key)
        .route("/api/agency/jobs", get(partner::handle_partner_jobs))
        .route(
            "/api/agency/applications",
            get(partner::handle_partner_applications),
        )
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Request helpers shared by the handlers
// ────────────────────────────────────────────────────────────────────────────

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in PATCH bodies.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trimmed value, or `None` when missing or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn optional_birthdate(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(raw) => parse_birthdate(raw)
            .map(Some)
            .ok_or(AppError::Validation("invalid_birthdate")),
    }
}

/// Maps a unique-constraint failure to a domain-specific conflict reason.
pub(crate) fn conflict_as(reason: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |err| match err {
        StoreError::Conflict => AppError::Conflict(reason),
        other => AppError::Store(other),
    }
}
