//! Interview scheduling endpoints.
//!
//! HR opens a meeting with candidate slots, the applicant picks one or asks
//! for new dates, and either side can cancel. All status moves go through
//! [`Meeting`]'s workflow methods.

use std::collections::HashMap;

use axum::{
    extract::State,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::application::ApplicationStatus;
use crate::models::job::JobRef;
use crate::models::meeting::{
    Meeting, MeetingDraft, MeetingMode, MeetingStatus, SchedulingError, TimeSlot,
};
use crate::models::user::{normalize_email, Role, User};
use crate::routes::extract::{JsonBody, UrlPath, UrlQuery};
use crate::routes::non_blank;
use crate::state::AppState;
use crate::store::MeetingFilter;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotInput {
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    pub job_id: Option<Uuid>,
    pub applicant_email: Option<String>,
    #[serde(default)]
    pub time_slots: Vec<SlotInput>,
    /// Single-slot form.
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub mode: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeetingRequest {
    pub mode: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSlotRequest {
    pub slot_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlotsRequest {
    #[serde(default)]
    pub time_slots: Vec<SlotInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeetingsQuery {
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingApplicantRef {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingView {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub hr_id: Uuid,
    pub created_by: Role,
    pub status: MeetingStatus,
    pub time_slots: Vec<TimeSlot>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub mode: MeetingMode,
    pub location: String,
    pub notes: String,
    pub reschedule_reason: Option<String>,
    pub job: Option<JobRef>,
    pub applicant: Option<MeetingApplicantRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingView {
    fn new(m: Meeting, job: Option<JobRef>, applicant: Option<&User>) -> Self {
        Self {
            id: m.id,
            job_id: m.job_id,
            applicant_id: m.applicant_id,
            hr_id: m.hr_id,
            created_by: m.created_by,
            status: m.status,
            time_slots: m.time_slots,
            starts_at: m.starts_at,
            ends_at: m.ends_at,
            mode: m.mode,
            location: m.location,
            notes: m.notes,
            reschedule_reason: m.reschedule_reason,
            job,
            applicant: applicant.map(|u| MeetingApplicantRef {
                id: u.id,
                email: u.email.clone(),
                name: u.name.clone(),
            }),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn parse_instant(raw: Option<&str>) -> Result<DateTime<Utc>, AppError> {
    let raw = non_blank(raw).ok_or(AppError::Validation("missing_fields"))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::Validation("invalid_time_slot"))
}

/// Validates every slot; an empty list is `missing_fields`.
fn parse_slots(inputs: &[SlotInput]) -> Result<Vec<TimeSlot>, AppError> {
    if inputs.is_empty() {
        return Err(SchedulingError::NoSlots.into());
    }
    inputs
        .iter()
        .map(|input| -> Result<TimeSlot, AppError> {
            let starts_at = parse_instant(input.starts_at.as_deref())?;
            let ends_at = parse_instant(input.ends_at.as_deref())?;
            Ok(TimeSlot::new(starts_at, ends_at)?)
        })
        .collect()
}

fn parse_mode(raw: Option<&str>) -> Result<Option<MeetingMode>, AppError> {
    non_blank(raw)
        .map(|mode| mode.parse().map_err(|_| AppError::Validation("invalid_mode")))
        .transpose()
}

/// Loads a meeting the caller may act on. Applicants only see their own;
/// anyone else's meeting is reported as missing.
async fn load_meeting(state: &AppState, auth: &AuthUser, id: Uuid) -> Result<Meeting, AppError> {
    state
        .store
        .find_meeting(id)
        .await?
        .filter(|m| auth.role.is_staff() || m.applicant_id == auth.id)
        .ok_or(AppError::NotFound("not_found"))
}

async fn save(state: &AppState, meeting: &Meeting) -> Result<Json<Value>, AppError> {
    state.store.update_meeting(meeting).await?;
    Ok(Json(json!({
        "ok": true,
        "id": meeting.id,
        "status": meeting.status,
        "startsAt": meeting.starts_at,
        "endsAt": meeting.ends_at,
    })))
}

/// Attaches job and applicant references to each meeting.
async fn enrich(state: &AppState, meetings: Vec<Meeting>) -> Result<Vec<MeetingView>, AppError> {
    let mut job_ids: Vec<Uuid> = meetings.iter().map(|m| m.job_id).collect();
    job_ids.sort_unstable();
    job_ids.dedup();
    let mut user_ids: Vec<Uuid> = meetings.iter().map(|m| m.applicant_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let jobs: HashMap<Uuid, JobRef> = state
        .store
        .jobs_by_ids(&job_ids)
        .await?
        .iter()
        .map(|job| (job.id, JobRef::of(job)))
        .collect();
    let users: HashMap<Uuid, User> = state
        .store
        .users_by_ids(&user_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    Ok(meetings
        .into_iter()
        .map(|m| {
            let job = jobs.get(&m.job_id).cloned();
            let applicant = users.get(&m.applicant_id);
            MeetingView::new(m, job, applicant)
        })
        .collect())
}

/// POST /api/v2/meetings
pub async fn handle_create_meeting(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<CreateMeetingRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_staff()?;
    let organizer = auth.load(state.store.as_ref()).await?;

    let job_id = req.job_id.ok_or(AppError::Validation("missing_fields"))?;
    let email = non_blank(req.applicant_email.as_deref())
        .ok_or(AppError::Validation("missing_fields"))?;
    let slots = if req.time_slots.is_empty() && req.starts_at.is_some() {
        parse_slots(&[SlotInput {
            starts_at: req.starts_at.clone(),
            ends_at: req.ends_at.clone(),
        }])?
    } else {
        parse_slots(&req.time_slots)?
    };
    let mode = parse_mode(req.mode.as_deref())?.unwrap_or(MeetingMode::Online);

    let job = state
        .store
        .find_job(job_id)
        .await?
        .ok_or(AppError::NotFound("job_not_found"))?;
    let applicant = state
        .store
        .find_user_by_email(&normalize_email(email))
        .await?
        .filter(|user| user.role == Role::Applicant)
        .ok_or(AppError::NotFound("applicant_not_found"))?;

    let in_review = state
        .store
        .find_application_for(job.id, applicant.id)
        .await?
        .is_some_and(|a| a.status == ApplicationStatus::InReview);
    if !in_review {
        return Err(AppError::Validation("applicant_must_be_in_review_status"));
    }

    let meeting = Meeting::propose(MeetingDraft {
        job_id: job.id,
        applicant_id: applicant.id,
        hr_id: organizer.id,
        created_by: organizer.role,
        time_slots: slots,
        mode,
        location: req.location.unwrap_or_default(),
        notes: req.notes.unwrap_or_default(),
    })?;
    state.store.insert_meeting(&meeting).await?;

    info!(
        meeting_id = %meeting.id,
        job_id = %job.id,
        applicant_id = %applicant.id,
        slots = meeting.time_slots.len(),
        "Meeting proposed"
    );
    Ok(Json(json!({
        "ok": true,
        "id": meeting.id,
        "status": meeting.status,
    })))
}

/// GET /api/v2/meetings/me
///
/// Applicants get the meetings they are invited to, staff the ones they
/// created.
pub async fn handle_my_meetings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<MeetingView>>, AppError> {
    let filter = if auth.role == Role::Applicant {
        MeetingFilter {
            applicant_id: Some(auth.id),
            ..Default::default()
        }
    } else {
        MeetingFilter {
            hr_id: Some(auth.id),
            ..Default::default()
        }
    };
    let meetings = state.store.list_meetings(&filter).await?;
    Ok(Json(enrich(&state, meetings).await?))
}

/// GET /api/v2/meetings?jobId=
pub async fn handle_list_meetings(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlQuery(query): UrlQuery<ListMeetingsQuery>,
) -> Result<Json<Vec<MeetingView>>, AppError> {
    auth.require_staff()?;
    let meetings = state
        .store
        .list_meetings(&MeetingFilter {
            job_id: query.job_id,
            ..Default::default()
        })
        .await?;
    Ok(Json(enrich(&state, meetings).await?))
}

/// PATCH /api/v2/meetings/:id
pub async fn handle_update_meeting(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
    JsonBody(req): JsonBody<UpdateMeetingRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_staff()?;
    let mut meeting = load_meeting(&state, &auth, id).await?;

    if let Some(mode) = parse_mode(req.mode.as_deref())? {
        meeting.mode = mode;
    }
    if let Some(location) = req.location {
        meeting.location = location;
    }
    if let Some(notes) = req.notes {
        meeting.notes = notes;
    }
    match non_blank(req.status.as_deref()) {
        None => {}
        Some("cancelled") => meeting.cancel()?,
        Some("completed") => meeting.complete()?,
        Some(_) => return Err(AppError::Validation("invalid_status")),
    }
    meeting.updated_at = Utc::now();

    info!(meeting_id = %id, status = %meeting.status, "Meeting updated");
    save(&state, &meeting).await
}

/// POST /api/v2/meetings/:id/select-slot
pub async fn handle_select_slot(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
    JsonBody(req): JsonBody<SelectSlotRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_applicant()?;
    let slot_id = req.slot_id.ok_or(AppError::Validation("missing_fields"))?;
    let mut meeting = load_meeting(&state, &auth, id).await?;

    let slot = meeting.select_slot(slot_id)?;
    info!(meeting_id = %id, starts_at = %slot.starts_at, "Meeting slot confirmed");
    save(&state, &meeting).await
}

/// POST /api/v2/meetings/:id/request-reschedule
pub async fn handle_request_reschedule(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
    JsonBody(req): JsonBody<RescheduleRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_applicant()?;
    let mut meeting = load_meeting(&state, &auth, id).await?;

    meeting.request_reschedule(req.reason.as_deref().unwrap_or_default())?;
    info!(meeting_id = %id, "Reschedule requested");
    save(&state, &meeting).await
}

/// POST /api/v2/meetings/:id/reschedule
pub async fn handle_reschedule(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
    JsonBody(req): JsonBody<NewSlotsRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_staff()?;
    let slots = parse_slots(&req.time_slots)?;
    let mut meeting = load_meeting(&state, &auth, id).await?;

    meeting.propose_new_slots(slots)?;
    info!(meeting_id = %id, slots = meeting.time_slots.len(), "New slots proposed");
    save(&state, &meeting).await
}

/// POST /api/v2/meetings/:id/cancel
pub async fn handle_cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let mut meeting = load_meeting(&state, &auth, id).await?;

    meeting.cancel()?;
    info!(meeting_id = %id, cancelled_by = %auth.role, "Meeting cancelled");
    save(&state, &meeting).await
}

/// DELETE /api/v2/meetings/:id
pub async fn handle_delete_meeting(
    State(state): State<AppState>,
    auth: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    auth.require_staff()?;
    if state.store.delete_meeting(id).await? {
        info!(meeting_id = %id, "Meeting deleted");
    }
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(starts_at: &str, ends_at: &str) -> SlotInput {
        SlotInput {
            starts_at: Some(starts_at.to_string()),
            ends_at: Some(ends_at.to_string()),
        }
    }

    #[test]
    fn test_parse_slots_validates_each_slot() {
        let slots = parse_slots(&[
            slot("2026-11-02T09:00:00Z", "2026-11-02T10:00:00Z"),
            slot("2026-11-03T09:00:00+01:00", "2026-11-03T09:30:00+01:00"),
        ])
        .unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].starts_at.to_rfc3339(), "2026-11-03T08:00:00+00:00");

        let backwards = parse_slots(&[slot("2026-11-02T10:00:00Z", "2026-11-02T09:00:00Z")]);
        assert!(matches!(backwards, Err(AppError::Validation("invalid_time_slot"))));

        let garbage = parse_slots(&[slot("tomorrow", "2026-11-02T09:00:00Z")]);
        assert!(matches!(garbage, Err(AppError::Validation("invalid_time_slot"))));
    }

    #[test]
    fn test_parse_slots_requires_at_least_one() {
        assert!(matches!(parse_slots(&[]), Err(AppError::Validation("missing_fields"))));
        let half = SlotInput {
            starts_at: Some("2026-11-02T09:00:00Z".to_string()),
            ends_at: None,
        };
        assert!(matches!(parse_slots(&[half]), Err(AppError::Validation("missing_fields"))));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode(Some("phone")).unwrap(), Some(MeetingMode::Phone));
        assert_eq!(parse_mode(None).unwrap(), None);
        assert!(parse_mode(Some("carrier pigeon")).is_err());
    }
}
