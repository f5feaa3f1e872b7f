//! Persistence seam. Handlers only talk to `Arc<dyn Store>`; the Postgres
//! backend is used in production and the in-memory one when no database is
//! configured and throughout the test suite.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::agency::Agency;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::Job;
use crate::models::meeting::Meeting;
use crate::models::user::User;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint was hit (duplicate email, second application...).
    #[error("record already exists")]
    Conflict,

    #[error("record not found")]
    NotFound,

    #[error("stored record is invalid: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub job_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    /// Empty means any status.
    pub statuses: Vec<ApplicationStatus>,
    pub limit: Option<usize>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        self.job_id.map_or(true, |id| application.job_id == id)
            && self.user_id.map_or(true, |id| application.user_id == id)
            && (self.statuses.is_empty() || self.statuses.contains(&application.status))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeetingFilter {
    pub job_id: Option<Uuid>,
    pub applicant_id: Option<Uuid>,
    pub hr_id: Option<Uuid>,
}

impl MeetingFilter {
    pub fn matches(&self, meeting: &Meeting) -> bool {
        self.job_id.map_or(true, |id| meeting.job_id == id)
            && self.applicant_id.map_or(true, |id| meeting.applicant_id == id)
            && self.hr_id.map_or(true, |id| meeting.hr_id == id)
    }
}

/// All listing methods return records newest first.
#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn update_user(&self, user: &User) -> StoreResult<()>;
    /// Deletes the user together with their applications and meetings.
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
    async fn purge_users_due(&self, now: DateTime<Utc>) -> StoreResult<u64>;

    // Jobs
    async fn insert_job(&self, job: &Job) -> StoreResult<()>;
    async fn find_job(&self, id: Uuid) -> StoreResult<Option<Job>>;
    async fn jobs_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Job>>;
    async fn list_jobs(&self, open_only: bool) -> StoreResult<Vec<Job>>;
    async fn update_job(&self, job: &Job) -> StoreResult<()>;
    /// Deletes the job together with its applications and meetings.
    async fn delete_job(&self, id: Uuid) -> StoreResult<bool>;

    // Applications
    async fn insert_application(&self, application: &Application) -> StoreResult<()>;
    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>>;
    async fn find_application_for(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Application>>;
    async fn list_applications(&self, filter: &ApplicationFilter)
        -> StoreResult<Vec<Application>>;
    async fn update_application(&self, application: &Application) -> StoreResult<()>;
    async fn delete_application(&self, id: Uuid) -> StoreResult<bool>;
    async fn purge_applications_due(&self, now: DateTime<Utc>) -> StoreResult<u64>;

    // Meetings
    async fn insert_meeting(&self, meeting: &Meeting) -> StoreResult<()>;
    async fn find_meeting(&self, id: Uuid) -> StoreResult<Option<Meeting>>;
    async fn list_meetings(&self, filter: &MeetingFilter) -> StoreResult<Vec<Meeting>>;
    async fn update_meeting(&self, meeting: &Meeting) -> StoreResult<()>;
    async fn delete_meeting(&self, id: Uuid) -> StoreResult<bool>;

    // Agencies
    async fn insert_agency(&self, agency: &Agency) -> StoreResult<()>;
    async fn find_agency(&self, id: Uuid) -> StoreResult<Option<Agency>>;
    async fn find_active_agency_by_key(&self, api_key: &str) -> StoreResult<Option<Agency>>;
    async fn list_agencies(&self) -> StoreResult<Vec<Agency>>;
    async fn update_agency(&self, agency: &Agency) -> StoreResult<()>;
    async fn delete_agency(&self, id: Uuid) -> StoreResult<bool>;
}
