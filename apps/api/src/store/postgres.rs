use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::agency::{Agency, Permission};
use crate::models::application::Application;
use crate::models::job::Job;
use crate::models::meeting::{Meeting, TimeSlot};
use crate::models::user::User;
use crate::store::{ApplicationFilter, MeetingFilter, Store, StoreError, StoreResult};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique violations surface as `Conflict`; everything else stays a
/// database error.
fn unique_to_conflict(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
        _ => StoreError::Database(err),
    }
}

fn parse_column<T: std::str::FromStr<Err = String>>(raw: &str) -> StoreResult<T> {
    raw.parse().map_err(StoreError::Corrupt)
}

fn expect_row(result: sqlx::postgres::PgQueryResult) -> StoreResult<()> {
    if result.rows_affected() == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Row types
// ────────────────────────────────────────────────────────────────────────────

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    role: String,
    password_hash: Option<String>,
    name: Option<String>,
    birthdate: Option<NaiveDate>,
    address: Option<String>,
    deletion_requested_at: Option<DateTime<Utc>>,
    deletion_due_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        Ok(User {
            id: row.id,
            email: row.email,
            role: parse_column(&row.role)?,
            password_hash: row.password_hash,
            name: row.name,
            birthdate: row.birthdate,
            address: row.address,
            deletion_requested_at: row.deletion_requested_at,
            deletion_due_at: row.deletion_due_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    short_description: String,
    description: String,
    open: bool,
    linkedin_post_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            title: row.title,
            short_description: row.short_description,
            description: row.description,
            open: row.open,
            linkedin_post_id: row.linkedin_post_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    user_id: Uuid,
    status: String,
    note: Option<String>,
    source: String,
    source_profile: Option<String>,
    delete_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StoreError;

    fn try_from(row: ApplicationRow) -> StoreResult<Self> {
        Ok(Application {
            id: row.id,
            job_id: row.job_id,
            user_id: row.user_id,
            status: parse_column(&row.status)?,
            note: row.note,
            source: parse_column(&row.source)?,
            source_profile: row.source_profile,
            delete_at: row.delete_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct MeetingRow {
    id: Uuid,
    job_id: Uuid,
    applicant_id: Uuid,
    hr_id: Uuid,
    created_by: String,
    status: String,
    time_slots: Json<Vec<TimeSlot>>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    mode: String,
    location: String,
    notes: String,
    reschedule_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MeetingRow> for Meeting {
    type Error = StoreError;

    fn try_from(row: MeetingRow) -> StoreResult<Self> {
        Ok(Meeting {
            id: row.id,
            job_id: row.job_id,
            applicant_id: row.applicant_id,
            hr_id: row.hr_id,
            created_by: parse_column(&row.created_by)?,
            status: parse_column(&row.status)?,
            time_slots: row.time_slots.0,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            mode: parse_column(&row.mode)?,
            location: row.location,
            notes: row.notes,
            reschedule_reason: row.reschedule_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct AgencyRow {
    id: Uuid,
    name: String,
    api_key: String,
    active: bool,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AgencyRow> for Agency {
    type Error = StoreError;

    fn try_from(row: AgencyRow) -> StoreResult<Self> {
        let permissions = row
            .permissions
            .iter()
            .map(|p| parse_column::<Permission>(p))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Agency {
            id: row.id,
            name: row.name,
            api_key: row.api_key,
            active: row.active,
            permissions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn permission_strings(agency: &Agency) -> Vec<String> {
    agency
        .permissions
        .iter()
        .map(|p| p.as_str().to_string())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Store implementation
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, email, role, password_hash, name, birthdate, address,
                 deletion_requested_at, deletion_due_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.birthdate)
        .bind(&user.address)
        .bind(user.deletion_requested_at)
        .bind(user.deletion_due_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unique_to_conflict)?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, role = $3, password_hash = $4, name = $5, birthdate = $6,
                address = $7, deletion_requested_at = $8, deletion_due_at = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.birthdate)
        .bind(&user.address)
        .bind(user.deletion_requested_at)
        .bind(user.deletion_due_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unique_to_conflict)?;
        expect_row(result)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        // applications and meetings go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_users_due(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE deletion_due_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_job(&self, job: &Job) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, title, short_description, description, open, linkedin_post_id,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.short_description)
        .bind(&job.description)
        .bind(job.open)
        .bind(&job.linkedin_post_id)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        Ok(sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Job::from))
    }

    async fn jobs_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Job::from).collect())
    }

    async fn list_jobs(&self, open_only: bool) -> StoreResult<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM jobs WHERE (NOT $1 OR open) ORDER BY created_at DESC",
        )
        .bind(open_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Job::from).collect())
    }

    async fn update_job(&self, job: &Job) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET title = $2, short_description = $3, description = $4, open = $5,
                linkedin_post_id = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.short_description)
        .bind(&job.description)
        .bind(job.open)
        .bind(&job.linkedin_post_id)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        expect_row(result)
    }

    async fn delete_job(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_application(&self, application: &Application) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO applications
                (id, job_id, user_id, status, note, source, source_profile, delete_at,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(application.user_id)
        .bind(application.status.as_str())
        .bind(&application.note)
        .bind(application.source.as_str())
        .bind(&application.source_profile)
        .bind(application.delete_at)
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unique_to_conflict)?;
        Ok(())
    }

    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Application::try_from)
            .transpose()
    }

    async fn find_application_for(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Application>> {
        sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE job_id = $1 AND user_id = $2",
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Application::try_from)
        .transpose()
    }

    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> StoreResult<Vec<Application>> {
        let statuses: Option<Vec<String>> = if filter.statuses.is_empty() {
            None
        } else {
            Some(
                filter
                    .statuses
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            )
        };
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT * FROM applications
            WHERE ($1::uuid IS NULL OR job_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::text[] IS NULL OR status = ANY($3))
            ORDER BY created_at DESC
            LIMIT $4
            "#,
        )
        .bind(filter.job_id)
        .bind(filter.user_id)
        .bind(statuses)
        .bind(filter.limit.map(|l| l as i64))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn update_application(&self, application: &Application) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = $2, note = $3, source = $4, source_profile = $5, delete_at = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(application.id)
        .bind(application.status.as_str())
        .bind(&application.note)
        .bind(application.source.as_str())
        .bind(&application.source_profile)
        .bind(application.delete_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await?;
        expect_row(result)
    }

    async fn delete_application(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_applications_due(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM applications WHERE delete_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_meeting(&self, meeting: &Meeting) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO meetings
                (id, job_id, applicant_id, hr_id, created_by, status, time_slots,
                 starts_at, ends_at, mode, location, notes, reschedule_reason,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(meeting.id)
        .bind(meeting.job_id)
        .bind(meeting.applicant_id)
        .bind(meeting.hr_id)
        .bind(meeting.created_by.as_str())
        .bind(meeting.status.as_str())
        .bind(Json(&meeting.time_slots))
        .bind(meeting.starts_at)
        .bind(meeting.ends_at)
        .bind(meeting.mode.as_str())
        .bind(&meeting.location)
        .bind(&meeting.notes)
        .bind(&meeting.reschedule_reason)
        .bind(meeting.created_at)
        .bind(meeting.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_meeting(&self, id: Uuid) -> StoreResult<Option<Meeting>> {
        sqlx::query_as::<_, MeetingRow>("SELECT * FROM meetings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Meeting::try_from)
            .transpose()
    }

    async fn list_meetings(&self, filter: &MeetingFilter) -> StoreResult<Vec<Meeting>> {
        let rows = sqlx::query_as::<_, MeetingRow>(
            r#"
            SELECT * FROM meetings
            WHERE ($1::uuid IS NULL OR job_id = $1)
              AND ($2::uuid IS NULL OR applicant_id = $2)
              AND ($3::uuid IS NULL OR hr_id = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.job_id)
        .bind(filter.applicant_id)
        .bind(filter.hr_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn update_meeting(&self, meeting: &Meeting) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE meetings
            SET status = $2, time_slots = $3, starts_at = $4, ends_at = $5, mode = $6,
                location = $7, notes = $8, reschedule_reason = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(meeting.id)
        .bind(meeting.status.as_str())
        .bind(Json(&meeting.time_slots))
        .bind(meeting.starts_at)
        .bind(meeting.ends_at)
        .bind(meeting.mode.as_str())
        .bind(&meeting.location)
        .bind(&meeting.notes)
        .bind(&meeting.reschedule_reason)
        .bind(meeting.updated_at)
        .execute(&self.pool)
        .await?;
        expect_row(result)
    }

    async fn delete_meeting(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM meetings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_agency(&self, agency: &Agency) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO agencies
                (id, name, api_key, active, permissions, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(agency.id)
        .bind(&agency.name)
        .bind(&agency.api_key)
        .bind(agency.active)
        .bind(permission_strings(agency))
        .bind(agency.created_at)
        .bind(agency.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unique_to_conflict)?;
        Ok(())
    }

    async fn find_agency(&self, id: Uuid) -> StoreResult<Option<Agency>> {
        sqlx::query_as::<_, AgencyRow>("SELECT * FROM agencies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Agency::try_from)
            .transpose()
    }

    async fn find_active_agency_by_key(&self, api_key: &str) -> StoreResult<Option<Agency>> {
        sqlx::query_as::<_, AgencyRow>("SELECT * FROM agencies WHERE api_key = $1 AND active")
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await?
            .map(Agency::try_from)
            .transpose()
    }

    async fn list_agencies(&self) -> StoreResult<Vec<Agency>> {
        let rows =
            sqlx::query_as::<_, AgencyRow>("SELECT * FROM agencies ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        convert_all(rows)
    }

    async fn update_agency(&self, agency: &Agency) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE agencies
            SET name = $2, api_key = $3, active = $4, permissions = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(agency.id)
        .bind(&agency.name)
        .bind(&agency.api_key)
        .bind(agency.active)
        .bind(permission_strings(agency))
        .bind(agency.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unique_to_conflict)?;
        expect_row(result)
    }

    async fn delete_agency(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM agencies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::{ApplicationSource, ApplicationStatus};
    use crate::models::meeting::{MeetingMode, MeetingStatus};
    use crate::models::user::Role;

    fn user_row(role: &str) -> UserRow {
        let now = Utc::now();
        UserRow {
            id: Uuid::new_v4(),
            email: "lea@example.com".to_string(),
            role: role.to_string(),
            password_hash: None,
            name: Some("Lea".to_string()),
            birthdate: NaiveDate::from_ymd_opt(1994, 3, 8),
            address: None,
            deletion_requested_at: None,
            deletion_due_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn application_row(status: &str, source: &str) -> ApplicationRow {
        let now = Utc::now();
        ApplicationRow {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: status.to_string(),
            note: None,
            source: source.to_string(),
            source_profile: None,
            delete_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn meeting_row(status: &str, mode: &str) -> MeetingRow {
        let now = Utc::now();
        let slot = TimeSlot::new(now, now + chrono::Duration::hours(1)).unwrap();
        MeetingRow {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            applicant_id: Uuid::new_v4(),
            hr_id: Uuid::new_v4(),
            created_by: "hr".to_string(),
            status: status.to_string(),
            time_slots: Json(vec![slot]),
            starts_at: None,
            ends_at: None,
            mode: mode.to_string(),
            location: String::new(),
            notes: String::new(),
            reschedule_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn agency_row(permissions: &[&str]) -> AgencyRow {
        let now = Utc::now();
        AgencyRow {
            id: Uuid::new_v4(),
            name: "Talentwerk".to_string(),
            api_key: "k".repeat(48),
            active: true,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_row_converts() {
        let user = User::try_from(user_row("applicant")).unwrap();
        assert_eq!(user.role, Role::Applicant);
        assert_eq!(user.name.as_deref(), Some("Lea"));
    }

    #[test]
    fn test_unknown_role_is_corrupt() {
        let err = User::try_from(user_row("recruiter")).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(msg) if msg.contains("recruiter")));
    }

    #[test]
    fn test_application_row_enum_columns() {
        let application = Application::try_from(application_row("in_review", "linkedin")).unwrap();
        assert_eq!(application.status, ApplicationStatus::InReview);
        assert_eq!(application.source, ApplicationSource::Linkedin);

        assert!(matches!(
            Application::try_from(application_row("received", "direct")),
            Err(StoreError::Corrupt(_))
        ));
        assert!(matches!(
            Application::try_from(application_row("submitted", "email")),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_meeting_row_keeps_slots() {
        let meeting = Meeting::try_from(meeting_row("reschedule_requested", "phone")).unwrap();
        assert_eq!(meeting.status, MeetingStatus::RescheduleRequested);
        assert_eq!(meeting.mode, MeetingMode::Phone);
        assert_eq!(meeting.time_slots.len(), 1);

        assert!(matches!(
            Meeting::try_from(meeting_row("postponed", "online")),
            Err(StoreError::Corrupt(_))
        ));
        assert!(matches!(
            Meeting::try_from(meeting_row("proposed", "video")),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_agency_permissions_round_trip_through_text_array() {
        let agency = Agency::try_from(agency_row(&["applications:read"])).unwrap();
        assert_eq!(agency.permissions, vec![Permission::ApplicationsRead]);
        assert_eq!(permission_strings(&agency), vec!["applications:read".to_string()]);

        assert!(matches!(
            Agency::try_from(agency_row(&["jobs:read", "jobs:write"])),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_convert_all_stops_at_first_corrupt_row() {
        let rows = vec![user_row("hr"), user_row("owner")];
        assert!(matches!(
            convert_all::<UserRow, User>(rows),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_non_unique_errors_stay_database_errors() {
        assert!(matches!(
            unique_to_conflict(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }
}
