use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::agency::Agency;
use crate::models::application::Application;
use crate::models::job::Job;
use crate::models::meeting::Meeting;
use crate::models::user::User;
use crate::store::{ApplicationFilter, MeetingFilter, Store, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
    meetings: Vec<Meeting>,
    agencies: Vec<Agency>,
}

impl Tables {
    fn drop_user_dependents(&mut self, user_id: Uuid) {
        self.applications.retain(|a| a.user_id != user_id);
        self.meetings.retain(|m| m.applicant_id != user_id && m.hr_id != user_id);
    }
}

/// Process-local store with the same uniqueness and cascade rules as the
/// Postgres schema. Vectors keep insertion order, so listings walk them in
/// reverse.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn replace<T>(rows: &mut [T], id: Uuid, id_of: impl Fn(&T) -> Uuid, value: T) -> StoreResult<()> {
    let slot = rows
        .iter_mut()
        .find(|row| id_of(row) == id)
        .ok_or(StoreError::NotFound)?;
    *slot = value;
    Ok(())
}

fn remove<T>(rows: &mut Vec<T>, id: Uuid, id_of: impl Fn(&T) -> Uuid) -> bool {
    let before = rows.len();
    rows.retain(|row| id_of(row) != id);
    rows.len() != before
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict);
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().rev().cloned().collect())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::Conflict);
        }
        replace(&mut tables.users, user.id, |u| u.id, user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = remove(&mut tables.users, id, |u| u.id);
        if removed {
            tables.drop_user_dependents(id);
        }
        Ok(removed)
    }

    async fn purge_users_due(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let due: Vec<Uuid> = tables
            .users
            .iter()
            .filter(|u| u.deletion_due_at.is_some_and(|at| at <= now))
            .map(|u| u.id)
            .collect();
        for id in &due {
            tables.users.retain(|u| u.id != *id);
            tables.drop_user_dependents(*id);
        }
        Ok(due.len() as u64)
    }

    async fn insert_job(&self, job: &Job) -> StoreResult<()> {
        self.tables.write().await.jobs.push(job.clone());
        Ok(())
    }

    async fn find_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        let tables = self.tables.read().await;
        Ok(tables.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn jobs_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Job>> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .filter(|j| ids.contains(&j.id))
            .cloned()
            .collect())
    }

    async fn list_jobs(&self, open_only: bool) -> StoreResult<Vec<Job>> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .rev()
            .filter(|j| !open_only || j.open)
            .cloned()
            .collect())
    }

    async fn update_job(&self, job: &Job) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.jobs, job.id, |j| j.id, job.clone())
    }

    async fn delete_job(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = remove(&mut tables.jobs, id, |j| j.id);
        if removed {
            tables.applications.retain(|a| a.job_id != id);
            tables.meetings.retain(|m| m.job_id != id);
        }
        Ok(removed)
    }

    async fn insert_application(&self, application: &Application) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .applications
            .iter()
            .any(|a| a.job_id == application.job_id && a.user_id == application.user_id)
        {
            return Err(StoreError::Conflict);
        }
        tables.applications.push(application.clone());
        Ok(())
    }

    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn find_application_for(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .find(|a| a.job_id == job_id && a.user_id == user_id)
            .cloned())
    }

    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> StoreResult<Vec<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .rev()
            .filter(|a| filter.matches(a))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn update_application(&self, application: &Application) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        replace(
            &mut tables.applications,
            application.id,
            |a| a.id,
            application.clone(),
        )
    }

    async fn delete_application(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(remove(&mut tables.applications, id, |a| a.id))
    }

    async fn purge_applications_due(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.applications.len();
        tables
            .applications
            .retain(|a| !a.delete_at.is_some_and(|at| at <= now));
        Ok((before - tables.applications.len()) as u64)
    }

    async fn insert_meeting(&self, meeting: &Meeting) -> StoreResult<()> {
        self.tables.write().await.meetings.push(meeting.clone());
        Ok(())
    }

    async fn find_meeting(&self, id: Uuid) -> StoreResult<Option<Meeting>> {
        let tables = self.tables.read().await;
        Ok(tables.meetings.iter().find(|m| m.id == id).cloned())
    }

    async fn list_meetings(&self, filter: &MeetingFilter) -> StoreResult<Vec<Meeting>> {
        let tables = self.tables.read().await;
        Ok(tables
            .meetings
            .iter()
            .rev()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    async fn update_meeting(&self, meeting: &Meeting) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.meetings, meeting.id, |m| m.id, meeting.clone())
    }

    async fn delete_meeting(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(remove(&mut tables.meetings, id, |m| m.id))
    }

    async fn insert_agency(&self, agency: &Agency) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.agencies.iter().any(|a| a.api_key == agency.api_key) {
            return Err(StoreError::Conflict);
        }
        tables.agencies.push(agency.clone());
        Ok(())
    }

    async fn find_agency(&self, id: Uuid) -> StoreResult<Option<Agency>> {
        let tables = self.tables.read().await;
        Ok(tables.agencies.iter().find(|a| a.id == id).cloned())
    }

    async fn find_active_agency_by_key(&self, api_key: &str) -> StoreResult<Option<Agency>> {
        let tables = self.tables.read().await;
        Ok(tables
            .agencies
            .iter()
            .find(|a| a.active && a.api_key == api_key)
            .cloned())
    }

    async fn list_agencies(&self) -> StoreResult<Vec<Agency>> {
        let tables = self.tables.read().await;
        Ok(tables.agencies.iter().rev().cloned().collect())
    }

    async fn update_agency(&self, agency: &Agency) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.agencies, agency.id, |a| a.id, agency.clone())
    }

    async fn delete_agency(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(remove(&mut tables.agencies, id, |a| a.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;
    use crate::models::user::Role;

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store
            .insert_user(&User::new("a@example.com", Role::Applicant, None))
            .await
            .unwrap();
        let err = store
            .insert_user(&User::new("A@example.com", Role::Hr, None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn test_delete_job_cascades() {
        let store = MemoryStore::new();
        let user = User::new("a@example.com", Role::Applicant, None);
        let job = Job::new("Chocolatier".into(), String::new(), String::new(), true);
        store.insert_user(&user).await.unwrap();
        store.insert_job(&job).await.unwrap();
        store
            .insert_application(&Application::new(job.id, user.id, None))
            .await
            .unwrap();

        assert!(store.delete_job(job.id).await.unwrap());
        let left = store
            .list_applications(&ApplicationFilter::default())
            .await
            .unwrap();
        assert!(left.is_empty());
        assert!(!store.delete_job(job.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_application_filter_and_order() {
        let store = MemoryStore::new();
        let job = Job::new("Taster".into(), String::new(), String::new(), true);
        store.insert_job(&job).await.unwrap();

        let mut ids = Vec::new();
        for i in 0..3 {
            let user = User::new(&format!("u{i}@example.com"), Role::Applicant, None);
            store.insert_user(&user).await.unwrap();
            let mut app = Application::new(job.id, user.id, None);
            if i == 1 {
                app.status = ApplicationStatus::InReview;
            }
            store.insert_application(&app).await.unwrap();
            ids.push(app.id);
        }

        let all = store
            .list_applications(&ApplicationFilter::default())
            .await
            .unwrap();
        assert_eq!(all.iter().map(|a| a.id).collect::<Vec<_>>(), vec![ids[2], ids[1], ids[0]]);

        let in_review = store
            .list_applications(&ApplicationFilter {
                statuses: vec![ApplicationStatus::InReview],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(in_review.len(), 1);
        assert_eq!(in_review[0].id, ids[1]);

        let limited = store
            .list_applications(&ApplicationFilter {
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }
}
