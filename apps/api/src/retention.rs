//! Background purge of expired data.
//!
//! Rejected and withdrawn applications carry a `delete_at` deadline, and
//! applicants who asked for their account to be deleted carry a
//! `deletion_due_at`. A periodic task removes whatever is past due.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::store::{Store, StoreResult};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub applications: u64,
    pub users: u64,
}

/// Runs one purge against `now`.
pub async fn run_retention_pass(store: &dyn Store, now: DateTime<Utc>) -> StoreResult<PurgeReport> {
    let applications = store.purge_applications_due(now).await?;
    let users = store.purge_users_due(now).await?;
    Ok(PurgeReport {
        applications,
        users,
    })
}

/// Spawns the purge loop. The first pass runs immediately; failures are
/// logged and retried on the next tick.
pub fn spawn_retention_worker(store: Arc<dyn Store>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match run_retention_pass(store.as_ref(), Utc::now()).await {
                Ok(report) if report == PurgeReport::default() => {}
                Ok(report) => info!(
                    applications = report.applications,
                    users = report.users,
                    "Retention purge removed expired records"
                ),
                Err(e) => error!("Retention purge failed: {e}"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::{Application, ApplicationStatus};
    use crate::models::job::Job;
    use crate::models::user::{Role, User};
    use crate::store::MemoryStore;

    async fn seeded() -> (MemoryStore, Job, User) {
        let store = MemoryStore::new();
        let job = Job::new("Chocolatier".into(), String::new(), String::new(), true);
        let user = User::new("lea@example.com", Role::Applicant, None);
        store.insert_job(&job).await.unwrap();
        store.insert_user(&user).await.unwrap();
        (store, job, user)
    }

    #[tokio::test]
    async fn test_purges_expired_applications_only() {
        let (store, job, user) = seeded().await;
        let other = Job::new("Verkauf".into(), String::new(), String::new(), true);
        store.insert_job(&other).await.unwrap();

        let mut expired = Application::new(job.id, user.id, None);
        expired.set_status(ApplicationStatus::Rejected, chrono::Duration::days(-1));
        let mut pending = Application::new(other.id, user.id, None);
        pending.set_status(ApplicationStatus::Rejected, chrono::Duration::days(180));
        store.insert_application(&expired).await.unwrap();
        store.insert_application(&pending).await.unwrap();

        let report = run_retention_pass(&store, Utc::now()).await.unwrap();
        assert_eq!(report, PurgeReport { applications: 1, users: 0 });
        assert!(store.find_application(expired.id).await.unwrap().is_none());
        assert!(store.find_application(pending.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purges_users_past_their_deletion_date() {
        let (store, job, mut user) = seeded().await;
        let application = Application::new(job.id, user.id, None);
        store.insert_application(&application).await.unwrap();

        user.deletion_requested_at = Some(Utc::now() - chrono::Duration::days(31));
        user.deletion_due_at = Some(Utc::now() - chrono::Duration::days(1));
        store.update_user(&user).await.unwrap();

        let report = run_retention_pass(&store, Utc::now()).await.unwrap();
        assert_eq!(report.users, 1);
        assert!(store.find_user(user.id).await.unwrap().is_none());
        assert!(store.find_application(application.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_nothing_due_is_a_noop() {
        let (store, _, user) = seeded().await;
        let report = run_retention_pass(&store, Utc::now()).await.unwrap();
        assert_eq!(report, PurgeReport::default());
        assert!(store.find_user(user.id).await.unwrap().is_some());
    }
}
