use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    InReview,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::InReview,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::InReview => "in_review",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn is_archived(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    /// Only open applications can be withdrawn by the applicant.
    pub fn can_withdraw(&self) -> bool {
        matches!(self, ApplicationStatus::Submitted | ApplicationStatus::InReview)
    }

    /// Archived states that start the retention clock.
    pub fn starts_retention(&self) -> bool {
        matches!(self, ApplicationStatus::Rejected | ApplicationStatus::Withdrawn)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown application status '{s}'"))
    }
}

/// The `status` query filter on the HR listing: either one status or a named
/// group used by the HR board columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    Exact(ApplicationStatus),
    Unprocessed,
    Active,
    Archived,
}

impl StatusFilter {
    pub fn statuses(&self) -> Vec<ApplicationStatus> {
        match self {
            StatusFilter::Exact(status) => vec![*status],
            StatusFilter::Unprocessed => vec![ApplicationStatus::Submitted],
            StatusFilter::Active => vec![ApplicationStatus::Submitted, ApplicationStatus::InReview],
            StatusFilter::Archived => ApplicationStatus::ALL
                .into_iter()
                .filter(ApplicationStatus::is_archived)
                .collect(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unprocessed" => Ok(StatusFilter::Unprocessed),
            "active" => Ok(StatusFilter::Active),
            "archived" => Ok(StatusFilter::Archived),
            other => other.parse().map(StatusFilter::Exact),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationSource {
    Direct,
    Linkedin,
}

impl ApplicationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationSource::Direct => "direct",
            ApplicationSource::Linkedin => "linkedin",
        }
    }
}

impl FromStr for ApplicationSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(ApplicationSource::Direct),
            "linkedin" => Ok(ApplicationSource::Linkedin),
            other => Err(format!("unknown application source '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub status: ApplicationStatus,
    pub note: Option<String>,
    pub source: ApplicationSource,
    pub source_profile: Option<String>,
    /// Purge deadline for the retention worker.
    pub delete_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn new(job_id: Uuid, user_id: Uuid, note: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            job_id,
            user_id,
            status: ApplicationStatus::Submitted,
            note,
            source: ApplicationSource::Direct,
            source_profile: None,
            delete_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn imported(job_id: Uuid, user_id: Uuid, profile_url: Option<String>) -> Self {
        Self {
            source: ApplicationSource::Linkedin,
            source_profile: profile_url,
            ..Self::new(job_id, user_id, None)
        }
    }

    /// Applies a status change and keeps the retention deadline consistent
    /// with it.
    pub fn set_status(&mut self, status: ApplicationStatus, retention: chrono::Duration) {
        let now = Utc::now();
        self.status = status;
        self.delete_at = if status.starts_retention() {
            Some(now + retention)
        } else {
            None
        };
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_snake_case() {
        assert_eq!(
            "in_review".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::InReview
        );
        assert!("received".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_status_filter_groups() {
        assert_eq!(
            "active".parse::<StatusFilter>().unwrap().statuses(),
            vec![ApplicationStatus::Submitted, ApplicationStatus::InReview]
        );
        assert_eq!(
            "archived".parse::<StatusFilter>().unwrap().statuses(),
            vec![
                ApplicationStatus::Accepted,
                ApplicationStatus::Rejected,
                ApplicationStatus::Withdrawn
            ]
        );
        assert_eq!(
            "rejected".parse::<StatusFilter>().unwrap(),
            StatusFilter::Exact(ApplicationStatus::Rejected)
        );
        assert!("everything".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_set_status_manages_delete_at() {
        let mut app = Application::new(Uuid::new_v4(), Uuid::new_v4(), None);
        let retention = chrono::Duration::days(180);

        app.set_status(ApplicationStatus::Rejected, retention);
        let deadline = app.delete_at.expect("rejection starts retention");
        assert!(deadline > Utc::now() + chrono::Duration::days(179));

        app.set_status(ApplicationStatus::InReview, retention);
        assert!(app.delete_at.is_none());

        app.set_status(ApplicationStatus::Accepted, retention);
        assert!(app.delete_at.is_none());
    }

    #[test]
    fn test_only_open_applications_can_withdraw() {
        assert!(ApplicationStatus::Submitted.can_withdraw());
        assert!(ApplicationStatus::InReview.can_withdraw());
        assert!(!ApplicationStatus::Accepted.can_withdraw());
        assert!(!ApplicationStatus::Withdrawn.can_withdraw());
    }
}
