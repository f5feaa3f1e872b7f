use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub open: bool,
    pub linkedin_post_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(title: String, short_description: String, description: String, open: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            short_description,
            description,
            open,
            linkedin_post_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn public_view(&self) -> PublicJobView {
        PublicJobView {
            id: self.id,
            title: self.title.clone(),
            short_description: self.short_description.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicJobView {
    pub id: Uuid,
    pub title: String,
    pub short_description: String,
    pub description: String,
}

/// Compact job reference embedded in application and meeting listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRef {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl JobRef {
    pub fn of(job: &Job) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            description: None,
        }
    }

    pub fn with_description(job: &Job) -> Self {
        Self {
            description: Some(job.description.clone()),
            ..Self::of(job)
        }
    }
}
