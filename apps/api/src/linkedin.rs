//! Job board integration. Only a LinkedIn stand-in exists: it derives post ids
//! locally and logs what a real integration would send.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::job::Job;

const FEED_URL: &str = "https://www.linkedin.com/feed/update";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub post_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedProfile {
    pub email: String,
    pub name: String,
    pub profile_url: Option<String>,
    pub source: &'static str,
}

/// Carried in `AppState` as `Arc<dyn JobBoard>`.
#[async_trait]
pub trait JobBoard: Send + Sync {
    async fn publish(&self, job: &Job) -> Result<Publication, AppError>;
    async fn unpublish(&self, job: &Job) -> Result<(), AppError>;
    async fn import_profile(
        &self,
        email: &str,
        name: Option<&str>,
        profile_url: Option<&str>,
    ) -> Result<ImportedProfile, AppError>;
}

pub struct LinkedInStub;

impl LinkedInStub {
    /// `li_` followed by the last six characters of the job id.
    pub fn post_id_for(job: &Job) -> String {
        let id = job.id.simple().to_string();
        format!("li_{}", &id[id.len() - 6..])
    }

    pub fn post_url(post_id: &str) -> String {
        format!("{FEED_URL}/{post_id}")
    }
}

#[async_trait]
impl JobBoard for LinkedInStub {
    async fn publish(&self, job: &Job) -> Result<Publication, AppError> {
        let post_id = Self::post_id_for(job);
        let url = Self::post_url(&post_id);
        info!(
            job_id = %job.id,
            job_title = %job.title,
            linkedin_post_id = %post_id,
            open = job.open,
            "Job published to LinkedIn"
        );
        Ok(Publication { post_id, url })
    }

    async fn unpublish(&self, job: &Job) -> Result<(), AppError> {
        info!(
            job_id = %job.id,
            linkedin_post_id = job.linkedin_post_id.as_deref().unwrap_or("-"),
            "Job unpublished from LinkedIn"
        );
        Ok(())
    }

    async fn import_profile(
        &self,
        email: &str,
        name: Option<&str>,
        profile_url: Option<&str>,
    ) -> Result<ImportedProfile, AppError> {
        let profile = ImportedProfile {
            email: email.to_string(),
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or("LinkedIn User")
                .to_string(),
            profile_url: profile_url.map(str::to_string),
            source: "linkedin",
        };
        info!(email = %profile.email, profile_url = ?profile.profile_url, "Applicant imported from LinkedIn");
        Ok(profile)
    }
}
