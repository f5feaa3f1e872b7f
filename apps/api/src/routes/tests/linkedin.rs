use axum::http::{Method, StatusCode};
use serde_json::json;

use super::common::*;
use crate::models::application::{ApplicationSource, ApplicationStatus};
use crate::models::user::Role;

#[tokio::test]
async fn test_publish_and_unpublish() {
    let app = app();
    let (_, hr) = app.user("hr@chocadies.ch", Role::Hr).await;
    let job = app.job("Confiseur", true).await;
    let uri = format!("/api/v2/linkedin/publish/{}", job.id);

    let (status, body) = app.post(&uri, &hr, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let simple = job.id.simple().to_string();
    let post_id = format!("li_{}", &simple[simple.len() - 6..]);
    assert_eq!(body["linkedinPostId"], post_id);
    assert_eq!(
        body["url"],
        format!("https://www.linkedin.com/feed/update/{post_id}")
    );

    let stored = app.state.store.find_job(job.id).await.unwrap().unwrap();
    assert_eq!(stored.linkedin_post_id.as_deref(), Some(post_id.as_str()));

    let (status, _) = app.delete(&uri, &hr).await;
    assert_eq!(status, StatusCode::OK);
    let stored = app.state.store.find_job(job.id).await.unwrap().unwrap();
    assert!(stored.linkedin_post_id.is_none());

    let missing = format!("/api/v2/linkedin/publish/{}", uuid::Uuid::new_v4());
    let (status, _) = app.post(&missing, &hr, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_import_creates_passwordless_applicant_and_application() {
    let app = app();
    let (_, hr) = app.user("hr@chocadies.ch", Role::Hr).await;
    let job = app.job("Confiseur", true).await;

    let (status, body) = app
        .post(
            "/api/v2/linkedin/import-applicant",
            &hr,
            json!({
                "email": "Max@Example.com",
                "profileUrl": "https://www.linkedin.com/in/max",
                "jobId": job.id
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let user_id: uuid::Uuid = body["userId"].as_str().unwrap().parse().unwrap();
    let application_id: uuid::Uuid = body["applicationId"].as_str().unwrap().parse().unwrap();

    let user = app.state.store.find_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.email, "max@example.com");
    assert_eq!(user.name.as_deref(), Some("LinkedIn User"));
    assert!(user.password_hash.is_none());

    let application = app
        .state
        .store
        .find_application(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.source, ApplicationSource::Linkedin);
    assert_eq!(application.status, ApplicationStatus::Submitted);
    assert_eq!(
        application.source_profile.as_deref(),
        Some("https://www.linkedin.com/in/max")
    );

    // imported accounts cannot log in
    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "max@example.com", "password": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "max@example.com", "password": "anything" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_import_reuses_existing_account_and_application() {
    let app = app();
    let (_, hr) = app.user("hr@chocadies.ch", Role::Hr).await;
    let (lea, _) = app.user("lea@example.com", Role::Applicant).await;
    let job = app.job("Confiseur", true).await;
    let existing = app.application(&job, &lea, ApplicationStatus::InReview).await;

    let (status, body) = app
        .post(
            "/api/v2/linkedin/import-applicant",
            &hr,
            json!({ "email": "lea@example.com", "name": "Lea K.", "jobId": job.id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], lea.id.to_string());
    assert_eq!(body["applicationId"], existing.id.to_string());

    let (status, body) = app
        .post("/api/v2/linkedin/import-applicant", &hr, json!({ "name": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reason(&body), "missing_email");

    let (status, body) = app
        .post(
            "/api/v2/linkedin/import-applicant",
            &hr,
            json!({ "email": "solo@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("applicationId").is_none());
}

#[tokio::test]
async fn test_import_with_unknown_job_still_creates_the_account() {
    let app = app();
    let (_, hr) = app.user("hr@chocadies.ch", Role::Hr).await;

    let (status, body) = app
        .post(
            "/api/v2/linkedin/import-applicant",
            &hr,
            json!({ "email": "nora@example.com", "name": "Nora", "jobId": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("applicationId").is_none());

    let user = app
        .state
        .store
        .find_user_by_email("nora@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(body["userId"], user.id.to_string());
    assert_eq!(user.name.as_deref(), Some("Nora"));
}
