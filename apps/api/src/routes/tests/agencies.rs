use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use super::common::*;
use crate::models::application::ApplicationStatus;
use crate::models::user::Role;

async fn partner_get(app: &TestApp, uri: &str, key: Option<&str>) -> (StatusCode, Value) {
    app.send_with(
        Method::GET,
        uri,
        key.map(|k| ("x-api-key", k.to_string())),
        None,
    )
    .await
}

#[tokio::test]
async fn test_agency_admin_lifecycle() {
    let app = app();
    let (_, admin) = app.user("admin@chocadies.ch", Role::Admin).await;

    let (status, body) = app.post("/api/v2/agencies", &admin, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reason(&body), "missing_name");

    let (status, body) = app
        .post(
            "/api/v2/agencies",
            &admin,
            json!({ "name": "Talentwerk", "permissions": ["jobs:delete"] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reason(&body), "invalid_permission");

    let (status, created) = app
        .post("/api/v2/agencies", &admin, json!({ "name": "Talentwerk" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    let first_key = created["apiKey"].as_str().unwrap().to_string();
    assert_eq!(first_key.len(), 48);

    let (_, listed) = app.get("/api/v2/agencies", &admin).await;
    assert!(listed[0].get("apiKey").is_none());
    assert_eq!(listed[0]["permissions"], json!(["jobs:read", "applications:read"]));

    let (status, rotated) = app
        .post(&format!("/api/v2/agencies/{id}/rotate-key"), &admin, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(rotated["apiKey"], first_key);

    let (status, _) = partner_get(&app, "/api/agency/jobs", Some(&first_key)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.delete(&format!("/api/v2/agencies/{id}"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post(&format!("/api/v2/agencies/{id}/rotate-key"), &admin, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_partner_api_keys_and_permissions() {
    let app = app();
    let (_, admin) = app.user("admin@chocadies.ch", Role::Admin).await;
    let (lea, _) = app.user("lea@example.com", Role::Applicant).await;
    let job = app.job("Confiseur", true).await;
    let closed = app.job("Lagerist", false).await;
    app.application(&job, &lea, ApplicationStatus::Submitted).await;
    app.application(&closed, &lea, ApplicationStatus::Rejected).await;

    let (_, created) = app
        .post(
            "/api/v2/agencies",
            &admin,
            json!({ "name": "Jobs only", "permissions": ["jobs:read"] }),
        )
        .await;
    let key = created["apiKey"].as_str().unwrap().to_string();

    let (status, body) = partner_get(&app, "/api/agency/jobs", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(reason(&body), "missing_api_key");

    let (status, body) = partner_get(&app, "/api/agency/jobs", Some("nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(reason(&body), "invalid_api_key");

    let (status, jobs) = partner_get(&app, "/api/agency/jobs", Some(&key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs.as_array().unwrap().len(), 1);
    assert_eq!(jobs[0]["title"], "Confiseur");
    assert!(jobs[0].get("linkedinPostId").is_some());

    let (status, _) = partner_get(&app, "/api/agency/applications", Some(&key)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let id = created["id"].as_str().unwrap();
    app.patch(
        &format!("/api/v2/agencies/{id}"),
        &admin,
        json!({ "permissions": ["applications:read"] }),
    )
    .await;
    let uri = format!("/api/agency/applications?jobId={}", job.id);
    let (status, applications) = partner_get(&app, &uri, Some(&key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(applications.as_array().unwrap().len(), 1);
    assert_eq!(applications[0]["applicant"], json!({ "email": "lea@example.com" }));
    assert_eq!(applications[0]["jobId"], job.id.to_string());

    app.patch(&format!("/api/v2/agencies/{id}"), &admin, json!({ "active": false }))
        .await;
    let (status, body) = partner_get(&app, &uri, Some(&key)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(reason(&body), "invalid_api_key");
}
