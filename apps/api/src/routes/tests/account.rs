use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::json;

use super::common::*;
use crate::models::user::Role;

#[tokio::test]
async fn test_profile_read_and_update() {
    let app = app();
    let (_, token) = app.user("lea@example.com", Role::Applicant).await;

    let (status, body) = app
        .send(
            axum::http::Method::PUT,
            "/api/v2/account/profile",
            Some(&token),
            Some(json!({ "name": "Lea Keller", "birthdate": "1994-03-08" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Lea Keller");

    let (status, body) = app.get("/api/v2/account/profile", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "lea@example.com");
    assert_eq!(body["birthdate"], "1994-03-08");
}

#[tokio::test]
async fn test_deletion_request_and_cancel() {
    let app = app();
    let (lea, token) = app.user("lea@example.com", Role::Applicant).await;

    let (status, body) = app
        .post("/api/v2/account/request-deletion", &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let due: DateTime<Utc> = body["deletionDueAt"].as_str().unwrap().parse().unwrap();
    assert!(due > Utc::now() + chrono::Duration::days(29));

    let stored = app.state.store.find_user(lea.id).await.unwrap().unwrap();
    assert!(stored.deletion_requested_at.is_some());

    let (status, _) = app.delete("/api/v2/account/request-deletion", &token).await;
    assert_eq!(status, StatusCode::OK);
    let stored = app.state.store.find_user(lea.id).await.unwrap().unwrap();
    assert!(stored.deletion_due_at.is_none());
}

#[tokio::test]
async fn test_staff_cannot_request_deletion() {
    let app = app();
    let (_, hr) = app.user("hr@chocadies.ch", Role::Hr).await;
    let (status, _) = app
        .post("/api/v2/account/request-deletion", &hr, json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deleted_account_token_is_invalid() {
    let app = app();
    let (lea, token) = app.user("lea@example.com", Role::Applicant).await;
    app.state.store.delete_user(lea.id).await.unwrap();

    let (status, body) = app.get("/api/v2/account/profile", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(reason(&body), "invalid_token");
}
