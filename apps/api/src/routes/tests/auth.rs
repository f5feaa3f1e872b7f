use axum::http::{Method, StatusCode};
use serde_json::json;

use super::common::*;
use crate::models::user::Role;

#[tokio::test]
async fn test_register_then_login_round_trip() {
    let app = app();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/public/register",
            None,
            Some(json!({
                "email": "  Lea.Keller@Example.com ",
                "password": PASSWORD,
                "name": "Lea Keller",
                "birthdate": "1994-03-08"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], true);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "lea.keller@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "lea.keller@example.com");
    assert_eq!(body["role"], "applicant");

    let token = body["token"].as_str().unwrap().to_string();
    let (status, me) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "applicant");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_missing_fields() {
    let app = app();
    app.user("taken@example.com", Role::Applicant).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/public/register",
            None,
            Some(json!({ "email": "TAKEN@example.com", "password": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(reason(&body), "email_already_registered");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/public/register",
            None,
            Some(json!({ "email": "new@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reason(&body), "missing_fields");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/public/register",
            None,
            Some(json!({ "email": "new@example.com", "password": "x", "birthdate": "08.03.1994" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reason(&body), "invalid_birthdate");
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = app();
    app.user("hr@chocadies.ch", Role::Hr).await;

    for (email, password) in [
        ("hr@chocadies.ch", "wrong"),
        ("nobody@chocadies.ch", PASSWORD),
    ] {
        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(reason(&body), "invalid_credentials");
    }
}

#[tokio::test]
async fn test_bearer_token_is_required_and_verified() {
    let app = app();

    let (status, body) = app.send(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(reason(&body), "missing_token");

    let (status, body) = app.get("/api/auth/me", "not.a.jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(reason(&body), "invalid_token");
}

#[tokio::test]
async fn test_role_gates_return_forbidden() {
    let app = app();
    let (_, applicant) = app.user("lea@example.com", Role::Applicant).await;
    let (_, hr) = app.user("hr@chocadies.ch", Role::Hr).await;

    let (status, body) = app.get("/api/v2/jobs", &applicant).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(reason(&body), "forbidden");

    let (status, _) = app.get("/api/v2/users", &hr).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bootstrap_admin_requires_secret_and_promotes() {
    let app = app();
    let (user, _) = app.user("owner@chocadies.ch", Role::Hr).await;
    let body = json!({ "email": "owner@chocadies.ch", "password": PASSWORD });

    let (status, _) = app
        .send_with(
            Method::POST,
            "/api/auth/bootstrap-admin",
            Some(("x-bootstrap-secret", "guess".to_string())),
            Some(body.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, response) = app
        .send_with(
            Method::POST,
            "/api/auth/bootstrap-admin",
            Some(("x-bootstrap-secret", "let-me-in".to_string())),
            Some(body),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["user"]["role"], "admin");
    assert_eq!(response["user"]["id"], user.id.to_string());

    let stored = app.state.store.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Admin);
}

#[tokio::test]
async fn test_bootstrap_is_disabled_without_configured_secret() {
    let mut app = app();
    app.state.config.bootstrap_secret = None;
    app.router = crate::routes::build_router(app.state.clone());

    let (status, _) = app
        .send_with(
            Method::POST,
            "/api/auth/bootstrap-admin",
            Some(("x-bootstrap-secret", "let-me-in".to_string())),
            Some(json!({ "email": "a@b.ch", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = app.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "chocadies-api");
}
