use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::password::hash_password;
use crate::config::Config;
use crate::linkedin::LinkedInStub;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::Job;
use crate::models::user::{Role, User};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::MemoryStore;

pub const PASSWORD: &str = "Pralinen-2024";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn app() -> TestApp {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(LinkedInStub),
        Config::for_tests(),
    );
    TestApp {
        router: build_router(state.clone()),
        state,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send_with(method, uri, token.map(|t| ("authorization", format!("Bearer {t}"))), body)
            .await
    }

    pub async fn send_with(
        &self,
        method: Method,
        uri: &str,
        header: Option<(&str, String)>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some((name, value)) = header {
            request = request.header(name, value);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Inserts a user with [`PASSWORD`] and returns it with a bearer token.
    pub async fn user(&self, email: &str, role: Role) -> (User, String) {
        let hash = hash_password(PASSWORD, self.state.config.bcrypt_cost)
            .await
            .unwrap();
        let user = User::new(email, role, Some(hash));
        self.state.store.insert_user(&user).await.unwrap();
        let token = self.state.tokens.issue(&user).unwrap();
        (user, token)
    }

    pub async fn job(&self, title: &str, open: bool) -> Job {
        let job = Job::new(
            title.to_string(),
            format!("{title} (short)"),
            format!("{title} in unserer Manufaktur"),
            open,
        );
        self.state.store.insert_job(&job).await.unwrap();
        job
    }

    pub async fn application(
        &self,
        job: &Job,
        user: &User,
        status: ApplicationStatus,
    ) -> Application {
        let mut application = Application::new(job.id, user.id, None);
        application.set_status(status, self.state.config.application_retention());
        self.state
            .store
            .insert_application(&application)
            .await
            .unwrap();
        application
    }
}

pub fn reason(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}
