use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::agency::{Agency, Permission};
use crate::models::user::{Role, User};
use crate::state::AppState;
use crate::store::Store;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Caller identified by a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Extracts `<token>` from `Bearer <token>`; the scheme is case-insensitive.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(char::is_whitespace)?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::Unauthorized("missing_token"))?;

        let claims = state.tokens.verify(token).map_err(|e| {
            debug!("rejected bearer token: {e}");
            AppError::Unauthorized("invalid_token")
        })?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require(|role| role == Role::Admin)
    }

    /// HR back office: `hr` and `admin`.
    pub fn require_staff(&self) -> Result<(), AppError> {
        self.require(|role| role.is_staff())
    }

    pub fn require_applicant(&self) -> Result<(), AppError> {
        self.require(|role| role == Role::Applicant)
    }

    fn require(&self, allowed: impl Fn(Role) -> bool) -> Result<(), AppError> {
        if allowed(self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Loads the caller's user record; a token for a deleted account is
    /// treated as invalid.
    pub async fn load(&self, store: &dyn Store) -> Result<User, AppError> {
        store
            .find_user(self.id)
            .await?
            .ok_or(AppError::Unauthorized("invalid_token"))
    }
}

/// Partner identified by an active agency API key.
#[derive(Debug, Clone)]
pub struct AgencyAuth(pub Agency);

#[async_trait]
impl FromRequestParts<AppState> for AgencyAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AppError::Unauthorized("missing_api_key"))?;

        let agency = state
            .store
            .find_active_agency_by_key(key)
            .await?
            .ok_or(AppError::Unauthorized("invalid_api_key"))?;

        Ok(AgencyAuth(agency))
    }
}

impl AgencyAuth {
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.0.allows(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}
