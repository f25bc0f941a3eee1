// Authentication extractor
// Decision: Every failure (missing header, bad signature, expiry, unknown user)
// produces the same 401 body and challenge; the reason is only logged

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::{config::JwtConfig, jwt::JwtService};
use crate::services::UserService;
use crate::storage::StorageBackend;

/// Message returned for every rejected bearer token
pub const INVALID_CREDENTIALS: &str = "Could not validate credentials";

/// Authentication error
#[derive(Debug, Clone, Serialize)]
pub struct AuthError {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::UNAUTHORIZED,
        }
    }

    pub fn internal() -> Self {
        Self {
            error: "Internal server error".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut response = (status, Json(self)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Authenticated user context extracted from request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub jwt_service: Arc<JwtService>,
    pub users: Arc<UserService>,
}

impl AuthState {
    pub fn new(config: JwtConfig, db: Arc<StorageBackend>) -> Self {
        Self {
            jwt_service: Arc::new(JwtService::new(config)),
            users: Arc::new(UserService::new(db)),
        }
    }
}

/// Extractor for authenticated user
/// This is required - returns 401 if not authenticated
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        extract_auth_user(parts, &auth_state).await
    }
}

/// Pull the token out of `Authorization: Bearer <token>` (scheme is case-insensitive)
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extract authenticated user from request
async fn extract_auth_user(parts: &Parts, auth_state: &AuthState) -> Result<AuthUser, AuthError> {
    let token = bearer_token(parts).ok_or_else(|| {
        tracing::debug!("Missing or malformed bearer token");
        AuthError::unauthorized(INVALID_CREDENTIALS)
    })?;

    let claims = auth_state.jwt_service.verify(token).map_err(|e| {
        tracing::debug!("JWT validation failed: {}", e);
        AuthError::unauthorized(INVALID_CREDENTIALS)
    })?;

    let user = auth_state
        .users
        .get_by_username(&claims.sub)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load user for token: {}", e);
            AuthError::internal()
        })?
        .ok_or_else(|| {
            tracing::debug!(username = %claims.sub, "Token subject no longer exists");
            AuthError::unauthorized(INVALID_CREDENTIALS)
        })?;

    Ok(AuthUser {
        id: user.id,
        username: user.username,
    })
}
