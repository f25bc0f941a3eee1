// Authentication HTTP routes
// Decision: Login lives under /users/auth/ next to user management

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::middleware::{AuthError, AuthState};
use crate::api::common::ApiJson;

/// Message for any failed login; never says which part was wrong
pub const LOGIN_FAILED: &str = "Incorrect username or password";

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "bearer"
    #[schema(example = "bearer")]
    pub token_type: String,
}

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/users/auth/login", post(login))
        .with_state(state)
}

/// POST /users/auth/login - Exchange username and password for a bearer token
#[utoipa::path(
    post,
    path = "/users/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Incorrect username or password", body = crate::api::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::api::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let user = state
        .users
        .authenticate(&req.username, &req.password)
        .await
        .map_err(|e| {
            tracing::error!("Login failed with internal error: {}", e);
            AuthError::internal()
        })?
        .ok_or_else(|| {
            tracing::debug!(username = %req.username, "Rejected login attempt");
            AuthError::unauthorized(LOGIN_FAILED)
        })?;

    let access_token = state.jwt_service.issue(&user.username).map_err(|e| {
        tracing::error!("Failed to issue access token: {}", e);
        AuthError::internal()
    })?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
