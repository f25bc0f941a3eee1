// Users API routes
// Decision: User management routes carry no auth extractor; they are the
// bootstrap path for creating the first account

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use confhub_core::User;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::common::{ApiJson, ApiPath, ErrorResponse, PageQuery, Paginated, Pagination};
use super::validation::{validate_password, validate_username};
use crate::services::{ServiceError, UserService};
use crate::storage::StorageBackend;

/// Request to create a user
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Unique login name (at most 100 characters).
    #[schema(example = "alice")]
    pub username: String,
    /// Plain-text password; stored only as a hash.
    /// `password_hash` is accepted as an alias for older clients.
    #[serde(alias = "password_hash")]
    pub password: String,
    /// Grant admin privileges. Defaults to false.
    #[serde(default)]
    pub is_admin: bool,
}

/// Request to update a user. All fields are replaced; the password is rehashed.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[serde(alias = "password_hash")]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// App state for users routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<UserService>,
}

impl AppState {
    pub fn new(db: Arc<StorageBackend>) -> Self {
        Self {
            service: Arc::new(UserService::new(db)),
        }
    }
}

/// Create users routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/users/", get(list_users).post(create_user))
        .route("/users/:user_id/", get(get_user).put(update_user))
        .with_state(state)
}

/// GET /users/ - List users
#[utoipa::path(
    get,
    path = "/users/",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of users ordered by id", body = Paginated<User>),
        (status = 422, description = "Invalid pagination parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    pagination: Pagination,
) -> Result<Json<Paginated<User>>, ServiceError> {
    let (users, count) = state
        .service
        .list(pagination.page, pagination.page_size)
        .await?;

    Ok(Json(pagination.envelope(users, count)))
}

/// POST /users/ - Create a user
#[utoipa::path(
    post,
    path = "/users/",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Username already taken", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ServiceError> {
    validate_username(&req.username)?;
    validate_password(&req.password)?;

    let user = state.service.create(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/{user_id}/ - Get a user by id
#[utoipa::path(
    get,
    path = "/users/{user_id}/",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<User>, ServiceError> {
    let user = state.service.get(user_id).await?;
    Ok(Json(user))
}

/// PUT /users/{user_id}/ - Replace a user's username, password and admin flag
#[utoipa::path(
    put,
    path = "/users/{user_id}/",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Username already taken", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>, ServiceError> {
    validate_username(&req.username)?;
    validate_password(&req.password)?;

    let user = state.service.update(user_id, req).await?;
    Ok(Json(user))
}
