// Environment CRUD HTTP routes
// Decision: PUT and PATCH behave the same; the description is the only mutable field

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use confhub_core::Environment;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::common::{
    double_option, ApiJson, ApiPath, ErrorResponse, PageQuery, Paginated, Pagination,
};
use super::validation::{validate_description, validate_name};
use crate::auth::{AuthState, AuthUser};
use crate::services::{EnvironmentService, ServiceError};
use crate::storage::StorageBackend;

/// Request to create a new environment
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEnvironmentRequest {
    /// Unique name of the environment. Used in URLs.
    #[schema(example = "production")]
    pub name: String,
    /// A human-readable description of the environment.
    #[serde(default)]
    #[schema(example = "Customer-facing deployment")]
    pub description: Option<String>,
}

/// Request to update an environment.
/// An absent description is left unchanged; an explicit null clears it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEnvironmentRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, example = "Updated description")]
    pub description: Option<Option<String>>,
}

/// App state for environment routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EnvironmentService>,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(db: Arc<StorageBackend>, auth: AuthState) -> Self {
        Self {
            service: Arc::new(EnvironmentService::new(db)),
            auth,
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(input: &AppState) -> Self {
        input.auth.clone()
    }
}

/// Create environment routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/environments/",
            get(list_environments).post(create_environment),
        )
        .route(
            "/environments/:env_name/",
            get(get_environment)
                .put(put_environment)
                .patch(update_environment)
                .delete(delete_environment),
        )
        .with_state(state)
}

/// GET /environments/ - List environments
#[utoipa::path(
    get,
    path = "/environments/",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of environments ordered by id", body = Paginated<Environment>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Invalid pagination parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "environments"
)]
pub async fn list_environments(
    State(state): State<AppState>,
    _auth: AuthUser,
    pagination: Pagination,
) -> Result<Json<Paginated<Environment>>, ServiceError> {
    let (environments, count) = state
        .service
        .list(pagination.page, pagination.page_size)
        .await?;

    Ok(Json(pagination.envelope(environments, count)))
}

/// POST /environments/ - Create an environment
#[utoipa::path(
    post,
    path = "/environments/",
    request_body = CreateEnvironmentRequest,
    responses(
        (status = 201, description = "Environment created", body = Environment),
        (status = 400, description = "Environment name already taken", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "environments"
)]
pub async fn create_environment(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateEnvironmentRequest>,
) -> Result<(StatusCode, Json<Environment>), ServiceError> {
    validate_name("name", &req.name)?;
    validate_description(req.description.as_deref())?;

    let environment = state.service.create(req).await?;
    tracing::debug!(user_id = auth.id, user = %auth.username, environment = %environment.name, "Environment created");
    Ok((StatusCode::CREATED, Json(environment)))
}

/// GET /environments/{env_name}/ - Get an environment by name
#[utoipa::path(
    get,
    path = "/environments/{env_name}/",
    params(
        ("env_name" = String, Path, description = "Environment name")
    ),
    responses(
        (status = 200, description = "Environment found", body = Environment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Environment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "environments"
)]
pub async fn get_environment(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(env_name): ApiPath<String>,
) -> Result<Json<Environment>, ServiceError> {
    let environment = state.service.get(&env_name).await?;
    Ok(Json(environment))
}

/// PUT /environments/{env_name}/ - Update an environment's description
#[utoipa::path(
    put,
    path = "/environments/{env_name}/",
    params(
        ("env_name" = String, Path, description = "Environment name")
    ),
    request_body = UpdateEnvironmentRequest,
    responses(
        (status = 200, description = "Environment updated", body = Environment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Environment not found", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "environments"
)]
pub async fn put_environment(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(env_name): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateEnvironmentRequest>,
) -> Result<Json<Environment>, ServiceError> {
    apply_update(&state, &env_name, req).await
}

/// PATCH /environments/{env_name}/ - Update an environment's description
#[utoipa::path(
    patch,
    path = "/environments/{env_name}/",
    params(
        ("env_name" = String, Path, description = "Environment name")
    ),
    request_body = UpdateEnvironmentRequest,
    responses(
        (status = 200, description = "Environment updated", body = Environment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Environment not found", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "environments"
)]
pub async fn update_environment(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(env_name): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateEnvironmentRequest>,
) -> Result<Json<Environment>, ServiceError> {
    apply_update(&state, &env_name, req).await
}

async fn apply_update(
    state: &AppState,
    env_name: &str,
    req: UpdateEnvironmentRequest,
) -> Result<Json<Environment>, ServiceError> {
    validate_description(req.description.as_ref().and_then(|d| d.as_deref()))?;

    let environment = state.service.update(env_name, req).await?;
    Ok(Json(environment))
}

/// DELETE /environments/{env_name}/ - Delete an environment and all of its variables
#[utoipa::path(
    delete,
    path = "/environments/{env_name}/",
    params(
        ("env_name" = String, Path, description = "Environment name")
    ),
    responses(
        (status = 204, description = "Environment deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Environment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "environments"
)]
pub async fn delete_environment(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(env_name): ApiPath<String>,
) -> Result<StatusCode, ServiceError> {
    state.service.delete(&env_name).await?;
    tracing::info!(user_id = auth.id, environment = %env_name, "Environment deleted");
    Ok(StatusCode::NO_CONTENT)
}
