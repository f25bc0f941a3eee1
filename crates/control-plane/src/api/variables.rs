// Variable CRUD HTTP routes, scoped to one environment
// Decision: Variables are addressed by (environment name, variable name);
// the environment is resolved first so a missing one is always a 404

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use confhub_core::Variable;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::common::{double_option, ApiJson, ApiPath, ErrorResponse};
use super::validation::{validate_description, validate_name, validate_value};
use crate::auth::{AuthState, AuthUser};
use crate::services::{ServiceError, VariableService};
use crate::storage::StorageBackend;

/// Request to create a variable in an environment
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateVariableRequest {
    /// Variable name, unique within the environment.
    #[schema(example = "DATABASE_PORT")]
    pub name: String,
    /// Variable value.
    #[schema(example = "5432")]
    pub value: String,
    /// A human-readable description of the variable.
    #[serde(default)]
    pub description: Option<String>,
    /// Mark the value as sensitive (advisory only). Defaults to false.
    #[serde(default)]
    pub is_sensitive: bool,
}

/// Full replacement of a variable. Omitted optional fields are reset:
/// description to null, is_sensitive to false.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReplaceVariableRequest {
    #[schema(example = "9090")]
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_sensitive: bool,
}

/// Partial update of a variable. Only fields present in the body are applied;
/// an explicit null description clears it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PatchVariableRequest {
    #[serde(default)]
    #[schema(example = "9090")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub is_sensitive: Option<bool>,
}

/// App state for variable routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VariableService>,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(db: Arc<StorageBackend>, auth: AuthState) -> Self {
        Self {
            service: Arc::new(VariableService::new(db)),
            auth,
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(input: &AppState) -> Self {
        input.auth.clone()
    }
}

/// Create variable routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/environments/:env_name/variables/",
            get(list_variables).post(create_variable),
        )
        .route(
            "/environments/:env_name/variables/:var_name",
            get(get_variable)
                .put(replace_variable)
                .patch(patch_variable)
                .delete(delete_variable),
        )
        .with_state(state)
}

/// POST /environments/{env_name}/variables/ - Create a variable
#[utoipa::path(
    post,
    path = "/environments/{env_name}/variables/",
    params(
        ("env_name" = String, Path, description = "Environment name")
    ),
    request_body = CreateVariableRequest,
    responses(
        (status = 201, description = "Variable created", body = Variable),
        (status = 400, description = "Variable name already used in this environment", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Environment not found", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "variables"
)]
pub async fn create_variable(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(env_name): ApiPath<String>,
    ApiJson(req): ApiJson<CreateVariableRequest>,
) -> Result<(StatusCode, Json<Variable>), ServiceError> {
    validate_name("name", &req.name)?;
    validate_value(&req.value)?;
    validate_description(req.description.as_deref())?;

    let variable = state.service.create(&env_name, req).await?;
    Ok((StatusCode::CREATED, Json(variable)))
}

/// GET /environments/{env_name}/variables/ - List all variables of an environment
#[utoipa::path(
    get,
    path = "/environments/{env_name}/variables/",
    params(
        ("env_name" = String, Path, description = "Environment name")
    ),
    responses(
        (status = 200, description = "Variables ordered by id", body = Vec<Variable>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Environment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "variables"
)]
pub async fn list_variables(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(env_name): ApiPath<String>,
) -> Result<Json<Vec<Variable>>, ServiceError> {
    let variables = state.service.list(&env_name).await?;
    Ok(Json(variables))
}

/// GET /environments/{env_name}/variables/{var_name} - Get a variable
#[utoipa::path(
    get,
    path = "/environments/{env_name}/variables/{var_name}",
    params(
        ("env_name" = String, Path, description = "Environment name"),
        ("var_name" = String, Path, description = "Variable name")
    ),
    responses(
        (status = 200, description = "Variable found", body = Variable),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Environment or variable not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "variables"
)]
pub async fn get_variable(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath((env_name, var_name)): ApiPath<(String, String)>,
) -> Result<Json<Variable>, ServiceError> {
    let variable = state.service.get(&env_name, &var_name).await?;
    Ok(Json(variable))
}

/// PUT /environments/{env_name}/variables/{var_name} - Replace a variable
#[utoipa::path(
    put,
    path = "/environments/{env_name}/variables/{var_name}",
    params(
        ("env_name" = String, Path, description = "Environment name"),
        ("var_name" = String, Path, description = "Variable name")
    ),
    request_body = ReplaceVariableRequest,
    responses(
        (status = 200, description = "Variable replaced", body = Variable),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Environment or variable not found", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "variables"
)]
pub async fn replace_variable(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath((env_name, var_name)): ApiPath<(String, String)>,
    ApiJson(req): ApiJson<ReplaceVariableRequest>,
) -> Result<Json<Variable>, ServiceError> {
    validate_value(&req.value)?;
    validate_description(req.description.as_deref())?;

    let variable = state.service.replace(&env_name, &var_name, req).await?;
    Ok(Json(variable))
}

/// PATCH /environments/{env_name}/variables/{var_name} - Partially update a variable
#[utoipa::path(
    patch,
    path = "/environments/{env_name}/variables/{var_name}",
    params(
        ("env_name" = String, Path, description = "Environment name"),
        ("var_name" = String, Path, description = "Variable name")
    ),
    request_body = PatchVariableRequest,
    responses(
        (status = 200, description = "Variable updated", body = Variable),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Environment or variable not found", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "variables"
)]
pub async fn patch_variable(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath((env_name, var_name)): ApiPath<(String, String)>,
    ApiJson(req): ApiJson<PatchVariableRequest>,
) -> Result<Json<Variable>, ServiceError> {
    if let Some(value) = &req.value {
        validate_value(value)?;
    }
    validate_description(req.description.as_ref().and_then(|d| d.as_deref()))?;

    let variable = state.service.patch(&env_name, &var_name, req).await?;
    Ok(Json(variable))
}

/// DELETE /environments/{env_name}/variables/{var_name} - Delete a variable
#[utoipa::path(
    delete,
    path = "/environments/{env_name}/variables/{var_name}",
    params(
        ("env_name" = String, Path, description = "Environment name"),
        ("var_name" = String, Path, description = "Variable name")
    ),
    responses(
        (status = 204, description = "Variable deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Environment or variable not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "variables"
)]
pub async fn delete_variable(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath((env_name, var_name)): ApiPath<(String, String)>,
) -> Result<StatusCode, ServiceError> {
    state.service.delete(&env_name, &var_name).await?;
    Ok(StatusCode::NO_CONTENT)
}
