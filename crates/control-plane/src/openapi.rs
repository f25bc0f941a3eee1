// OpenAPI specification generation
//
// Shared by the API server (for Swagger UI) and the export-openapi binary
// (for static spec generation).

use crate::api::{self, ErrorResponse, Paginated};
use crate::auth;
use confhub_core::{Environment, User, Variable};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation for the Confhub API
#[derive(OpenApi)]
#[openapi(
    paths(
        api::status::status,
        auth::routes::login,
        api::users::list_users,
        api::users::create_user,
        api::users::get_user,
        api::users::update_user,
        api::environments::list_environments,
        api::environments::create_environment,
        api::environments::get_environment,
        api::environments::put_environment,
        api::environments::update_environment,
        api::environments::delete_environment,
        api::variables::create_variable,
        api::variables::list_variables,
        api::variables::get_variable,
        api::variables::replace_variable,
        api::variables::patch_variable,
        api::variables::delete_variable,
    ),
    components(
        schemas(
            User, Environment, Variable,
            ErrorResponse,
            Paginated<User>,
            Paginated<Environment>,
            api::status::StatusResponse,
            auth::routes::LoginRequest, auth::routes::TokenResponse,
            api::users::CreateUserRequest, api::users::UpdateUserRequest,
            api::environments::CreateEnvironmentRequest,
            api::environments::UpdateEnvironmentRequest,
            api::variables::CreateVariableRequest,
            api::variables::ReplaceVariableRequest,
            api::variables::PatchVariableRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "status", description = "Liveness endpoint"),
        (name = "auth", description = "Login and token issuing"),
        (name = "users", description = "User management endpoints"),
        (name = "environments", description = "Environment management endpoints"),
        (name = "variables", description = "Variable management endpoints, scoped to an environment")
    ),
    info(
        title = "Confhub API",
        version = "0.1.0",
        description = "API for managing configuration environments and their variables",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by protected routes
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> Result<String, serde_json::Error> {
        Self::openapi().to_pretty_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_all_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/status/",
            "/users/auth/login",
            "/users/",
            "/users/{user_id}/",
            "/environments/",
            "/environments/{env_name}/",
            "/environments/{env_name}/variables/",
            "/environments/{env_name}/variables/{var_name}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_environment_update_documents_put_and_patch() {
        let json = ApiDoc::to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let item = &value["paths"]["/environments/{env_name}/"];
        for method in ["get", "put", "patch", "delete"] {
            assert!(item[method].is_object(), "missing {}", method);
        }
    }

    #[test]
    fn test_spec_has_bearer_scheme() {
        let json = ApiDoc::to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["components"]["securitySchemes"]["bearer"]["scheme"],
            "bearer"
        );
    }
}
