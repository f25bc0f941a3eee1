// Confhub Control Plane Library
// Decision: Shared library for binaries (API server, OpenAPI export) and tests

use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// API routes and types (shared for OpenAPI generation)
pub mod api;

// Authentication module
pub mod auth;

// Settings and secret resolution
pub mod config;

// Services layer
pub mod services;

// Storage layer
pub mod storage;

// OpenAPI spec generation
pub mod openapi;

use auth::{AuthState, JwtConfig};
use storage::StorageBackend;

/// Build every API route (users, login, environments, variables) without a prefix
pub fn build_api_router(db: Arc<StorageBackend>, jwt: JwtConfig) -> Router {
    let auth_state = AuthState::new(jwt, db.clone());

    let users_state = api::users::AppState::new(db.clone());
    let environments_state = api::environments::AppState::new(db.clone(), auth_state.clone());
    let variables_state = api::variables::AppState::new(db, auth_state.clone());

    Router::new()
        .merge(auth::routes(auth_state))
        .merge(api::users::routes(users_state))
        .merge(api::environments::routes(environments_state))
        .merge(api::variables::routes(variables_state))
}

/// Build the full application: /status/ (never prefixed), the API routes
/// under `api_prefix`, and Swagger UI.
pub fn build_app(db: Arc<StorageBackend>, jwt: JwtConfig, api_prefix: &str) -> Router {
    let api_routes = build_api_router(db, jwt);

    Router::new()
        .merge(api::status::routes())
        .merge(build_router_with_prefix(api_routes, api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", openapi::ApiDoc::openapi()))
}

/// Build router with optional API prefix (extracted for testing)
pub fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_routes() -> Router {
        Router::new().route("/environments/", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn test_api_prefix_empty() {
        let app = build_router_with_prefix(test_routes(), "");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/environments/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_api_prefix_set() {
        let app = build_router_with_prefix(test_routes(), "/api");

        // Route should work with prefix
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/environments/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);

        // Route should NOT work without prefix
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/environments/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_status_is_never_prefixed() {
        let db = Arc::new(StorageBackend::in_memory());
        let app = build_app(db, JwtConfig::new("test-secret"), "/api");

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/status/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/status/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
