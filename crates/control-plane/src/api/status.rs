// Liveness endpoint

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "pong")]
    pub message: String,
}

/// Create status routes (never nested under the API prefix)
pub fn routes() -> Router {
    Router::new().route("/status/", get(status))
}

/// GET /status/ - Liveness check
#[utoipa::path(
    get,
    path = "/status/",
    responses(
        (status = 200, description = "Service is up", body = StatusResponse)
    ),
    tag = "status"
)]
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "pong".to_string(),
    })
}
