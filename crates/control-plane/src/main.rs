// Confhub API server
// Decision: Storage backend chosen by DATABASE_URL (memory:// for dev mode)

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use confhub_control_plane::{build_app, config::Settings, storage::StorageBackend};
use confhub_core::telemetry::{init_telemetry, TelemetryConfig};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Configure via environment variables:
    // - SERVICE_NAME: Service name (default: "confhub")
    // - RUST_LOG: Log filter (default: "confhub_control_plane=debug,tower_http=debug")
    // - LOG_FORMAT: "json" for structured output
    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.service_name == "confhub" {
        telemetry_config.service_name = "confhub-control-plane".to_string();
    }
    if telemetry_config.log_filter.is_none() {
        telemetry_config.log_filter =
            Some("confhub_control_plane=debug,tower_http=debug".to_string());
    }
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    init_telemetry(telemetry_config);

    tracing::info!("confhub-control-plane starting...");

    let settings = Settings::from_env();

    let db = StorageBackend::from_url(&settings.database_url)
        .await
        .context("Failed to initialize storage")?;
    if db.is_dev_mode() {
        tracing::warn!("Using in-memory storage; data is lost on restart");
    } else {
        tracing::info!("Connected to database");
    }
    let db = Arc::new(db);

    if !settings.api_prefix.is_empty() {
        tracing::info!(prefix = %settings.api_prefix, "API prefix configured");
    }
    tracing::info!(
        access_token_lifetime_secs = settings.jwt.access_token_lifetime.as_secs(),
        "Authentication configured"
    );

    let app = build_app(db, settings.jwt.clone(), &settings.api_prefix);

    // Add CORS layer only if origins are configured
    let cors_origins: Vec<HeaderValue> = settings
        .cors_allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let app = if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
        app
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                ]),
        )
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind_addr))?;
    tracing::info!("HTTP server listening on {}", settings.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
