pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use state::AppState;

use crate::{utils::error::ServiceError, Config, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

pub async fn serve(config: Config) -> Result<()> {
    let addr = config.bind_addr;
    let state = AppState::new(config)?;
    let app = create_app(state);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  POST /api/detect-person - Multipart image upload");
    tracing::info!("  GET  /                  - Service info");
    tracing::info!("  GET  /health            - Health check");

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        ServiceError::Internal(format!("Failed to bind to address {}: {}", addr, e))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServiceError::Internal(format!("Server failed: {}", e)))?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let max_request_size = state.config.server_config.max_request_size;

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/api/detect-person", post(handlers::detect_person_handler))
        // multipart uploads are capped by RequestBodyLimitLayer instead of axum's 2MB default
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_request_size))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .with_state(state)
}
