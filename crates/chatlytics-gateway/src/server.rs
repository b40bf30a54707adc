// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use chatlytics_analytics::{AnalyticService, MessageIngestor};
use chatlytics_core::ChatlyticsError;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// State for the unauthenticated health and metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    pub start_time: std::time::Instant,
    /// Renders Prometheus text when the exporter is enabled.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub service: AnalyticService,
    pub ingestor: MessageIngestor,
    pub auth: AuthConfig,
    pub health: HealthState,
}

/// Bind address and credentials, mirroring the `[gateway]` config section.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token for `/v1/*` (None rejects every request).
    pub bearer_token: Option<String>,
}

/// Builds the full route table.
///
/// - GET /health, GET /metrics (public)
/// - POST, GET /v1/analytics
/// - GET, DELETE /v1/analytics/{id}
/// - POST /v1/analytics/{id}/compute
/// - POST /v1/messages
pub fn router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .route("/metrics", get(handlers::get_public_metrics))
        .with_state(state.health.clone());

    let api_routes = Router::new()
        .route(
            "/v1/analytics",
            post(handlers::create_analytic).get(handlers::list_analytics),
        )
        .route(
            "/v1/analytics/{id}",
            get(handlers::get_analytic).delete(handlers::delete_analytic),
        )
        .route(
            "/v1/analytics/{id}/compute",
            post(handlers::compute_analytic),
        )
        .route("/v1/messages", post(handlers::post_messages))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves the gateway until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), ChatlyticsError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ChatlyticsError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| ChatlyticsError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
