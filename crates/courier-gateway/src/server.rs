// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use courier_core::CourierError;
use courier_failover::FailoverOrchestrator;
use tokio_util::sync::CancellationToken;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Requests served at once before new ones wait.
pub const MAX_CONCURRENT_REQUESTS: usize = 512;

/// Renders the metrics exposition text for `/metrics`.
pub type MetricsRender = Arc<dyn Fn() -> String + Send + Sync>;

/// State for the unauthenticated health and metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    pub prometheus_render: Option<MetricsRender>,
}

impl HealthState {
    pub fn new(prometheus_render: Option<MetricsRender>) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            prometheus_render,
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<FailoverOrchestrator>,
    pub auth: AuthConfig,
    pub health: HealthState,
}

/// Gateway server configuration (mirrors `[gateway]` from courier-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the full route table.
///
/// - `GET /health`, `GET /metrics` (public)
/// - `POST /messages`, `GET /messages`, `GET /messages/{id}` (auth)
/// - `POST /validate-identifier` (auth)
/// - `GET /network`, `PUT /network` (auth)
pub fn router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .route("/metrics", get(handlers::get_public_metrics))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/messages",
            post(handlers::post_messages).get(handlers::get_messages),
        )
        .route("/messages/{id}", get(handlers::get_message))
        .route("/validate-identifier", post(handlers::post_validate_identifier))
        .route(
            "/network",
            get(handlers::get_network).put(handlers::put_network),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve the gateway until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish after cancellation.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), CourierError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CourierError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| CourierError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::Channel;
    use courier_test_utils::{MemoryHistory, MockChannel};

    fn state() -> GatewayState {
        let orchestrator = FailoverOrchestrator::builder(Arc::new(MemoryHistory::new()))
            .channel(Arc::new(MockChannel::new(Channel::Sms)))
            .build()
            .unwrap();
        GatewayState {
            orchestrator: Arc::new(orchestrator),
            auth: AuthConfig::default(),
            health: HealthState::new(None),
        }
    }

    #[test]
    fn gateway_state_is_clone() {
        let _cloned = state().clone();
    }

    #[tokio::test]
    async fn server_stops_on_cancel() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let handle = tokio::spawn(async move { start_server(&config, state(), token).await });
        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn bind_failure_is_channel_error() {
        let config = ServerConfig {
            host: "256.0.0.1".to_string(),
            port: 0,
        };
        let err = start_server(&config, state(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CourierError::Channel { .. }));
    }
}
