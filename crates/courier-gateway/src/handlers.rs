// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use courier_core::{
    Channel, ChannelAttempt, Connectivity, DeliveryId, DeliveryOutcome, DeliveryRecord,
    HealthStatus, HistoryQuery, HistoryStore, OutboundMessage, PluginAdapter,
};
use courier_failover::DispatchError;

use crate::server::GatewayState;

/// Page size for `GET /messages` when `limit` is absent.
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Largest accepted `limit`.
pub const MAX_PAGE_SIZE: usize = 500;

/// Response body for `POST /messages`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub delivery_record_id: DeliveryId,
    pub final_outcome: DeliveryOutcome,
    pub final_channel: Option<Channel>,
    pub attempts: Vec<ChannelAttempt>,
    /// `AllChannelsFailed` when no attempt succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<DeliveryRecord> for DispatchResponse {
    fn from(record: DeliveryRecord) -> Self {
        let error = (!record.is_delivered()).then(|| "AllChannelsFailed".to_string());
        Self {
            delivery_record_id: record.id,
            final_outcome: record.final_outcome,
            final_channel: record.final_channel,
            attempts: record.attempts,
            error,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable reason code.
    pub error: String,
    pub detail: String,
    /// The sealed record, when delivery ran but could not be recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<DeliveryRecord>,
}

impl ErrorResponse {
    fn new(error: &str, detail: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            detail: detail.into(),
            record: None,
        }
    }
}

fn error_response(status: StatusCode, error: &str, detail: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(error, detail))).into_response()
}

/// Query parameters for `GET /messages`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    /// Raw or already-normalized recipient.
    pub recipient: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateIdentifierRequest {
    pub sid: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkState {
    pub state: Connectivity,
}

#[derive(Debug, Serialize)]
pub struct NetworkUpdate {
    pub state: Connectivity,
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub uptime_secs: u64,
    pub connectivity: Connectivity,
    pub components: Vec<ComponentHealth>,
}

/// POST /messages
///
/// The dispatch runs in its own task. If the client disconnects before the
/// primary call starts the dispatch is cancelled; once a channel call is in
/// flight it runs to completion and is recorded regardless.
pub async fn post_messages(
    State(state): State<GatewayState>,
    Json(message): Json<OutboundMessage>,
) -> Response {
    let orchestrator = state.orchestrator.clone();
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let task = tokio::spawn(async move { orchestrator.dispatch(message, &cancel).await });
    let joined = task.await;
    guard.disarm();

    match joined {
        Ok(Ok(record)) => (StatusCode::OK, Json(DispatchResponse::from(record))).into_response(),
        Ok(Err(e)) => dispatch_error_response(e),
        Err(e) => {
            tracing::error!(error = %e, "dispatch task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal",
                "dispatch task failed",
            )
        }
    }
}

fn dispatch_error_response(err: DispatchError) -> Response {
    let code = err.code();
    let detail = err.to_string();
    match err {
        DispatchError::InvalidRecipient(_) | DispatchError::EmptyBody => {
            error_response(StatusCode::BAD_REQUEST, code, detail)
        }
        DispatchError::Cancelled => error_response(StatusCode::SERVICE_UNAVAILABLE, code, detail),
        DispatchError::AuditFailed { record, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: code.to_string(),
                detail,
                record: Some(*record),
            }),
        )
            .into_response(),
    }
}

/// GET /messages?recipient=&limit=&offset=
pub async fn get_messages(
    State(state): State<GatewayState>,
    Query(params): Query<HistoryParams>,
) -> Response {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let mut query = HistoryQuery::latest(limit).skip(params.offset.unwrap_or(0));

    if let Some(raw) = params.recipient.as_deref() {
        match state.orchestrator.dialing_plan().normalize(raw) {
            Ok(recipient) => query.recipient = Some(recipient),
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, "InvalidRecipient", e.to_string());
            }
        }
    }

    match state.orchestrator.history().recent(&query).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "history query failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Storage", e.to_string())
        }
    }
}

/// GET /messages/{id}
pub async fn get_message(State(state): State<GatewayState>, Path(id): Path<String>) -> Response {
    match state.orchestrator.history().get(&DeliveryId(id)).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "NotFound", "no such delivery record"),
        Err(e) => {
            tracing::error!(error = %e, "history lookup failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Storage", e.to_string())
        }
    }
}

/// POST /validate-identifier
pub async fn post_validate_identifier(
    State(state): State<GatewayState>,
    Json(body): Json<ValidateIdentifierRequest>,
) -> Response {
    Json(state.orchestrator.sid_rule().validate(&body.sid)).into_response()
}

/// GET /network
pub async fn get_network(State(state): State<GatewayState>) -> Json<NetworkState> {
    Json(NetworkState {
        state: state.orchestrator.monitor().snapshot(),
    })
}

/// PUT /network
pub async fn put_network(
    State(state): State<GatewayState>,
    Json(body): Json<NetworkState>,
) -> Json<NetworkUpdate> {
    let changed = state.orchestrator.monitor().set(body.state);
    Json(NetworkUpdate {
        state: body.state,
        changed,
    })
}

fn grade(status: Result<HealthStatus, courier_core::CourierError>) -> (&'static str, Option<String>) {
    match status {
        Ok(HealthStatus::Healthy) => ("healthy", None),
        Ok(HealthStatus::Degraded(detail)) => ("degraded", Some(detail)),
        Ok(HealthStatus::Unhealthy(detail)) => ("unhealthy", Some(detail)),
        Err(e) => ("unhealthy", Some(e.to_string())),
    }
}

/// GET /health (unauthenticated)
///
/// Overall status is the worst component status. A missing channel adapter
/// counts as degraded.
pub async fn get_public_health(State(state): State<GatewayState>) -> Response {
    let orchestrator = &state.orchestrator;
    let mut components = Vec::new();

    let history = orchestrator.history();
    let (status, detail) = grade(history.health_check().await);
    components.push(ComponentHealth {
        name: format!("history:{}", history.name()),
        status,
        detail,
    });

    for channel in Channel::ALL {
        let (status, detail) = match orchestrator.channel(channel) {
            Some(adapter) => grade(adapter.health_check().await),
            None => ("degraded", Some("not configured".to_string())),
        };
        components.push(ComponentHealth {
            name: format!("channel:{channel}"),
            status,
            detail,
        });
    }

    let overall = if components.iter().any(|c| c.status == "unhealthy") {
        "unhealthy"
    } else if components.iter().any(|c| c.status == "degraded") {
        "degraded"
    } else {
        "healthy"
    };
    let code = if overall == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let body = HealthResponse {
        status: overall,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        connectivity: orchestrator.monitor().snapshot(),
        components,
    };
    (code, Json(body)).into_response()
}

/// GET /metrics (unauthenticated)
pub async fn get_public_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "NotFound", "metrics are disabled"),
    }
}
