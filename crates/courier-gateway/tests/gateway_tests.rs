// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use courier_core::{Channel, HistoryStore, TransportError};
use courier_failover::FailoverOrchestrator;
use courier_gateway::{AuthConfig, GatewayState, HealthState, router};
use courier_test_utils::{FailingHistory, MemoryHistory, MockChannel, MockOutcome};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(
    history: Arc<dyn HistoryStore>,
    whatsapp: MockChannel,
    sms: Option<MockChannel>,
    token: Option<&str>,
) -> Router {
    let mut builder = FailoverOrchestrator::builder(history).channel(Arc::new(whatsapp));
    if let Some(sms) = sms {
        builder = builder.channel(Arc::new(sms));
    }
    router(GatewayState {
        orchestrator: Arc::new(builder.build().unwrap()),
        auth: AuthConfig {
            bearer_token: token.map(str::to_string),
        },
        health: HealthState::new(Some(Arc::new(|| "courier_up 1\n".to_string()))),
    })
}

fn app() -> Router {
    app_with(
        Arc::new(MemoryHistory::new()),
        MockChannel::new(Channel::WhatsApp),
        Some(MockChannel::new(Channel::Sms)),
        None,
    )
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn submit(recipient: &str) -> Request<Body> {
    json_request(
        Method::POST,
        "/messages",
        json!({"recipient": recipient, "body": "Clinic visit tomorrow", "category": "reminder"}),
    )
}

#[tokio::test]
async fn post_message_delivers_and_is_listed() {
    let app = app();

    let (status, body) = call(&app, submit("082 123 4567")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["finalOutcome"], "delivered");
    assert_eq!(body["finalChannel"], "whatsapp");
    assert_eq!(body["attempts"].as_array().unwrap().len(), 1);
    assert!(body.get("error").is_none());
    let id = body["deliveryRecordId"].as_str().unwrap().to_string();

    let (status, list) = call(&app, get("/messages?recipient=0821234567&limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id);

    let (status, one) = call(&app, get(&format!("/messages/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["recipient"], "+27821234567");
}

#[tokio::test]
async fn both_channels_failing_reports_all_channels_failed() {
    let app = app_with(
        Arc::new(MemoryHistory::new()),
        MockChannel::failing(Channel::WhatsApp, TransportError::timeout("slow")),
        Some(MockChannel::failing(Channel::Sms, TransportError::rate_limited("429"))),
        None,
    );

    let (status, body) = call(&app, submit("0821234567")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["finalOutcome"], "failed");
    assert_eq!(body["error"], "AllChannelsFailed");
    assert_eq!(body["attempts"][0]["failure"]["kind"], "Timeout");
    assert_eq!(body["attempts"][1]["failure"]["kind"], "RateLimited");
}

#[tokio::test]
async fn invalid_recipient_is_bad_request() {
    let (status, body) = call(&app(), submit("")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidRecipient");
}

#[tokio::test]
async fn empty_body_is_bad_request() {
    let request = json_request(
        Method::POST,
        "/messages",
        json!({"recipient": "0821234567", "body": "", "category": "info"}),
    );
    let (status, body) = call(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "EmptyBody");
}

#[tokio::test]
async fn audit_failure_returns_record_with_500() {
    let app = app_with(
        Arc::new(FailingHistory),
        MockChannel::new(Channel::WhatsApp),
        None,
        None,
    );
    let (status, body) = call(&app, submit("0821234567")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "AuditFailed");
    assert_eq!(body["record"]["finalOutcome"], "delivered");
}

#[tokio::test]
async fn unknown_record_is_not_found() {
    let (status, body) = call(&app(), get("/messages/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn history_rejects_malformed_recipient() {
    let (status, _) = call(&app(), get("/messages?recipient=12")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validate_identifier_reports_reason() {
    let sid = format!("AC{}", "a".repeat(32));
    let request = json_request(Method::POST, "/validate-identifier", json!({"sid": sid}));
    let (status, body) = call(&app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isValid"], false);
    assert_eq!(body["reason"], "WrongPrefix");

    let request = json_request(
        Method::POST,
        "/validate-identifier",
        json!({"sid": format!("SM{}", "0123456789abcdef".repeat(2))}),
    );
    let (_, body) = call(&app(), request).await;
    assert_eq!(body["isValid"], true);
}

#[tokio::test]
async fn network_override_reorders_channels() {
    let app = app();

    let (status, body) = call(
        &app,
        json_request(Method::PUT, "/network", json!({"state": "offline"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);

    let (_, body) = call(&app, get("/network")).await;
    assert_eq!(body["state"], "offline");

    let request = json_request(
        Method::POST,
        "/messages",
        json!({
            "recipient": "0821234567",
            "body": "hi",
            "category": "emergency",
            "preferredChannel": "whatsapp"
        }),
    );
    let (_, body) = call(&app, request).await;
    assert_eq!(body["finalChannel"], "sms");
}

#[tokio::test]
async fn bearer_token_guards_api_but_not_health() {
    let app = app_with(
        Arc::new(MemoryHistory::new()),
        MockChannel::new(Channel::WhatsApp),
        Some(MockChannel::new(Channel::Sms)),
        Some("s3cret"),
    );

    let (status, _) = call(&app, get("/messages")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .uri("/messages")
        .header("authorization", "Bearer nope")
        .body(Body::empty())
        .unwrap();
    assert_eq!(call(&app, wrong).await.0, StatusCode::UNAUTHORIZED);

    let right = Request::builder()
        .uri("/messages")
        .header("authorization", "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    assert_eq!(call(&app, right).await.0, StatusCode::OK);

    assert_eq!(call(&app, get("/health")).await.0, StatusCode::OK);

    let metrics = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);
    let text = to_bytes(metrics.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&text).contains("courier_up"));
}

#[tokio::test]
async fn health_reports_missing_channel_as_degraded() {
    let app = app_with(
        Arc::new(MemoryHistory::new()),
        MockChannel::new(Channel::WhatsApp).then(MockOutcome::Accept),
        None,
        None,
    );
    let (status, body) = call(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["connectivity"], "online");
    let names: Vec<_> = body["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["history:memory", "channel:whatsapp", "channel:sms"]);
}

#[tokio::test]
async fn failing_history_makes_health_unavailable() {
    let app = app_with(
        Arc::new(FailingHistory),
        MockChannel::new(Channel::WhatsApp),
        Some(MockChannel::new(Channel::Sms)),
        None,
    );
    let (status, body) = call(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}
