// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! every call is a no-op.

use courier_core::{Channel, Connectivity, DeliveryOutcome, FailureKind};
use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Register all Courier metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("courier_attempts_total", "Channel attempts by channel and outcome");
    describe_counter!("courier_deliveries_total", "Sealed deliveries by final outcome");
    describe_counter!(
        "courier_identifier_anomalies_total",
        "Successful sends whose provider identifier failed validation"
    );
    describe_counter!("courier_audit_failures_total", "History appends that failed");
    describe_gauge!("courier_network_online", "1 when connectivity is online, else 0");
    describe_histogram!(
        "courier_attempt_latency_seconds",
        "Provider call latency in seconds"
    );
}

/// Record one finished attempt. `failure` is `None` on success.
pub fn record_attempt(channel: Channel, failure: Option<FailureKind>, seconds: f64) {
    let outcome = match failure {
        None => "succeeded".to_string(),
        Some(kind) => kind.to_string(),
    };
    metrics::counter!(
        "courier_attempts_total",
        "channel" => channel.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("courier_attempt_latency_seconds", "channel" => channel.to_string())
        .record(seconds);
}

pub fn record_delivery(outcome: DeliveryOutcome) {
    metrics::counter!("courier_deliveries_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_identifier_anomaly(channel: Channel) {
    metrics::counter!("courier_identifier_anomalies_total", "channel" => channel.to_string())
        .increment(1);
}

pub fn record_audit_failure() {
    metrics::counter!("courier_audit_failures_total").increment(1);
}

pub fn set_connectivity(state: Connectivity) {
    let value = match state {
        Connectivity::Online => 1.0,
        Connectivity::Offline => 0.0,
    };
    metrics::gauge!("courier_network_online").set(value);
}
