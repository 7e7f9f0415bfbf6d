// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot CLI commands.
//!
//! Results go to stdout as JSON (or a plain line for `normalize`);
//! diagnostics go to stderr. Exit code 0 means success, 1 a failed
//! delivery or invalid identifier, 2 rejected input.

use courier_config::CourierConfig;
use courier_core::{
    Category, Channel, CourierError, DeliveryRecord, HistoryQuery, HistoryStore, OutboundMessage,
};
use courier_failover::{DispatchError, NetworkMonitor};
use courier_storage::SqliteHistory;
use serde::Serialize;
use tracing::warn;

use crate::wiring;

/// Process exit codes.
pub const OK: u8 = 0;
/// Delivery failed on every channel, or the identifier is malformed.
pub const FAILED: u8 = 1;
/// Input refused before any delivery.
pub const REJECTED: u8 = 2;

fn print_json<T: Serialize>(value: &T) -> Result<(), CourierError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CourierError::Internal(format!("failed to encode output: {e}")))?;
    println!("{text}");
    Ok(())
}

/// `courier send`
pub async fn run_send(
    config: &CourierConfig,
    to: String,
    body: String,
    category: Category,
    prefer: Option<Channel>,
) -> Result<u8, CourierError> {
    let history = wiring::open_history(config).await?;
    let monitor = NetworkMonitor::new(config.network.initial_state);
    let orchestrator = wiring::build_orchestrator(config, history.clone(), monitor)?;

    let mut message = OutboundMessage::new(to, body, category);
    message.preferred_channel = prefer;
    let outcome = orchestrator.send(message).await;
    finish_send(outcome, &history).await
}

/// Print the outcome, then checkpoint history.
///
/// A checkpoint failure after the record is appended does not change what
/// happened to the message, so it is logged and the exit code stands.
async fn finish_send(
    outcome: Result<DeliveryRecord, DispatchError>,
    history: &SqliteHistory,
) -> Result<u8, CourierError> {
    let code = report_send(outcome);
    if let Err(e) = history.close().await {
        warn!(error = %e, "failed to checkpoint delivery history");
    }
    code
}

fn report_send(outcome: Result<DeliveryRecord, DispatchError>) -> Result<u8, CourierError> {
    match outcome {
        Ok(record) => {
            print_json(&record)?;
            Ok(if record.is_delivered() {
                OK
            } else {
                FAILED
            })
        }
        Err(DispatchError::AuditFailed { record, source }) => {
            print_json(&record)?;
            Err(source)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Ok(REJECTED)
        }
    }
}

/// `courier history`
pub async fn run_history(
    config: &CourierConfig,
    recipient: Option<String>,
    limit: usize,
    offset: usize,
) -> Result<u8, CourierError> {
    let mut query = HistoryQuery::latest(limit).skip(offset);
    if let Some(raw) = recipient {
        match config.dialing.plan().normalize(&raw) {
            Ok(normalized) => query.recipient = Some(normalized),
            Err(e) => {
                eprintln!("error: {e}");
                return Ok(REJECTED);
            }
        }
    }

    let history = wiring::open_history(config).await?;
    let records = history.recent(&query).await;
    history.close().await?;
    print_json(&records?)?;
    Ok(OK)
}

/// `courier validate-identifier`
pub fn run_validate_identifier(config: &CourierConfig, sid: &str) -> Result<u8, CourierError> {
    let result = config.identifier.rule().validate(sid);
    print_json(&result)?;
    Ok(if result.is_valid {
        OK
    } else {
        FAILED
    })
}

/// `courier normalize`
pub fn run_normalize(config: &CourierConfig, number: &str) -> u8 {
    match config.dialing.plan().normalize(number) {
        Ok(normalized) => {
            println!("{normalized}");
            OK
        }
        Err(e) => {
            eprintln!("error: {e}");
            REJECTED
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigSummary {
    database_path: String,
    gateway: String,
    gateway_auth: bool,
    default_order: Vec<Channel>,
    timeout_secs: u64,
    configured_channels: Vec<Channel>,
    missing: Vec<String>,
}

/// `courier check-config`
///
/// Configuration has already been validated by the time this runs; this
/// reports what the service would do with it. No channel configured at all
/// is an error, matching `serve`.
pub fn run_check_config(config: &CourierConfig) -> Result<u8, CourierError> {
    let mut configured = Vec::new();
    let mut missing = Vec::new();
    for channel in Channel::ALL {
        let provider = config.provider(channel);
        if provider.is_configured() {
            configured.push(channel);
        } else {
            missing.push(format!(
                "{channel}: {}",
                provider.missing_credentials().join(", ")
            ));
        }
    }

    let summary = ConfigSummary {
        database_path: config.storage.database_path.clone(),
        gateway: format!("{}:{}", config.gateway.host, config.gateway.port),
        gateway_auth: config.gateway.bearer_token.is_some(),
        default_order: config.delivery.default_order.clone(),
        timeout_secs: config.delivery.timeout_secs,
        configured_channels: configured.clone(),
        missing,
    };
    print_json(&summary)?;

    if configured.is_empty() {
        eprintln!("error: no delivery channel is configured");
        return Ok(FAILED);
    }
    Ok(OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CourierConfig {
        courier_config::load_and_validate_str("").unwrap()
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert_eq!(run_normalize(&config(), "abc"), REJECTED);
        assert_eq!(run_normalize(&config(), "0821234567"), OK);
    }

    #[test]
    fn validate_identifier_exit_codes() {
        let sid = format!("SM{}", "f".repeat(32));
        assert_eq!(run_validate_identifier(&config(), &sid).unwrap(), OK);
        assert_eq!(
            run_validate_identifier(&config(), "SM123").unwrap(),
            FAILED
        );
    }

    fn delivered_record() -> DeliveryRecord {
        let cfg = config();
        let recipient = cfg.dialing.plan().normalize("0821234567").unwrap();
        let mut draft = courier_core::DeliveryDraft::begin(recipient, "hi", Category::Info);
        let sid = format!("SM{}", "a".repeat(32));
        draft.record_attempt(courier_core::ChannelAttempt::succeeded(
            Channel::Sms,
            courier_core::ProviderMessageId(sid.clone()),
            cfg.identifier.rule().validate(&sid),
            courier_core::record::now_millis(),
        ));
        draft.seal()
    }

    #[tokio::test]
    async fn delivered_send_survives_checkpoint_failure() {
        // Never initialized, so close() fails.
        let history = SqliteHistory::new(config().storage);
        assert!(history.close().await.is_err());

        let code = finish_send(Ok(delivered_record()), &history).await.unwrap();
        assert_eq!(code, OK);
    }

    #[tokio::test]
    async fn audit_failure_still_reports_storage_error() {
        let history = SqliteHistory::new(config().storage);
        let outcome = Err(DispatchError::AuditFailed {
            record: Box::new(delivered_record()),
            source: CourierError::Internal("disk full".into()),
        });
        assert!(finish_send(outcome, &history).await.is_err());
    }

    #[test]
    fn check_config_without_channels_fails() {
        assert_eq!(run_check_config(&config()).unwrap(), FAILED);
    }
}
