// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio channel adapters for the Courier delivery service.
//!
//! Both adapters speak the Twilio Messages REST API. [`SmsChannel`] sends
//! plain numbers; [`WhatsAppChannel`] sends the same numbers under the
//! `whatsapp:` address scheme.

pub mod client;
pub mod sms;
pub mod whatsapp;

use std::time::Duration;

use courier_config::ChannelProviderConfig;
use courier_core::{CourierError, FailureKind, HealthStatus};

pub use client::TwilioClient;
pub use sms::SmsChannel;
pub use whatsapp::WhatsAppChannel;

/// Build a client and sender number from one provider section.
///
/// Fails with [`CourierError::Config`] naming every missing credential.
fn client_from_config(
    section: &str,
    config: &ChannelProviderConfig,
    request_timeout: Duration,
) -> Result<(TwilioClient, String), CourierError> {
    let missing = config.missing_credentials();
    if !missing.is_empty() {
        return Err(CourierError::Config(format!(
            "[{section}] is missing {}",
            missing.join(", ")
        )));
    }
    let (Some(sid), Some(token), Some(from)) =
        (&config.account_sid, &config.auth_token, &config.from)
    else {
        return Err(CourierError::Config(format!("[{section}] is incomplete")));
    };
    let client = TwilioClient::new(sid, token, &config.api_base, request_timeout)?;
    Ok((client, from.trim().to_string()))
}

/// Shared health check: fetch the account and grade the answer.
async fn account_health(client: &TwilioClient) -> HealthStatus {
    match client.check_account().await {
        Ok(()) => HealthStatus::Healthy,
        Err(e) if e.kind == FailureKind::AuthenticationFailure => {
            HealthStatus::Unhealthy(e.to_string())
        }
        Err(e) => HealthStatus::Degraded(e.to_string()),
    }
}
