// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS channel adapter.

use std::time::Duration;

use async_trait::async_trait;
use courier_config::ChannelProviderConfig;
use courier_core::{
    AdapterType, Channel, ChannelAdapter, CourierError, HealthStatus, NormalizedRecipient,
    PluginAdapter, ProviderMessageId, TransportError,
};
use tracing::debug;

use crate::client::TwilioClient;

/// Twilio concatenates long SMS bodies up to this many characters.
pub const MAX_SMS_CHARS: usize = 1600;

/// Plain SMS through Twilio. Reaches handsets without data connectivity.
pub struct SmsChannel {
    client: TwilioClient,
    from: String,
}

impl SmsChannel {
    pub fn new(client: TwilioClient, from: impl Into<String>) -> Self {
        Self {
            client,
            from: from.into(),
        }
    }

    /// Build from the `[sms]` config section.
    pub fn from_config(
        config: &ChannelProviderConfig,
        request_timeout: Duration,
    ) -> Result<Self, CourierError> {
        let (client, from) = crate::client_from_config("sms", config, request_timeout)?;
        Ok(Self::new(client, from))
    }
}

#[async_trait]
impl PluginAdapter for SmsChannel {
    fn name(&self) -> &str {
        "twilio-sms"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(crate::account_health(&self.client).await)
    }
}

#[async_trait]
impl ChannelAdapter for SmsChannel {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn max_body_chars(&self) -> Option<usize> {
        Some(MAX_SMS_CHARS)
    }

    async fn send(
        &self,
        recipient: &NormalizedRecipient,
        body: &str,
    ) -> Result<ProviderMessageId, TransportError> {
        debug!(to = %recipient.masked(), "sending SMS");
        self.client
            .create_message(recipient.as_str(), &self.from, body)
            .await
    }
}
