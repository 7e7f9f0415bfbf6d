// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp channel adapter over the Twilio Messages API.
//!
//! Twilio routes a message to WhatsApp when both `To` and `From` use the
//! `whatsapp:` address scheme.

use std::time::Duration;

use async_trait::async_trait;
use courier_config::ChannelProviderConfig;
use courier_core::{
    AdapterType, Channel, ChannelAdapter, CourierError, HealthStatus, NormalizedRecipient,
    PluginAdapter, ProviderMessageId, TransportError,
};
use tracing::debug;

use crate::client::TwilioClient;

const SCHEME: &str = "whatsapp:";

/// Longest WhatsApp body Twilio accepts.
pub const MAX_WHATSAPP_CHARS: usize = 4096;

/// Rich messaging through Twilio's WhatsApp sender.
pub struct WhatsAppChannel {
    client: TwilioClient,
    from: String,
}

impl WhatsAppChannel {
    /// `from` may be given with or without the `whatsapp:` prefix.
    pub fn new(client: TwilioClient, from: impl Into<String>) -> Self {
        Self {
            client,
            from: with_scheme(&from.into()),
        }
    }

    /// Build from the `[whatsapp]` config section.
    pub fn from_config(
        config: &ChannelProviderConfig,
        request_timeout: Duration,
    ) -> Result<Self, CourierError> {
        let (client, from) = crate::client_from_config("whatsapp", config, request_timeout)?;
        Ok(Self::new(client, from))
    }
}

fn with_scheme(address: &str) -> String {
    if address.starts_with(SCHEME) {
        address.to_string()
    } else {
        format!("{SCHEME}{address}")
    }
}

#[async_trait]
impl PluginAdapter for WhatsAppChannel {
    fn name(&self) -> &str {
        "twilio-whatsapp"
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
impl ChannelAdapter for WhatsAppChannel {
    fn channel(&self) -> Channel {
        Channel::WhatsApp
    }

    fn max_body_chars(&self) -> Option<usize> {
        Some(MAX_WHATSAPP_CHARS)
    }

    async fn send(
        &self,
        recipient: &NormalizedRecipient,
        body: &str,
    ) -> Result<ProviderMessageId, TransportError> {
        debug!(to = %recipient.masked(), "sending WhatsApp message");
        self.client
            .create_message(&with_scheme(recipient.as_str()), &self.from, body)
            .await
    }
}
