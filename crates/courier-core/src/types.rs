// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the delivery pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::phone::NormalizedRecipient;

/// Unique identifier for a delivery record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(pub String);

impl DeliveryId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque message identifier returned by a channel provider on acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderMessageId(pub String);

impl ProviderMessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    History,
}

/// A concrete delivery transport.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    /// Rich messaging (WhatsApp). Requires a data connection end to end.
    WhatsApp,
    /// Plain SMS. Reaches handsets without a data connection.
    Sms,
}

impl Channel {
    /// Every channel, in declaration order.
    pub const ALL: [Channel; 2] = [Channel::WhatsApp, Channel::Sms];

    /// Whether this channel still reaches the recipient when data
    /// connectivity is unavailable.
    pub fn works_offline(self) -> bool {
        match self {
            Channel::WhatsApp => false,
            Channel::Sms => true,
        }
    }

    /// The channel that is not `self`.
    pub fn other(self) -> Channel {
        match self {
            Channel::WhatsApp => Channel::Sms,
            Channel::Sms => Channel::WhatsApp,
        }
    }

    /// The offline-capable channel.
    pub fn offline_capable() -> Channel {
        Channel::Sms
    }
}

/// Informational tag carried by a message for audit purposes.
///
/// Category never alters routing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Emergency,
    Notification,
    Reminder,
    Info,
}

/// Connectivity as last reported to the network monitor.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Connectivity {
    #[default]
    Online,
    Offline,
}

/// Transport-level result of one channel attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttemptOutcome {
    Succeeded,
    Failed,
}

/// Terminal result of a whole failover sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryOutcome {
    Delivered,
    Failed,
}

/// Why a channel attempt failed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum FailureKind {
    /// The adapter call did not complete within the configured bound.
    Timeout,
    /// The provider refused our credentials.
    AuthenticationFailure,
    /// The provider refused this recipient or this body.
    RecipientRejected,
    /// Provider-side or local rate limit.
    RateLimited,
    /// Provider unreachable or returning server errors.
    ProviderOutage,
}

/// A send request as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Phone number as typed by a human, in any local or international format.
    pub recipient: String,
    /// Message text.
    pub body: String,
    /// Audit tag.
    pub category: Category,
    /// Caller's first choice of channel, honoured while online.
    #[serde(default)]
    pub preferred_channel: Option<Channel>,
}

impl OutboundMessage {
    pub fn new(recipient: impl Into<String>, body: impl Into<String>, category: Category) -> Self {
        Self {
            recipient: recipient.into(),
            body: body.into(),
            category,
            preferred_channel: None,
        }
    }

    pub fn prefer(mut self, channel: Channel) -> Self {
        self.preferred_channel = Some(channel);
        self
    }
}

/// Parameters for a history lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Restrict to one destination; `None` returns every recipient.
    pub recipient: Option<NormalizedRecipient>,
    /// Maximum number of records to return.
    pub limit: usize,
    /// Number of records to skip (for paging).
    pub offset: usize,
}

impl HistoryQuery {
    pub fn latest(limit: usize) -> Self {
        Self {
            recipient: None,
            limit,
            offset: 0,
        }
    }

    pub fn for_recipient(recipient: NormalizedRecipient, limit: usize) -> Self {
        Self {
            recipient: Some(recipient),
            limit,
            offset: 0,
        }
    }

    pub fn skip(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}
