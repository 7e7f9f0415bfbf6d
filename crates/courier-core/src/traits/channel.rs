// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for delivery transports (WhatsApp, SMS).

use async_trait::async_trait;

use crate::error::TransportError;
use crate::phone::NormalizedRecipient;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Channel, ProviderMessageId};

/// One concrete delivery transport.
///
/// Implementations make exactly one provider call per `send` and never retry
/// internally: ordering, retry and timeout policy belong to the failover
/// orchestrator.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Which channel this adapter delivers on.
    fn channel(&self) -> Channel;

    /// Longest body (in characters) the provider accepts, if bounded.
    fn max_body_chars(&self) -> Option<usize> {
        None
    }

    /// Hand one message to the provider.
    async fn send(
        &self,
        recipient: &NormalizedRecipient,
        body: &str,
    ) -> Result<ProviderMessageId, TransportError>;
}
