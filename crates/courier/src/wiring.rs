// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the runtime object graph from configuration.
//!
//! Shared by `serve` and the one-shot commands so both deliver through the
//! same orchestrator setup.

use std::sync::Arc;
use std::time::Duration;

use courier_config::CourierConfig;
use courier_core::{Channel, ChannelAdapter, CourierError, HistoryStore, PluginAdapter};
use courier_failover::{FailoverOrchestrator, NetworkMonitor};
use courier_storage::SqliteHistory;
use courier_twilio::{SmsChannel, WhatsAppChannel};
use tracing::{debug, info};

/// Build an adapter for every channel whose credentials are complete.
///
/// Skipped channels are logged at debug level with the missing keys; the
/// resulting degradation is warned about once by the orchestrator builder.
pub fn build_channels(config: &CourierConfig) -> Result<Vec<Arc<dyn ChannelAdapter>>, CourierError> {
    let timeout = Duration::from_secs(config.delivery.timeout_secs);
    let mut channels: Vec<Arc<dyn ChannelAdapter>> = Vec::new();

    for channel in Channel::ALL {
        let provider = config.provider(channel);
        if !provider.is_configured() {
            debug!(
                channel = %channel,
                missing = %provider.missing_credentials().join(", "),
                "channel credentials incomplete, skipping"
            );
            continue;
        }

        let adapter: Arc<dyn ChannelAdapter> = match channel {
            Channel::WhatsApp => Arc::new(WhatsAppChannel::from_config(provider, timeout)?),
            Channel::Sms => Arc::new(SmsChannel::from_config(provider, timeout)?),
        };
        info!(channel = %channel, adapter = adapter.name(), "channel ready");
        channels.push(adapter);
    }

    Ok(channels)
}

/// Open the SQLite history store named in `[storage]`.
pub async fn open_history(config: &CourierConfig) -> Result<Arc<SqliteHistory>, CourierError> {
    Ok(Arc::new(SqliteHistory::open(config.storage.clone()).await?))
}

/// Assemble the orchestrator over `history` with every configured channel.
pub fn build_orchestrator(
    config: &CourierConfig,
    history: Arc<dyn HistoryStore>,
    monitor: NetworkMonitor,
) -> Result<FailoverOrchestrator, CourierError> {
    let mut builder = FailoverOrchestrator::builder(history)
        .with_config(config)
        .monitor(monitor);
    for adapter in build_channels(config)? {
        builder = builder.channel(adapter);
    }
    builder.build().map_err(|e| match e {
        CourierError::Config(msg) => CourierError::Config(format!(
            "{msg}: set account_sid, auth_token and from under [whatsapp] or [sms]"
        )),
        other => other,
    })
}
