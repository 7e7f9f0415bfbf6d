// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The failover orchestrator.
//!
//! One dispatch walks a fixed state machine: normalize the recipient, pick
//! the route from a single connectivity snapshot, call the primary channel,
//! fall back to the secondary on any transport failure, seal the record,
//! append it to history. At most [`MAX_ATTEMPTS`] provider calls are made.
//!
//! Transport failures never surface as `Err`; they are recorded as
//! attempts and the caller always receives a sealed record with a
//! definitive outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use courier_config::CourierConfig;
use courier_core::record::{MAX_ATTEMPTS, now_millis};
use courier_core::{
    Channel, ChannelAdapter, ChannelAttempt, CourierError, DeliveryDraft, DeliveryId,
    DeliveryRecord, DialingPlan, HistoryStore, NormalizedRecipient, OutboundMessage,
    ProviderMessageId, SidRule, TransportError,
};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::error::DispatchError;
use crate::events::{DeliveryEvent, EventBus};
use crate::limit::ChannelLimits;
use crate::metrics;
use crate::network::NetworkMonitor;
use crate::route::plan_route;

/// Default hard timeout around each provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Routes messages across the installed channels and records every outcome.
///
/// Shared behind an `Arc`; `dispatch` takes `&self` and concurrent
/// dispatches do not serialize on each other.
pub struct FailoverOrchestrator {
    channels: HashMap<Channel, Arc<dyn ChannelAdapter>>,
    history: Arc<dyn HistoryStore>,
    monitor: NetworkMonitor,
    dialing: DialingPlan,
    sid_rule: SidRule,
    default_order: Vec<Channel>,
    timeout: Duration,
    limits: ChannelLimits,
    events: EventBus,
}

impl FailoverOrchestrator {
    pub fn builder(history: Arc<dyn HistoryStore>) -> OrchestratorBuilder {
        OrchestratorBuilder::new(history)
    }

    /// Dispatch with a token that is never cancelled.
    pub async fn send(&self, message: OutboundMessage) -> Result<DeliveryRecord, DispatchError> {
        self.dispatch(message, &CancellationToken::new()).await
    }

    /// Run the full failover sequence for one message.
    ///
    /// `cancel` is honoured only up to the moment the primary call is
    /// issued; after that the sequence always reaches a sealed record.
    pub async fn dispatch(
        &self,
        message: OutboundMessage,
        cancel: &CancellationToken,
    ) -> Result<DeliveryRecord, DispatchError> {
        let recipient = self.dialing.normalize(&message.recipient)?;
        if message.body.trim().is_empty() {
            return Err(DispatchError::EmptyBody);
        }

        let body = message.body;
        let draft = DeliveryDraft::begin(recipient, body.clone(), message.category);
        let span = info_span!(
            "dispatch",
            delivery_id = %draft.id(),
            to = %draft.recipient().masked(),
            category = %message.category,
        );
        self.run(draft, &body, message.preferred_channel, cancel)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        mut draft: DeliveryDraft,
        body: &str,
        preferred: Option<Channel>,
        cancel: &CancellationToken,
    ) -> Result<DeliveryRecord, DispatchError> {
        if cancel.is_cancelled() {
            debug!("dispatch cancelled before primary attempt");
            return Err(DispatchError::Cancelled);
        }

        let connectivity = self.monitor.snapshot();
        let plan = plan_route(
            connectivity,
            preferred,
            &self.default_order,
            &self.available_channels(),
        );
        debug!(
            route = ?plan.channels,
            reason = %plan.reason,
            connectivity = %connectivity,
            "route chosen"
        );
        self.events.publish(DeliveryEvent::RouteChosen {
            delivery_id: draft.id().clone(),
            channels: plan.channels.clone(),
            reason: plan.reason,
        });

        for channel in plan.channels.iter().take(MAX_ATTEMPTS) {
            let Some(adapter) = self.channels.get(channel) else {
                continue;
            };
            let attempt = self
                .attempt(adapter.as_ref(), draft.id(), draft.recipient(), body)
                .await;
            let delivered = attempt.is_success();
            draft.record_attempt(attempt);
            if delivered {
                break;
            }
        }

        let record = draft.seal();
        metrics::record_delivery(record.final_outcome);
        self.events.publish(DeliveryEvent::Sealed {
            delivery_id: record.id.clone(),
            outcome: record.final_outcome,
            final_channel: record.final_channel,
        });
        if record.is_delivered() {
            info!(
                channel = ?record.final_channel,
                attempts = record.attempts.len(),
                "message delivered"
            );
        } else {
            warn!(attempts = record.attempts.len(), "all channels failed");
        }

        if let Err(e) = self.history.append(&record).await {
            metrics::record_audit_failure();
            error!(error = %e, "failed to record delivery");
            return Err(DispatchError::AuditFailed {
                record: Box::new(record),
                source: e,
            });
        }
        Ok(record)
    }

    async fn attempt(
        &self,
        adapter: &dyn ChannelAdapter,
        delivery_id: &DeliveryId,
        recipient: &NormalizedRecipient,
        body: &str,
    ) -> ChannelAttempt {
        let channel = adapter.channel();
        let attempted_at = now_millis();
        let started = Instant::now();
        let result = self.call(adapter, recipient, body).await;
        metrics::record_attempt(
            channel,
            result.as_ref().err().map(|e| e.kind),
            started.elapsed().as_secs_f64(),
        );
        self.events.publish(DeliveryEvent::AttemptFinished {
            delivery_id: delivery_id.clone(),
            channel,
            failure: result.as_ref().err().map(|e| e.kind),
        });

        match result {
            Ok(id) => {
                // An identifier that fails the grammar is flagged on the
                // attempt; it never turns the success into a failure.
                let check = self.sid_rule.validate(id.as_str());
                if !check.is_valid {
                    warn!(
                        channel = %channel,
                        reason = ?check.reason,
                        detail = %check.detail,
                        "provider identifier anomaly"
                    );
                    metrics::record_identifier_anomaly(channel);
                    self.events.publish(DeliveryEvent::IdentifierAnomaly {
                        delivery_id: delivery_id.clone(),
                        channel,
                        reason: check.reason,
                    });
                }
                debug!(channel = %channel, "attempt succeeded");
                ChannelAttempt::succeeded(channel, id, check, attempted_at)
            }
            Err(e) => {
                info!(channel = %channel, reason = %e.kind, detail = %e.detail, "attempt failed");
                ChannelAttempt::failed(channel, e, attempted_at)
            }
        }
    }

    /// One provider call, after the local body-cap and rate-limit checks.
    async fn call(
        &self,
        adapter: &dyn ChannelAdapter,
        recipient: &NormalizedRecipient,
        body: &str,
    ) -> Result<ProviderMessageId, TransportError> {
        let channel = adapter.channel();
        if let Some(max) = adapter.max_body_chars() {
            let len = body.chars().count();
            if len > max {
                return Err(TransportError::rejected(format!(
                    "body is {len} characters, {channel} accepts at most {max}"
                )));
            }
        }

        if !self.limits.try_acquire(channel).await {
            return Err(TransportError::rate_limited(format!(
                "local {channel} rate limit reached"
            )));
        }

        match tokio::time::timeout(self.timeout, adapter.send(recipient, body)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout(format!(
                "no response from {channel} within {:?}",
                self.timeout
            ))),
        }
    }

    /// Channels with an installed adapter, in [`Channel::ALL`] order.
    pub fn available_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.channels.contains_key(c))
            .collect()
    }

    pub fn channel(&self, channel: Channel) -> Option<&Arc<dyn ChannelAdapter>> {
        self.channels.get(&channel)
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    pub fn monitor(&self) -> &NetworkMonitor {
        &self.monitor
    }

    pub fn dialing_plan(&self) -> &DialingPlan {
        &self.dialing
    }

    pub fn sid_rule(&self) -> &SidRule {
        &self.sid_rule
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryEvent> {
        self.events.subscribe()
    }
}

/// Assembles a [`FailoverOrchestrator`].
pub struct OrchestratorBuilder {
    channels: HashMap<Channel, Arc<dyn ChannelAdapter>>,
    history: Arc<dyn HistoryStore>,
    monitor: Option<NetworkMonitor>,
    dialing: DialingPlan,
    sid_rule: SidRule,
    default_order: Vec<Channel>,
    timeout: Duration,
    limits: ChannelLimits,
    events: Option<EventBus>,
}

impl OrchestratorBuilder {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self {
            channels: HashMap::new(),
            history,
            monitor: None,
            dialing: DialingPlan::default(),
            sid_rule: SidRule::default(),
            default_order: Channel::ALL.to_vec(),
            timeout: DEFAULT_TIMEOUT,
            limits: ChannelLimits::new(),
            events: None,
        }
    }

    /// Take dialing plan, identifier rule, default order, timeout, and rate
    /// limits from configuration. Channels are still installed separately.
    pub fn with_config(mut self, config: &CourierConfig) -> Self {
        self.dialing = config.dialing.plan();
        self.sid_rule = config.identifier.rule();
        self.default_order = config.delivery.default_order.clone();
        self.timeout = Duration::from_secs(config.delivery.timeout_secs);
        for channel in Channel::ALL {
            if let Some(per_minute) = config.provider(channel).rate_limit_per_minute {
                self = self.rate_limit(channel, per_minute);
            }
        }
        self
    }

    /// Install an adapter. A later adapter for the same channel replaces
    /// the earlier one.
    pub fn channel(mut self, adapter: Arc<dyn ChannelAdapter>) -> Self {
        self.channels.insert(adapter.channel(), adapter);
        self
    }

    pub fn monitor(mut self, monitor: NetworkMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn dialing_plan(mut self, plan: DialingPlan) -> Self {
        self.dialing = plan;
        self
    }

    pub fn sid_rule(mut self, rule: SidRule) -> Self {
        self.sid_rule = rule;
        self
    }

    pub fn default_order(mut self, order: Vec<Channel>) -> Self {
        self.default_order = order;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rate_limit(mut self, channel: Channel, per_minute: u32) -> Self {
        self.limits = self.limits.with_limit(channel, per_minute);
        self
    }

    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Fails when no channel is installed. A partially installed route is
    /// accepted and reported once here.
    pub fn build(self) -> Result<FailoverOrchestrator, CourierError> {
        if self.channels.is_empty() {
            return Err(CourierError::Config(
                "no delivery channel is configured".to_string(),
            ));
        }

        let missing: Vec<String> = Channel::ALL
            .into_iter()
            .filter(|c| !self.channels.contains_key(c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            warn!(
                missing = %missing.join(", "),
                "running in degraded mode: some channels have no adapter and will be skipped"
            );
        }

        Ok(FailoverOrchestrator {
            channels: self.channels,
            history: self.history,
            monitor: self.monitor.unwrap_or_default(),
            dialing: self.dialing,
            sid_rule: self.sid_rule,
            default_order: self.default_order,
            timeout: self.timeout,
            limits: self.limits,
            events: self.events.unwrap_or_default(),
        })
    }
}
