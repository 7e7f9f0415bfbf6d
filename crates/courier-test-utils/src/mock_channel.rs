// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` plays back a script of outcomes, one per `send`, and
//! records every call for assertion in tests. Once the script runs out the
//! fallback outcome repeats.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use courier_core::{
    AdapterType, Channel, ChannelAdapter, CourierError, HealthStatus, NormalizedRecipient,
    PluginAdapter, ProviderMessageId, TransportError,
};

/// A well-formed `SM` + 32 hex identifier, unique per call.
pub fn valid_sid() -> String {
    format!("SM{}", uuid::Uuid::new_v4().simple())
}

/// What one `send` call does.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Accept with a fresh well-formed identifier.
    Accept,
    /// Accept with this exact identifier (which may be malformed).
    AcceptWith(String),
    /// Fail with this error.
    Fail(TransportError),
    /// Never complete. Only a caller-side timeout ends the call.
    Hang,
}

/// One captured `send` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient: NormalizedRecipient,
    pub body: String,
}

/// A scripted channel adapter.
pub struct MockChannel {
    channel: Channel,
    script: Mutex<VecDeque<MockOutcome>>,
    fallback: MockOutcome,
    calls: Mutex<Vec<SentMessage>>,
    delay: Option<Duration>,
    max_body: Option<usize>,
}

impl MockChannel {
    /// A channel that accepts every message.
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            script: Mutex::new(VecDeque::new()),
            fallback: MockOutcome::Accept,
            calls: Mutex::new(Vec::new()),
            delay: None,
            max_body: None,
        }
    }

    /// A channel whose every call fails with `error`.
    pub fn failing(channel: Channel, error: TransportError) -> Self {
        Self::new(channel).always(MockOutcome::Fail(error))
    }

    /// Queue an outcome for the next unscripted call.
    pub fn then(mut self, outcome: MockOutcome) -> Self {
        self.script.get_mut().push_back(outcome);
        self
    }

    /// Outcome used once the script is exhausted.
    pub fn always(mut self, outcome: MockOutcome) -> Self {
        self.fallback = outcome;
        self
    }

    /// Sleep this long before resolving each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Advertise a body cap.
    pub fn with_max_body(mut self, chars: usize) -> Self {
        self.max_body = Some(chars);
        self
    }

    /// Every call made so far, in order.
    pub async fn calls(&self) -> Vec<SentMessage> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        match self.channel {
            Channel::WhatsApp => "mock-whatsapp",
            Channel::Sms => "mock-sms",
        }
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn max_body_chars(&self) -> Option<usize> {
        self.max_body
    }

    async fn send(
        &self,
        recipient: &NormalizedRecipient,
        body: &str,
    ) -> Result<ProviderMessageId, TransportError> {
        self.calls.lock().await.push(SentMessage {
            recipient: recipient.clone(),
            body: body.to_string(),
        });
        let outcome = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match outcome {
            MockOutcome::Accept => Ok(ProviderMessageId(valid_sid())),
            MockOutcome::AcceptWith(sid) => Ok(ProviderMessageId(sid)),
            MockOutcome::Fail(error) => Err(error),
            MockOutcome::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::FailureKind;

    fn to() -> NormalizedRecipient {
        NormalizedRecipient::from_canonical("+27821234567")
    }

    #[test]
    fn valid_sid_is_well_formed() {
        assert!(courier_core::sid::validate(&valid_sid()).is_valid);
    }

    #[tokio::test]
    async fn script_then_fallback() {
        let mock = MockChannel::new(Channel::Sms)
            .then(MockOutcome::Fail(TransportError::outage("down")))
            .then(MockOutcome::AcceptWith("SMbad".into()));

        let first = mock.send(&to(), "a").await.unwrap_err();
        assert_eq!(first.kind, FailureKind::ProviderOutage);
        assert_eq!(mock.send(&to(), "b").await.unwrap().as_str(), "SMbad");
        assert!(mock.send(&to(), "c").await.unwrap().as_str().starts_with("SM"));

        let bodies: Vec<_> = mock.calls().await.into_iter().map(|c| c.body).collect();
        assert_eq!(bodies, vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn hang_never_resolves() {
        let mock = MockChannel::new(Channel::WhatsApp).always(MockOutcome::Hang);
        let result =
            tokio::time::timeout(Duration::from_secs(60), mock.send(&to(), "x")).await;
        assert!(result.is_err());
        assert_eq!(mock.call_count().await, 1);
    }
}
