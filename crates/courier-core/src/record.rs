// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery record lifecycle: draft while failover runs, sealed afterwards.
//!
//! A [`DeliveryDraft`] is the only mutable form. [`DeliveryDraft::seal`]
//! consumes it and derives the terminal outcome from the attempts, so a
//! sealed [`DeliveryRecord`] can never disagree with its own attempt list.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::phone::NormalizedRecipient;
use crate::sid::ValidationResult;
use crate::types::{
    AttemptOutcome, Category, Channel, DeliveryId, DeliveryOutcome, ProviderMessageId,
};

/// Maximum attempts in one failover sequence.
pub const MAX_ATTEMPTS: usize = 2;

/// Current time at the millisecond precision the history store keeps.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// One try against one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAttempt {
    pub channel: Channel,
    pub outcome: AttemptOutcome,
    /// Provider identifier, present when the provider accepted the message.
    pub provider_identifier: Option<String>,
    /// Present when the attempt failed.
    pub failure: Option<TransportError>,
    /// Shape check of `provider_identifier`. Informational only.
    pub identifier_check: Option<ValidationResult>,
    pub attempted_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ChannelAttempt {
    pub fn succeeded(
        channel: Channel,
        id: ProviderMessageId,
        identifier_check: ValidationResult,
        attempted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            channel,
            outcome: AttemptOutcome::Succeeded,
            provider_identifier: Some(id.0),
            failure: None,
            identifier_check: Some(identifier_check),
            attempted_at,
            completed_at: now_millis(),
        }
    }

    pub fn failed(channel: Channel, error: TransportError, attempted_at: DateTime<Utc>) -> Self {
        Self {
            channel,
            outcome: AttemptOutcome::Failed,
            provider_identifier: None,
            failure: Some(error),
            identifier_check: None,
            attempted_at,
            completed_at: now_millis(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == AttemptOutcome::Succeeded
    }

    /// A transport success whose identifier did not pass validation.
    pub fn has_identifier_anomaly(&self) -> bool {
        self.identifier_check
            .as_ref()
            .is_some_and(|check| !check.is_valid)
    }
}

/// The sealed, immutable result of one message's failover sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub id: DeliveryId,
    pub recipient: NormalizedRecipient,
    pub body: String,
    pub category: Category,
    pub attempts: Vec<ChannelAttempt>,
    pub final_channel: Option<Channel>,
    pub final_outcome: DeliveryOutcome,
    pub created_at: DateTime<Utc>,
    pub sealed_at: DateTime<Utc>,
}

impl DeliveryRecord {
    pub fn is_delivered(&self) -> bool {
        self.final_outcome == DeliveryOutcome::Delivered
    }

    /// Every transport failure in attempt order.
    pub fn failure_reasons(&self) -> Vec<&TransportError> {
        self.attempts
            .iter()
            .filter_map(|a| a.failure.as_ref())
            .collect()
    }
}

/// A delivery record still collecting attempts.
#[derive(Debug, Clone)]
pub struct DeliveryDraft {
    id: DeliveryId,
    recipient: NormalizedRecipient,
    body: String,
    category: Category,
    attempts: Vec<ChannelAttempt>,
    created_at: DateTime<Utc>,
}

impl DeliveryDraft {
    /// Start a record for a message whose recipient has been normalized.
    pub fn begin(recipient: NormalizedRecipient, body: impl Into<String>, category: Category) -> Self {
        Self {
            id: DeliveryId::generate(),
            recipient,
            body: body.into(),
            category,
            attempts: Vec::with_capacity(MAX_ATTEMPTS),
            created_at: now_millis(),
        }
    }

    pub fn id(&self) -> &DeliveryId {
        &self.id
    }

    pub fn recipient(&self) -> &NormalizedRecipient {
        &self.recipient
    }

    pub fn attempts(&self) -> &[ChannelAttempt] {
        &self.attempts
    }

    /// Append an attempt. Attempts after a success, or beyond
    /// [`MAX_ATTEMPTS`], are a caller bug.
    pub fn record_attempt(&mut self, attempt: ChannelAttempt) {
        debug_assert!(self.attempts.len() < MAX_ATTEMPTS, "too many attempts");
        debug_assert!(
            self.attempts.iter().all(|a| !a.is_success()),
            "attempt recorded after a success"
        );
        self.attempts.push(attempt);
    }

    /// Close the sequence. Delivered iff the last attempt succeeded.
    pub fn seal(self) -> DeliveryRecord {
        let winner = self
            .attempts
            .last()
            .filter(|a| a.is_success())
            .map(|a| a.channel);

        DeliveryRecord {
            id: self.id,
            recipient: self.recipient,
            body: self.body,
            category: self.category,
            attempts: self.attempts,
            final_channel: winner,
            final_outcome: if winner.is_some() {
                DeliveryOutcome::Delivered
            } else {
                DeliveryOutcome::Failed
            },
            created_at: self.created_at,
            sealed_at: now_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sid::validate;

    fn recipient() -> NormalizedRecipient {
        NormalizedRecipient::from_canonical("+27821234567")
    }

    fn ok_attempt(channel: Channel, sid: &str) -> ChannelAttempt {
        ChannelAttempt::succeeded(
            channel,
            ProviderMessageId(sid.to_string()),
            validate(sid),
            now_millis(),
        )
    }

    #[test]
    fn sealing_after_primary_success() {
        let mut draft = DeliveryDraft::begin(recipient(), "hello", Category::Info);
        draft.record_attempt(ok_attempt(
            Channel::WhatsApp,
            "SM0123456789abcdef0123456789abcdef",
        ));
        let record = draft.seal();
        assert!(record.is_delivered());
        assert_eq!(record.final_channel, Some(Channel::WhatsApp));
        assert!(record.failure_reasons().is_empty());
        assert!(record.sealed_at >= record.created_at);
    }

    #[test]
    fn sealing_after_two_failures_keeps_both_reasons() {
        let mut draft = DeliveryDraft::begin(recipient(), "hello", Category::Emergency);
        draft.record_attempt(ChannelAttempt::failed(
            Channel::WhatsApp,
            TransportError::timeout("no response in 15s"),
            now_millis(),
        ));
        draft.record_attempt(ChannelAttempt::failed(
            Channel::Sms,
            TransportError::rate_limited("429"),
            now_millis(),
        ));
        let record = draft.seal();
        assert_eq!(record.final_outcome, DeliveryOutcome::Failed);
        assert_eq!(record.final_channel, None);
        let kinds: Vec<_> = record.failure_reasons().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![crate::FailureKind::Timeout, crate::FailureKind::RateLimited]
        );
    }

    #[test]
    fn sealing_without_attempts_is_failed() {
        let record = DeliveryDraft::begin(recipient(), "hello", Category::Info).seal();
        assert_eq!(record.final_outcome, DeliveryOutcome::Failed);
        assert!(record.attempts.is_empty());
    }

    #[test]
    fn anomaly_is_flagged_but_success_stands() {
        let attempt = ok_attempt(Channel::Sms, "not-a-sid");
        assert!(attempt.is_success());
        assert!(attempt.has_identifier_anomaly());
    }

    #[test]
    fn record_serializes_camel_case() {
        let mut draft = DeliveryDraft::begin(recipient(), "hi", Category::Reminder);
        draft.record_attempt(ok_attempt(Channel::Sms, "SM0123456789abcdef0123456789abcdef"));
        let json = serde_json::to_value(draft.seal()).unwrap();
        assert_eq!(json["finalOutcome"], "delivered");
        assert_eq!(json["finalChannel"], "sms");
        assert_eq!(json["attempts"][0]["providerIdentifier"].as_str().unwrap().len(), 34);
        assert_eq!(json["recipient"], "+27821234567");
    }
}
