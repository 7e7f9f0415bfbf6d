// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-level dispatch errors.

use courier_core::{CourierError, DeliveryRecord, InvalidRecipient};
use thiserror::Error;

/// Why a dispatch did not produce a persisted record.
///
/// Channel failures are not here: they become attempts on the record.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The recipient could not be normalized. No channel was attempted.
    #[error(transparent)]
    InvalidRecipient(#[from] InvalidRecipient),

    #[error("message body is empty")]
    EmptyBody,

    /// Cancelled before the primary channel call started.
    #[error("dispatch cancelled before any channel was attempted")]
    Cancelled,

    /// The sequence ran to completion but the history write failed.
    /// `record` is what would have been stored.
    #[error("delivery {} finished as {} but could not be recorded: {source}", .record.id, .record.final_outcome)]
    AuditFailed {
        record: Box<DeliveryRecord>,
        #[source]
        source: CourierError,
    },
}

impl DispatchError {
    /// Stable reason code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::InvalidRecipient(_) => "InvalidRecipient",
            DispatchError::EmptyBody => "EmptyBody",
            DispatchError::Cancelled => "Cancelled",
            DispatchError::AuditFailed { .. } => "AuditFailed",
        }
    }

    /// The sealed record, when the sequence got that far.
    pub fn record(&self) -> Option<&DeliveryRecord> {
        match self {
            DispatchError::AuditFailed { record, .. } => Some(record),
            _ => None,
        }
    }
}
