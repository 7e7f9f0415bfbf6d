// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Courier delivery service.
//!
//! This crate provides the domain types shared by every other crate in the
//! workspace: the error type, the channel and history adapter traits, the
//! delivery record lifecycle, and the two pure rules the failover engine
//! relies on (phone number normalization and provider identifier
//! validation).

pub mod error;
pub mod phone;
pub mod record;
pub mod sid;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{CourierError, InvalidRecipient, TransportError};
pub use phone::{DialingPlan, NormalizedRecipient};
pub use record::{ChannelAttempt, DeliveryDraft, DeliveryRecord};
pub use sid::{SidDefect, SidRule, ValidationResult};
pub use types::{
    AdapterType, AttemptOutcome, Category, Channel, Connectivity, DeliveryId, DeliveryOutcome,
    FailureKind, HealthStatus, HistoryQuery, OutboundMessage, ProviderMessageId,
};

pub use traits::{ChannelAdapter, HistoryStore, PluginAdapter};
