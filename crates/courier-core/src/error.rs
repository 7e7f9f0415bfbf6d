// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Courier delivery service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::FailureKind;

/// The primary error type used across adapter traits and service plumbing.
///
/// Channel transport failures are NOT reported through this type; they are
/// expected outcomes and travel as [`TransportError`] inside a channel attempt.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// History store errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter construction or lifecycle errors.
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A failed provider call, as reported by a channel adapter.
///
/// Every variant of [`FailureKind`] triggers failover to the next channel.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {detail}")]
pub struct TransportError {
    /// Failure class.
    pub kind: FailureKind,
    /// Provider- or adapter-supplied description of what went wrong.
    pub detail: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::Timeout, detail)
    }

    pub fn authentication(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::AuthenticationFailure, detail)
    }

    pub fn rejected(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::RecipientRejected, detail)
    }

    pub fn rate_limited(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::RateLimited, detail)
    }

    pub fn outage(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::ProviderOutage, detail)
    }
}

/// A recipient that cannot be normalized into the dialing plan's format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid recipient `{raw}`: {reason}")]
pub struct InvalidRecipient {
    /// The input as submitted.
    pub raw: String,
    /// Why normalization rejected it.
    pub reason: String,
}
