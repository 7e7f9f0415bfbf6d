// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexical validation of provider message identifiers (SIDs).
//!
//! A well-formed identifier is a fixed two-letter channel tag followed by
//! hexadecimal digits, with a fixed total length (`SM` + 32 hex digits by
//! default). Each failure mode gets its own [`SidDefect`] so operators can
//! tell a provider bug (bad hex) from a transport mismatch (wrong tag).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Why an identifier failed validation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum SidDefect {
    /// Empty or whitespace-only.
    EmptyIdentifier,
    /// Total length differs from the rule's length.
    WrongLength,
    /// Does not start with the rule's prefix.
    WrongPrefix,
    /// A character after the prefix is not `[0-9a-fA-F]`.
    NonHexCharacter,
}

/// Outcome of validating one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// `None` when valid.
    pub reason: Option<SidDefect>,
    /// Human-readable explanation.
    pub detail: String,
}

impl ValidationResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            reason: None,
            detail: "well-formed identifier".to_string(),
        }
    }

    fn invalid(reason: SidDefect, detail: String) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason),
            detail,
        }
    }
}

/// Grammar for one provider's identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidRule {
    /// Required leading tag, e.g. `SM`.
    pub prefix: String,
    /// Required total length including the prefix.
    pub length: usize,
}

impl Default for SidRule {
    fn default() -> Self {
        Self {
            prefix: "SM".to_string(),
            length: 34,
        }
    }
}

impl SidRule {
    pub fn new(prefix: impl Into<String>, length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            length,
        }
    }

    /// Check `sid` against this rule.
    ///
    /// Checks run in a fixed order: emptiness, length, prefix, hex body.
    pub fn validate(&self, sid: &str) -> ValidationResult {
        if sid.trim().is_empty() {
            return ValidationResult::invalid(
                SidDefect::EmptyIdentifier,
                "identifier is empty".to_string(),
            );
        }

        let length = sid.chars().count();
        if length != self.length {
            return ValidationResult::invalid(
                SidDefect::WrongLength,
                format!("expected {} characters, got {length}", self.length),
            );
        }

        let Some(body) = sid.strip_prefix(self.prefix.as_str()) else {
            let found: String = sid.chars().take(self.prefix.chars().count()).collect();
            return ValidationResult::invalid(
                SidDefect::WrongPrefix,
                format!("expected prefix `{}`, found `{found}`", self.prefix),
            );
        };

        if let Some((pos, c)) = body.chars().enumerate().find(|(_, c)| !c.is_ascii_hexdigit()) {
            let position = pos + self.prefix.chars().count();
            return ValidationResult::invalid(
                SidDefect::NonHexCharacter,
                format!("non-hexadecimal character `{c}` at position {position}"),
            );
        }

        ValidationResult::valid()
    }
}

/// Validate with the default `SM` + 32 hex rule.
pub fn validate(sid: &str) -> ValidationResult {
    SidRule::default().validate(sid)
}
