// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number normalization into a single E.164-style dialing format.
//!
//! Normalization is pure and deterministic: the same raw input always yields
//! the same [`NormalizedRecipient`], which is what lets history lookups
//! correlate `082 123 4567` with `+27 82 123 4567`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidRecipient;

/// Recipient in canonical `+<country-code><subscriber>` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedRecipient(String);

impl NormalizedRecipient {
    /// Wrap a value that was produced by [`DialingPlan::normalize`] earlier,
    /// e.g. when reading it back from the history store.
    pub fn from_canonical(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits only, without the leading `+`.
    pub fn digits(&self) -> &str {
        self.0.trim_start_matches('+')
    }

    /// Masked form for log output: keeps the country code and the last two
    /// digits, e.g. `+2782*****67`.
    pub fn masked(&self) -> String {
        let digits = self.digits();
        if digits.len() <= 6 {
            return "+****".to_string();
        }
        let head = &digits[..4];
        let tail = &digits[digits.len() - 2..];
        let hidden = "*".repeat(digits.len() - 6);
        format!("+{head}{hidden}{tail}")
    }
}

impl fmt::Display for NormalizedRecipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The numbering rules of the target country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialingPlan {
    /// Country calling code without `+`, e.g. `27`.
    pub country_code: String,
    /// Digits dialled before a national number, e.g. `0`.
    pub trunk_prefix: String,
    /// Subscriber digits after the country code, e.g. `9`.
    pub subscriber_digits: usize,
}

impl Default for DialingPlan {
    fn default() -> Self {
        Self {
            country_code: "27".to_string(),
            trunk_prefix: "0".to_string(),
            subscriber_digits: 9,
        }
    }
}

impl DialingPlan {
    pub fn new(
        country_code: impl Into<String>,
        trunk_prefix: impl Into<String>,
        subscriber_digits: usize,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            trunk_prefix: trunk_prefix.into(),
            subscriber_digits,
        }
    }

    /// Total digit count of a normalized number (country code + subscriber).
    pub fn expected_digits(&self) -> usize {
        self.country_code.len() + self.subscriber_digits
    }

    /// Canonicalize a human-entered number.
    ///
    /// Non-digits are stripped. An international `00<cc>` prefix or a
    /// leading trunk prefix is rewritten to the country code, and a trunk
    /// prefix written after the country code (`+27 (0)82 ...`) is dropped.
    /// A bare subscriber number gets the country code prepended. The result
    /// must have exactly [`expected_digits`](Self::expected_digits) digits.
    pub fn normalize(&self, raw: &str) -> Result<NormalizedRecipient, InvalidRecipient> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(InvalidRecipient {
                raw: raw.to_string(),
                reason: "no digits".to_string(),
            });
        }

        let cc = self.country_code.as_str();
        let expected = self.expected_digits();
        let international = format!("00{cc}");

        let subscriber = if let Some(rest) = digits.strip_prefix(international.as_str()) {
            self.strip_trunk_after_country_code(rest)
        } else if let Some(rest) = self.strip_trunk(&digits) {
            rest
        } else if let Some(rest) = digits.strip_prefix(cc).filter(|_| digits.len() == expected) {
            rest
        } else if let Some(rest) = digits
            .strip_prefix(cc)
            .and_then(|rest| self.strip_trunk(rest))
            .filter(|rest| rest.len() == self.subscriber_digits)
        {
            // "+27 (0)82 ..." style: country code followed by the trunk prefix.
            rest
        } else {
            digits.as_str()
        };

        if subscriber.len() != self.subscriber_digits {
            return Err(InvalidRecipient {
                raw: raw.to_string(),
                reason: format!(
                    "expected {expected} digits including country code {cc}, input has {}",
                    digits.len()
                ),
            });
        }

        let national = format!("{cc}{subscriber}");
        Ok(NormalizedRecipient(format!("+{national}")))
    }

    /// `00<cc>0<subscriber>`: drop a trunk prefix written after the country code.
    fn strip_trunk_after_country_code<'a>(&self, rest: &'a str) -> &'a str {
        if rest.len() == self.subscriber_digits + self.trunk_prefix.len() {
            self.strip_trunk(rest).unwrap_or(rest)
        } else {
            rest
        }
    }

    fn strip_trunk<'a>(&self, digits: &'a str) -> Option<&'a str> {
        if self.trunk_prefix.is_empty() {
            return None;
        }
        digits.strip_prefix(self.trunk_prefix.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn plan() -> DialingPlan {
        DialingPlan::default()
    }

    #[test]
    fn local_number_with_trunk_prefix() {
        let n = plan().normalize("0821234567").unwrap();
        assert_eq!(n.as_str(), "+27821234567");
    }

    #[test]
    fn formatted_international_number() {
        let n = plan().normalize("+27 (82) 123-4567").unwrap();
        assert_eq!(n.as_str(), "+27821234567");
    }

    #[test]
    fn international_double_zero_prefix() {
        let n = plan().normalize("00 27 82 123 4567").unwrap();
        assert_eq!(n.as_str(), "+27821234567");
    }

    #[test]
    fn trunk_prefix_after_country_code() {
        for raw in ["+27 (0)82 123 4567", "0027 (0)82 123 4567", "270821234567"] {
            assert_eq!(plan().normalize(raw).unwrap().as_str(), "+27821234567", "{raw}");
        }
    }

    #[test]
    fn error_reports_input_digit_count() {
        let err = plan().normalize("+27 (0)82 123 45").unwrap_err();
        assert!(err.reason.ends_with("input has 10"), "{}", err.reason);
    }

    #[test]
    fn bare_subscriber_number_gets_country_code() {
        let n = plan().normalize("821234567").unwrap();
        assert_eq!(n.as_str(), "+27821234567");
    }

    #[test]
    fn subscriber_that_starts_with_country_code_digits() {
        // 9-digit subscriber starting with "27" must not be mistaken for a
        // number that already carries the country code.
        let n = plan().normalize("271234567").unwrap();
        assert_eq!(n.as_str(), "+27271234567");
    }

    #[test]
    fn empty_input_is_invalid() {
        let err = plan().normalize("").unwrap_err();
        assert_eq!(err.reason, "no digits");
        assert!(plan().normalize("   ").is_err());
        assert!(plan().normalize("call me").is_err());
    }

    #[test]
    fn too_short_and_too_long_are_invalid() {
        assert!(plan().normalize("082123").is_err());
        assert!(plan().normalize("08212345678901").is_err());
        let err = plan().normalize("+1 555 0100").unwrap_err();
        assert!(err.reason.contains("expected 11 digits"));
    }

    #[test]
    fn other_dialing_plan() {
        let uk = DialingPlan::new("44", "0", 10);
        assert_eq!(uk.normalize("07700 900123").unwrap().as_str(), "+447700900123");
        assert_eq!(uk.expected_digits(), 12);
    }

    #[test]
    fn empty_trunk_prefix_is_ignored() {
        let plan = DialingPlan::new("1", "", 10);
        assert_eq!(plan.normalize("(555) 010-0199").unwrap().as_str(), "+15550100199");
    }

    #[test]
    fn masked_hides_middle_digits() {
        let n = plan().normalize("0821234567").unwrap();
        assert_eq!(n.masked(), "+2782*****67");
    }

    fn formats(subscriber: &str) -> Vec<String> {
        let (a, rest) = subscriber.split_at(2);
        let (b, c) = rest.split_at(3);
        vec![
            format!("0{subscriber}"),
            format!("0{a} {b} {c}"),
            format!("(0{a}) {b}-{c}"),
            format!("+27{subscriber}"),
            format!("+27 {a} {b} {c}"),
            format!("27{subscriber}"),
            format!("0027{subscriber}"),
            format!("+27 (0){a} {b} {c}"),
            format!("0027 (0){a} {b} {c}"),
            subscriber.to_string(),
        ]
    }

    proptest! {
        #[test]
        fn same_number_in_any_format_normalizes_identically(
            subscriber in "[1-9][0-9]{8}"
        ) {
            let plan = plan();
            let expected = format!("+27{subscriber}");
            for raw in formats(&subscriber) {
                let n = plan.normalize(&raw).unwrap();
                prop_assert_eq!(n.as_str(), expected.as_str(), "input {}", raw);
            }
        }

        #[test]
        fn normalization_is_deterministic(raw in "\\PC{0,24}") {
            let plan = plan();
            prop_assert_eq!(plan.normalize(&raw), plan.normalize(&raw));
        }

        #[test]
        fn valid_output_always_has_fixed_shape(raw in "[0-9 +()-]{0,20}") {
            if let Ok(n) = plan().normalize(&raw) {
                prop_assert!(n.as_str().starts_with("+27"));
                prop_assert_eq!(n.digits().len(), 11);
                prop_assert!(n.digits().chars().all(|c| c.is_ascii_digit()));
            }
        }
    }
}
