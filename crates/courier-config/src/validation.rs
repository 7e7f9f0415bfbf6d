// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as numeric dialing codes, distinct channel orders and timeout bounds.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{ChannelProviderConfig, CourierConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Allowed range for `delivery.timeout_secs`.
pub const TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=120;

/// E.164 caps a full number at 15 digits.
const MAX_E164_DIGITS: usize = 15;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CourierConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        fail(format!(
            "service.log_level `{}` must be one of {}",
            config.service.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config
        .gateway
        .bearer_token
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        fail("gateway.bearer_token must not be empty when set".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let dialing = &config.dialing;
    let cc_len = dialing.country_code.len();
    if !(1..=3).contains(&cc_len) || !dialing.country_code.chars().all(|c| c.is_ascii_digit()) {
        fail(format!(
            "dialing.country_code `{}` must be 1-3 digits",
            dialing.country_code
        ));
    }
    if !dialing.trunk_prefix.chars().all(|c| c.is_ascii_digit()) {
        fail(format!(
            "dialing.trunk_prefix `{}` must contain only digits",
            dialing.trunk_prefix
        ));
    }
    if !(4..=14).contains(&dialing.subscriber_digits) {
        fail(format!(
            "dialing.subscriber_digits must be between 4 and 14, got {}",
            dialing.subscriber_digits
        ));
    } else if cc_len + dialing.subscriber_digits > MAX_E164_DIGITS {
        fail(format!(
            "dialing.country_code plus dialing.subscriber_digits exceeds {MAX_E164_DIGITS} digits"
        ));
    }

    let identifier = &config.identifier;
    if identifier.prefix.chars().count() != 2
        || !identifier.prefix.chars().all(|c| c.is_ascii_alphabetic())
    {
        fail(format!(
            "identifier.prefix `{}` must be two letters",
            identifier.prefix
        ));
    }
    if identifier.length <= identifier.prefix.chars().count() {
        fail(format!(
            "identifier.length must be greater than the prefix length, got {}",
            identifier.length
        ));
    }

    let order = &config.delivery.default_order;
    let distinct: HashSet<_> = order.iter().collect();
    if order.len() != 2 || distinct.len() != 2 {
        fail(format!(
            "delivery.default_order must name two distinct channels, got [{}]",
            order
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    if !TIMEOUT_RANGE.contains(&config.delivery.timeout_secs) {
        fail(format!(
            "delivery.timeout_secs must be between {} and {}, got {}",
            TIMEOUT_RANGE.start(),
            TIMEOUT_RANGE.end(),
            config.delivery.timeout_secs
        ));
    }

    if config.network.probe_interval_secs == 0 {
        fail("network.probe_interval_secs must be at least 1".to_string());
    }
    if let Some(url) = &config.network.probe_url
        && !is_http_url(url)
    {
        fail(format!("network.probe_url `{url}` must be an http(s) URL"));
    }

    for (section, provider) in [("whatsapp", &config.whatsapp), ("sms", &config.sms)] {
        validate_provider(section, provider, &mut fail);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_provider(
    section: &str,
    provider: &ChannelProviderConfig,
    fail: &mut impl FnMut(String),
) {
    if !is_http_url(&provider.api_base) {
        fail(format!(
            "{section}.api_base `{}` must be an http(s) URL",
            provider.api_base
        ));
    }
    if provider.rate_limit_per_minute == Some(0) {
        fail(format!(
            "{section}.rate_limit_per_minute must be positive when set"
        ));
    }
}

fn is_http_url(url: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| url.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}
