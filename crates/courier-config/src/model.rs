// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Courier delivery service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use courier_core::{Channel, Connectivity, DialingPlan, SidRule};
use serde::{Deserialize, Serialize};

/// Top-level Courier configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CourierConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP surface.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Delivery history database.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Numbering rules used to normalize recipients.
    #[serde(default)]
    pub dialing: DialingConfig,

    /// Provider identifier grammar.
    #[serde(default)]
    pub identifier: IdentifierConfig,

    /// Failover policy.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Connectivity monitoring.
    #[serde(default)]
    pub network: NetworkConfig,

    /// WhatsApp (rich messaging) provider.
    #[serde(default)]
    pub whatsapp: ChannelProviderConfig,

    /// SMS provider.
    #[serde(default)]
    pub sms: ChannelProviderConfig,
}

impl CourierConfig {
    /// Provider settings for one channel.
    pub fn provider(&self, channel: Channel) -> &ChannelProviderConfig {
        match channel {
            Channel::WhatsApp => &self.whatsapp,
            Channel::Sms => &self.sms,
        }
    }
}

/// Process identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Name reported in logs and health output.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "courier".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on API routes. `None` leaves them open.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8640
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("courier").join("courier.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("courier.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Dialing plan of the target country.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DialingConfig {
    /// Country calling code without `+`.
    #[serde(default = "default_country_code")]
    pub country_code: String,

    /// National trunk prefix replaced by the country code.
    #[serde(default = "default_trunk_prefix")]
    pub trunk_prefix: String,

    /// Subscriber digits following the country code.
    #[serde(default = "default_subscriber_digits")]
    pub subscriber_digits: usize,
}

impl Default for DialingConfig {
    fn default() -> Self {
        Self {
            country_code: default_country_code(),
            trunk_prefix: default_trunk_prefix(),
            subscriber_digits: default_subscriber_digits(),
        }
    }
}

impl DialingConfig {
    pub fn plan(&self) -> DialingPlan {
        DialingPlan::new(
            self.country_code.clone(),
            self.trunk_prefix.clone(),
            self.subscriber_digits,
        )
    }
}

fn default_country_code() -> String {
    "27".to_string()
}

fn default_trunk_prefix() -> String {
    "0".to_string()
}

fn default_subscriber_digits() -> usize {
    9
}

/// Provider identifier grammar.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentifierConfig {
    /// Two-letter tag every identifier starts with.
    #[serde(default = "default_sid_prefix")]
    pub prefix: String,

    /// Total identifier length including the prefix.
    #[serde(default = "default_sid_length")]
    pub length: usize,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            prefix: default_sid_prefix(),
            length: default_sid_length(),
        }
    }
}

impl IdentifierConfig {
    pub fn rule(&self) -> SidRule {
        SidRule::new(self.prefix.clone(), self.length)
    }
}

fn default_sid_prefix() -> String {
    "SM".to_string()
}

fn default_sid_length() -> usize {
    34
}

/// Failover policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Channel order used when neither connectivity nor the caller decides.
    #[serde(default = "default_order")]
    pub default_order: Vec<Channel>,

    /// Hard bound on each adapter call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            default_order: default_order(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_order() -> Vec<Channel> {
    vec![Channel::WhatsApp, Channel::Sms]
}

fn default_timeout_secs() -> u64 {
    15
}

/// Connectivity monitoring.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// State assumed at startup, before any report arrives.
    #[serde(default)]
    pub initial_state: Connectivity,

    /// URL probed with HTTP HEAD to detect connectivity. `None` disables probing.
    #[serde(default)]
    pub probe_url: Option<String>,

    /// Seconds between probes.
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            initial_state: Connectivity::Online,
            probe_url: None,
            probe_interval_secs: default_probe_interval_secs(),
        }
    }
}

fn default_probe_interval_secs() -> u64 {
    30
}

/// Credentials and limits for one channel's provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelProviderConfig {
    /// Provider account identifier.
    #[serde(default)]
    pub account_sid: Option<String>,

    /// Provider auth token.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Sender number (E.164).
    #[serde(default)]
    pub from: Option<String>,

    /// Provider REST endpoint.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Local cap on sends per minute. `None` means unlimited.
    #[serde(default)]
    pub rate_limit_per_minute: Option<u32>,
}

impl Default for ChannelProviderConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            from: None,
            api_base: default_api_base(),
            rate_limit_per_minute: None,
        }
    }
}

impl ChannelProviderConfig {
    /// Whether every credential needed to send is present and non-empty.
    pub fn is_configured(&self) -> bool {
        [&self.account_sid, &self.auth_token, &self.from]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    /// Names of the credential keys that are missing or empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (key, value) in [
            ("account_sid", &self.account_sid),
            ("auth_token", &self.auth_token),
            ("from", &self.from),
        ] {
            if value.as_deref().is_none_or(|s| s.trim().is_empty()) {
                missing.push(key);
            }
        }
        missing
    }
}

fn default_api_base() -> String {
    "https://api.twilio.com".to_string()
}
