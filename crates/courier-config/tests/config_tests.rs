// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Courier configuration system.

use courier_config::diagnostic::ConfigError;
use courier_config::model::CourierConfig;
use courier_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use courier_core::{Channel, Connectivity};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_courier_config() {
    let toml = r#"
[service]
name = "clinic-notify"
log_level = "debug"

[gateway]
host = "0.0.0.0"
port = 9000
bearer_token = "s3cret"

[storage]
database_path = "/tmp/courier-test.db"
wal_mode = false

[dialing]
country_code = "44"
trunk_prefix = "0"
subscriber_digits = 10

[identifier]
prefix = "MM"
length = 34

[delivery]
default_order = ["sms", "whatsapp"]
timeout_secs = 5

[network]
initial_state = "offline"
probe_url = "https://example.com/ping"
probe_interval_secs = 10

[whatsapp]
account_sid = "AC0123"
auth_token = "token"
from = "+14155238886"

[sms]
account_sid = "AC0123"
auth_token = "token"
from = "+15005550006"
api_base = "http://localhost:8080"
rate_limit_per_minute = 30
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(config.service.name, "clinic-notify");
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("s3cret"));
    assert!(!config.storage.wal_mode);
    assert_eq!(config.dialing.plan().expected_digits(), 12);
    assert_eq!(config.identifier.rule().prefix, "MM");
    assert_eq!(config.delivery.default_order, vec![Channel::Sms, Channel::WhatsApp]);
    assert_eq!(config.delivery.timeout_secs, 5);
    assert_eq!(config.network.initial_state, Connectivity::Offline);
    assert!(config.whatsapp.is_configured());
    assert_eq!(config.whatsapp.api_base, "https://api.twilio.com");
    assert_eq!(config.sms.rate_limit_per_minute, Some(30));
    assert_eq!(config.provider(Channel::Sms).api_base, "http://localhost:8080");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.service.name, "courier");
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert!(config.gateway.bearer_token.is_none());
    assert!(config.storage.database_path.ends_with("courier.db"));
    assert!(config.storage.wal_mode);
    assert_eq!(config.dialing.country_code, "27");
    assert_eq!(config.dialing.trunk_prefix, "0");
    assert_eq!(config.dialing.subscriber_digits, 9);
    assert_eq!(config.identifier.prefix, "SM");
    assert_eq!(config.identifier.length, 34);
    assert_eq!(
        config.delivery.default_order,
        vec![Channel::WhatsApp, Channel::Sms]
    );
    assert_eq!(config.delivery.timeout_secs, 15);
    assert_eq!(config.network.initial_state, Connectivity::Online);
    assert!(config.network.probe_url.is_none());
    assert!(!config.whatsapp.is_configured());
    assert!(!config.sms.is_configured());
}

#[test]
fn unknown_key_gets_a_suggestion_and_span() {
    let toml = r#"
[sms]
auth_tken = "abc"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            ..
        } => {
            assert_eq!(key, "auth_tken");
            assert_eq!(suggestion.as_deref(), Some("auth_token"));
            assert!(valid_keys.contains("rate_limit_per_minute"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_channel_name_is_invalid_value() {
    let toml = r#"
[delivery]
default_order = ["telegram", "sms"]
"#;
    let errors = load_and_validate_str(toml).expect_err("unknown channel");
    assert!(
        errors.iter().any(|e| matches!(e, ConfigError::InvalidValue { value, .. } if value == "telegram")),
        "{errors:?}"
    );
}

#[test]
fn wrong_type_is_reported_with_key() {
    let toml = r#"
[gateway]
port = "eighty"
"#;
    let errors = load_and_validate_str(toml).expect_err("port is a number");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))),
        "{errors:?}"
    );
}

#[test]
fn semantic_errors_are_collected() {
    let toml = r#"
[delivery]
timeout_secs = 600

[identifier]
prefix = "S"
"#;
    let errors = load_and_validate_str(toml).expect_err("two semantic errors");
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

#[test]
fn partial_credentials_are_not_configured() {
    let toml = r#"
[whatsapp]
account_sid = "AC1"
auth_token = ""
"#;
    let config = load_and_validate_str(toml).expect("partial credentials still load");
    assert!(!config.whatsapp.is_configured());
    assert_eq!(
        config.whatsapp.missing_credentials(),
        vec!["auth_token", "from"]
    );
}

/// Dotted overrides (what `COURIER_SMS_AUTH_TOKEN` becomes) land in the section.
#[test]
fn dotted_override_lands_in_section() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: CourierConfig = Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::string("[sms]\nauth_token = \"from-toml\"\n"))
        .merge((courier_config::loader::map_env_key("SMS_AUTH_TOKEN"), "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.sms.auth_token.as_deref(), Some("from-env"));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let errors = load_and_validate_path(std::path::Path::new("/nonexistent/courier.toml"))
        .expect_err("explicit file must exist");
    assert!(errors[0].to_string().contains("does not exist"));
}
