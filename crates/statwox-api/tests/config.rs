use std::collections::HashMap;
use std::time::Duration;

use statwox_api::config::{Config, ConfigError};

const SECRET: &str = "a-long-enough-signing-secret-for-tests";

fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn secret_is_required() {
    let err = load(&[]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
}

#[test]
fn short_secret_is_rejected_without_echoing_it() {
    let err = load(&[("JWT_SECRET", "tiny")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "JWT_SECRET", .. }));
    assert!(!err.to_string().contains("tiny"));
}

#[test]
fn defaults_fill_unset_keys() {
    let config = load(&[("JWT_SECRET", SECRET)]).unwrap();

    assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(config.database_url, "sqlite://statwox.db?mode=rwc");
    assert_eq!(config.jwt_ttl_days, 7);
    assert_eq!(config.bcrypt_cost, 12);
    assert_eq!(config.analytics_response_window, 1000);
    assert_eq!(config.webhook_max_attempts, 3);
    assert_eq!(config.webhook_timeout, Duration::from_secs(10));
}

#[test]
fn explicit_values_override_defaults() {
    let config = load(&[
        ("JWT_SECRET", SECRET),
        ("STATWOX_BIND", "127.0.0.1:8080"),
        ("BCRYPT_COST", "10"),
        ("WEBHOOK_TIMEOUT_SECS", "2"),
    ])
    .unwrap();

    assert_eq!(config.bind_addr.port(), 8080);
    assert_eq!(config.bcrypt_cost, 10);
    assert_eq!(config.webhook_timeout, Duration::from_secs(2));
}

#[test]
fn out_of_range_bcrypt_cost_is_rejected() {
    for cost in ["3", "32"] {
        let err = load(&[("JWT_SECRET", SECRET), ("BCRYPT_COST", cost)]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BCRYPT_COST", .. }), "{cost}");
    }
}

#[test]
fn unparsable_value_names_the_key() {
    let err = load(&[("JWT_SECRET", SECRET), ("JWT_TTL_DAYS", "a week")]).unwrap_err();
    assert!(err.to_string().contains("JWT_TTL_DAYS"));
}

#[test]
fn zero_webhook_attempts_is_rejected() {
    let err = load(&[("JWT_SECRET", SECRET), ("WEBHOOK_MAX_ATTEMPTS", "0")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "WEBHOOK_MAX_ATTEMPTS", .. }));
}

#[test]
fn debug_output_redacts_the_secret() {
    let config = load(&[("JWT_SECRET", SECRET)]).unwrap();
    let shown = format!("{config:?}");

    assert!(!shown.contains(SECRET));
    assert!(shown.contains("<redacted>"));
    assert!(shown.contains("bcrypt_cost"));
}
