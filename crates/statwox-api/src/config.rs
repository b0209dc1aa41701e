use std::env;
use std::fmt::{self, Display};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use statwox_auth::jwt::MIN_SECRET_LEN;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read once from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_days: i64,
    pub bcrypt_cost: u32,
    /// Most recent responses loaded for the analytics overview.
    pub analytics_response_window: u32,
    pub webhook_max_attempts: u32,
    pub webhook_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl_days", &self.jwt_ttl_days)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("analytics_response_window", &self.analytics_response_window)
            .field("webhook_max_attempts", &self.webhook_max_attempts)
            .field("webhook_timeout", &self.webhook_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys take their defaults;
    /// `JWT_SECRET` has none.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                value: "<redacted>".to_string(),
                reason: format!("must be at least {MIN_SECRET_LEN} characters"),
            });
        }

        let bcrypt_cost: u32 = try_load(&lookup, "BCRYPT_COST", "12")?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
                reason: "must be between 4 and 31".to_string(),
            });
        }

        let jwt_ttl_days: i64 = try_load(&lookup, "JWT_TTL_DAYS", "7")?;
        if jwt_ttl_days < 1 {
            return Err(ConfigError::Invalid {
                key: "JWT_TTL_DAYS",
                value: jwt_ttl_days.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let webhook_max_attempts: u32 = try_load(&lookup, "WEBHOOK_MAX_ATTEMPTS", "3")?;
        if webhook_max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "WEBHOOK_MAX_ATTEMPTS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            bind_addr: try_load(&lookup, "STATWOX_BIND", "0.0.0.0:3000")?,
            database_url: try_load(&lookup, "DATABASE_URL", "sqlite://statwox.db?mode=rwc")?,
            jwt_secret,
            jwt_ttl_days,
            bcrypt_cost,
            analytics_response_window: try_load(&lookup, "ANALYTICS_RESPONSE_WINDOW", "1000")?,
            webhook_max_attempts,
            webhook_timeout: Duration::from_secs(try_load(&lookup, "WEBHOOK_TIMEOUT_SECS", "10")?),
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
