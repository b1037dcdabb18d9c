//! Environment-driven server configuration, parsed once at startup.

use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not a valid {expected}: {value}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Account-scoped upstream key.
    pub api_key: String,
    /// Read-only key for bulk listings; falls back to the main key.
    pub read_api_key: String,
    /// Allowed CORS origins. Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u64,
    /// Public base URL this instance is reachable at.
    pub public_url: String,
    pub database_url: Option<String>,
    pub persistence_enabled: bool,
    /// Strip PII from account-detail responses.
    pub redact_account_details: bool,
    pub upstream_timeout: Duration,
}

fn parse_value<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value,
    })
}

fn var_or<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_value(name, expected, value),
        Err(_) => Ok(default),
    }
}

fn parse_bool_value(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "boolean",
            value,
        }),
    }
}

fn bool_var(name: &'static str) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_bool_value(name, value),
        Err(_) => Ok(false),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = var_or("PORT", "port number", 3000)?;

        let api_key = env::var("UPTIME_ROBOT_API_KEY")
            .map_err(|_| ConfigError::Missing("UPTIME_ROBOT_API_KEY"))?;
        let read_api_key =
            env::var("UPTIME_ROBOT_READ_API_KEY").unwrap_or_else(|_| api_key.clone());

        let allowed_origins = split_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default());

        let rate_limit_window_ms: u64 = var_or(
            "RATE_LIMIT_WINDOW_MS",
            "duration in milliseconds",
            15 * 60 * 1000,
        )?;
        let rate_limit_max: u64 = var_or("RATE_LIMIT_MAX", "request count", 100)?;
        let upstream_timeout_secs: u64 =
            var_or("UPSTREAM_TIMEOUT_SECS", "duration in seconds", 30)?;

        let public_url =
            env::var("API_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

        let database_url = env::var("DATABASE_URL").ok();
        let persistence_enabled = bool_var("ENABLE_PERSISTENCE")?;
        let redact_account_details = bool_var("REDACT_ACCOUNT_DETAILS")?;

        Ok(ServerConfig {
            port,
            api_key,
            read_api_key,
            allowed_origins,
            rate_limit_window: Duration::from_millis(rate_limit_window_ms),
            rate_limit_max,
            public_url,
            database_url,
            persistence_enabled,
            redact_account_details,
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_values_accept_common_spellings() {
        for value in ["1", "true", "yes", "TRUE", "Yes"] {
            assert_eq!(
                parse_bool_value("ENABLE_PERSISTENCE", value.to_string()).unwrap(),
                true,
                "value {value:?}"
            );
        }
        for value in ["0", "false", "no", ""] {
            assert_eq!(
                parse_bool_value("ENABLE_PERSISTENCE", value.to_string()).unwrap(),
                false,
                "value {value:?}"
            );
        }
    }

    #[test]
    fn bool_values_reject_garbage() {
        assert!(parse_bool_value("ENABLE_PERSISTENCE", "maybe".to_string()).is_err());
    }

    #[test]
    fn origins_are_trimmed_and_empties_dropped() {
        assert_eq!(
            split_origins(" https://a.example , https://b.example ,,"),
            vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ]
        );
        assert!(split_origins("").is_empty());
    }

    #[test]
    fn numeric_values_report_the_offending_variable() {
        let err = parse_value::<u64>("RATE_LIMIT_MAX", "request count", "lots".to_string())
            .expect_err("not a number");
        let message = err.to_string();
        assert!(message.contains("RATE_LIMIT_MAX"));
        assert!(message.contains("lots"));
    }
}
