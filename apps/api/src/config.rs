use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::backend_client::RetryPolicy;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub backend_url: String,
    pub session_file: String,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            session_file: std::env::var("SESSION_FILE")
                .unwrap_or_else(|_| ".careerpilot/session.json".to_string()),
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 30)?),
            upload_timeout: Duration::from_secs(parse_env("UPLOAD_TIMEOUT_SECS", 120)?),
            retry: RetryPolicy {
                max_attempts: parse_env("RETRY_MAX_ATTEMPTS", 2)?,
                base_delay: Duration::from_millis(parse_env("RETRY_BASE_DELAY_MS", 1000)?),
                max_delay: Duration::from_millis(parse_env("RETRY_MAX_DELAY_MS", 30_000)?),
            },
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_padded_numbers() {
        let port: u16 = parse_value("PORT", " 9090 ").unwrap();
        assert_eq!(port, 9090);
    }

    #[test]
    fn test_parse_value_names_the_variable() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_missing_variable_uses_default() {
        let attempts: u32 = parse_env("CAREERPILOT_TEST_UNSET_VARIABLE", 2).unwrap();
        assert_eq!(attempts, 2);
    }
}
