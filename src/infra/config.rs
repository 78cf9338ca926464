//! Centralized configuration (environment variables + defaults).

use crate::storage::StoreConfig;
use anyhow::{anyhow, Context};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CATALOG_BASE_URL: &str = "https://www.googleapis.com/books/v1";

/// Shortest accepted token secret, in bytes.
const MIN_TOKEN_SECRET_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("unknown log format '{}' (expected text or json)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    /// Overall per-request budget enforced by the HTTP layer.
    pub request_timeout: Duration,
    pub token_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub catalog_base_url: String,
    pub catalog_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let token_secret = lookup("TOKEN_SECRET").context("TOKEN_SECRET must be set")?;
        if token_secret.len() < MIN_TOKEN_SECRET_LEN {
            return Err(anyhow!(
                "TOKEN_SECRET must be at least {} bytes",
                MIN_TOKEN_SECRET_LEN
            ));
        }

        let token_ttl_days: u64 = parse_or(&lookup, "TOKEN_TTL_DAYS", 30)?;
        let deadline_ms: u64 = parse_or(&lookup, "STORE_DEADLINE_MS", 5_000)?;
        let request_timeout_ms: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_MS", 10_000)?;
        let catalog_timeout_secs: u64 = parse_or(&lookup, "CATALOG_TIMEOUT_SECS", 10)?;

        Ok(Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            store: StoreConfig {
                database_url,
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
                deadline: Duration::from_millis(deadline_ms.max(1)),
            },
            request_timeout: Duration::from_millis(request_timeout_ms.max(1)),
            token_secret,
            token_ttl: Duration::from_secs(token_ttl_days.max(1) * 24 * 60 * 60),
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            catalog_base_url: lookup("CATALOG_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CATALOG_BASE_URL.to_string()),
            catalog_timeout: Duration::from_secs(catalog_timeout_secs.max(1)),
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Text)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{} has an invalid value '{}': {}", key, raw, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let cfg = config_from(&[
            ("DATABASE_URL", "postgres://localhost/bookpulse"),
            ("TOKEN_SECRET", "0123456789abcdef"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.store.max_connections, 5);
        assert_eq!(cfg.store.deadline, Duration::from_secs(5));
        assert_eq!(cfg.token_ttl, Duration::from_secs(30 * 24 * 3600));
        assert_eq!(cfg.catalog_base_url, DEFAULT_CATALOG_BASE_URL);
        assert_eq!(cfg.log_format, LogFormat::Text);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = config_from(&[("TOKEN_SECRET", "0123456789abcdef")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn short_secret_and_bad_numbers_are_rejected() {
        assert!(config_from(&[("DATABASE_URL", "postgres://x"), ("TOKEN_SECRET", "short")]).is_err());

        let err = config_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("TOKEN_SECRET", "0123456789abcdef"),
            ("DB_MAX_CONNECTIONS", "many"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn log_format_accepts_json() {
        let cfg = config_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("TOKEN_SECRET", "0123456789abcdef"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(cfg.log_format, LogFormat::Json);
    }
}
