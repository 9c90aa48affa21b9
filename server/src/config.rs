//! Process configuration, read once at startup.
//!
//! # Environment Variables
//!
//! - `HOST`: bind address (default: `0.0.0.0`)
//! - `PORT`: listen port (default: `8080`)
//! - `REQUEST_TIMEOUT`: per-request timeout in seconds (default: `30`)
//! - `SHUTDOWN_TIMEOUT`: graceful drain limit in seconds (default: `10`)
//! - `LOG_LEVEL`: `debug` | `info` | `warn` | `error` (default: `info`)
//! - `LOG_FORMAT`: `json` | `text` (default: `json`)
//!
//! Empty values fall back to the default; values that fail to parse are
//! errors rather than silently ignored.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: cannot parse '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "pretty" | "plain" => Ok(LogFormat::Text),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(10),
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

impl Config {
    /// Read from the process environment (after loading `.env`, if any).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; keeps tests off the real environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Ok(Self {
            host: parse_or(get("HOST"), "HOST", defaults.host)?,
            port: parse_or(get("PORT"), "PORT", defaults.port)?,
            request_timeout: seconds_or(
                get("REQUEST_TIMEOUT"),
                "REQUEST_TIMEOUT",
                defaults.request_timeout,
            )?,
            shutdown_timeout: seconds_or(
                get("SHUTDOWN_TIMEOUT"),
                "SHUTDOWN_TIMEOUT",
                defaults.shutdown_timeout,
            )?,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: parse_or(get("LOG_FORMAT"), "LOG_FORMAT", defaults.log_format)?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(value) => match value.parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(err) => Err(ConfigError::Invalid {
                key,
                reason: err.to_string(),
                value,
            }),
        },
    }
}

fn seconds_or(
    value: Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let seconds: u64 = parse_or(value, key, default.as_secs())?;
    if seconds == 0 {
        return Err(ConfigError::Zero { key });
    }
    Ok(Duration::from_secs(seconds))
}
