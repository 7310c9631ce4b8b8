//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use booking::OrchestratorConfig;
use booking::config::{DEFAULT_GATEWAY_TIMEOUT, DEFAULT_LOCK_TIMEOUT};
use domain::RoomSelectionPolicy;
use thiserror::Error;

/// A configuration variable held a value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` — `text` or `json` (default: `text`)
/// - `DATABASE_URL` — PostgreSQL URL; the in-memory store is used when unset
/// - `GATEWAY_TIMEOUT_MS` — bound on each collaborator call (default: `2000`)
/// - `ROOM_LOCK_TIMEOUT_MS` — bound on waiting for a room (default: `5000`)
/// - `ROOM_SELECTION_POLICY` — `first_match`, `earliest_checkout` or `lowest_price`
/// - `SEED_FILE` — JSON file of users and rooms loaded into the in-memory gateways
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub gateway_timeout: Duration,
    pub lock_timeout: Duration,
    pub room_selection: RoomSelectionPolicy,
    pub seed_file: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse(&lookup, "PORT")?.unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: parse(&lookup, "LOG_FORMAT")?.unwrap_or(defaults.log_format),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            gateway_timeout: parse(&lookup, "GATEWAY_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.gateway_timeout),
            lock_timeout: parse(&lookup, "ROOM_LOCK_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.lock_timeout),
            room_selection: parse(&lookup, "ROOM_SELECTION_POLICY")?
                .unwrap_or(defaults.room_selection),
            seed_file: lookup("SEED_FILE")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the orchestrator settings.
    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .with_gateway_timeout(self.gateway_timeout)
            .with_lock_timeout(self.lock_timeout)
            .with_room_selection(self.room_selection)
    }
}

fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|value| {
            value.trim().parse().map_err(|e: T::Err| ConfigError {
                key,
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            room_selection: RoomSelectionPolicy::FirstMatch,
            seed_file: None,
        }
    }
}
