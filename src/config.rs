//! Process configuration read from `ROTA_*` environment variables.

use crate::holiday::DEFAULT_HOLIDAY_URL;
use crate::logging::LogFormat;
use crate::phase::PhaseRule;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid value for {key}: {message}")]
pub struct ConfigError {
    key: &'static str,
    message: String,
}

impl ConfigError {
    fn new(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }
}

/// Where holiday names come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HolidayMode {
    /// Local cache backfilled from the remote calendar.
    #[default]
    Remote,
    /// No holiday annotations.
    Off,
}

impl FromStr for HolidayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" | "on" => Ok(HolidayMode::Remote),
            "off" | "none" => Ok(HolidayMode::Off),
            other => Err(format!("unknown holiday mode '{other}' (expected remote or off)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotaConfig {
    pub http_addr: SocketAddr,
    pub database_path: PathBuf,
    pub holidays: HolidayMode,
    /// URL with a `{year}` placeholder.
    pub holiday_url: String,
    pub holiday_timeout: Duration,
    pub phase_rule: PhaseRule,
    pub log_format: LogFormat,
}

impl Default for RotaConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8070)),
            database_path: PathBuf::from("rota.sqlite3"),
            holidays: HolidayMode::Remote,
            holiday_url: DEFAULT_HOLIDAY_URL.to_string(),
            holiday_timeout: Duration::from_secs(10),
            phase_rule: PhaseRule::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl RotaConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(addr) = get("ROTA_HTTP_ADDR") {
            config.http_addr = addr
                .trim()
                .parse()
                .map_err(|err| ConfigError::new("ROTA_HTTP_ADDR", format!("{err}")))?;
        }
        if let Some(path) = get("ROTA_DB_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(mode) = get("ROTA_HOLIDAYS") {
            config.holidays = mode
                .parse()
                .map_err(|err: String| ConfigError::new("ROTA_HOLIDAYS", err))?;
        }
        if let Some(url) = get("ROTA_HOLIDAY_URL") {
            if !url.contains("{year}") {
                return Err(ConfigError::new(
                    "ROTA_HOLIDAY_URL",
                    "url must contain a {year} placeholder",
                ));
            }
            config.holiday_url = url;
        }
        if let Some(secs) = get("ROTA_HOLIDAY_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::new("ROTA_HOLIDAY_TIMEOUT_SECS", "expected whole seconds"))?;
            config.holiday_timeout = Duration::from_secs(secs);
        }
        if let Some(rule) = get("ROTA_PHASE_RULE") {
            config.phase_rule = rule
                .parse()
                .map_err(|err| ConfigError::new("ROTA_PHASE_RULE", format!("{err}")))?;
        }
        if let Some(format) = get("ROTA_LOG_FORMAT") {
            config.log_format = format
                .parse()
                .map_err(|err| ConfigError::new("ROTA_LOG_FORMAT", format!("{err}")))?;
        }
        Ok(config)
    }
}
