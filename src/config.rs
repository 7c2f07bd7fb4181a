//! Client configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every business constant (slot capacity, the no-booking buffer, the
//! inactivity threshold) is a default here rather than a literal at the call
//! site, so one deployment can tune them without touching the view model.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_CREDENTIALS_FILE: &str = ".boulevard81-session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SLOT_CAPACITY: u32 = 4;
pub const DEFAULT_PAST_BUFFER_MINS: i64 = 60;
pub const DEFAULT_INACTIVITY_TIMEOUT_SECS: u64 = 60 * 60;
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_WARNING_SECS: u64 = 3;

/// The no-booking buffer only applies to today, so a day is the most it can mean.
pub const MAX_PAST_BUFFER_MINS: i64 = 24 * 60;
/// Upper bound for the inactivity threshold and the warning period.
pub const MAX_MONITOR_SECS: u64 = 7 * 24 * 60 * 60;
pub const MAX_CHECK_INTERVAL_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

/// How the session token is attached to outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Bearer,
    Cookie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Inactivity watchdog timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Idle time after which the warning overlay is shown.
    pub inactivity_timeout: Duration,
    /// How often the idle check runs while authenticated.
    pub check_interval: Duration,
    /// How long the warning is displayed before the forced logout.
    pub warning_period: Duration,
}

impl MonitorConfig {
    /// Clamp every timing into the range the monitor can schedule: a nonzero
    /// check interval and nothing longer than the `MAX_*` bounds.
    #[must_use]
    pub fn bounded(self) -> Self {
        let max = Duration::from_secs(MAX_MONITOR_SECS);
        Self {
            inactivity_timeout: self.inactivity_timeout.min(max),
            check_interval: self
                .check_interval
                .clamp(Duration::from_millis(1), Duration::from_millis(MAX_CHECK_INTERVAL_MS)),
            warning_period: self.warning_period.min(max),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::from_secs(DEFAULT_INACTIVITY_TIMEOUT_SECS),
            check_interval: Duration::from_millis(DEFAULT_CHECK_INTERVAL_MS),
            warning_period: Duration::from_secs(DEFAULT_WARNING_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth_mode: AuthMode,
    pub credentials_path: PathBuf,
    pub timeouts: HttpTimeouts,
    pub slot_capacity: u32,
    pub past_buffer_mins: i64,
    pub monitor: MonitorConfig,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// All optional:
    /// - `BOULEVARD_BASE_URL`: REST API root (trailing `/` trimmed)
    /// - `BOULEVARD_AUTH_MODE`: `bearer` (default) or `cookie`
    /// - `BOULEVARD_CREDENTIALS_PATH`: stored session file
    /// - `BOULEVARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `BOULEVARD_CONNECT_TIMEOUT_SECS`: default 10
    /// - `BOULEVARD_SLOT_CAPACITY`: reservations per slot before it is full, default 4
    /// - `BOULEVARD_PAST_BUFFER_MINS`: no-booking buffer before a slot starts, default 60
    /// - `BOULEVARD_INACTIVITY_TIMEOUT_SECS`: default 3600
    /// - `BOULEVARD_CHECK_INTERVAL_MS`: default 1000
    /// - `BOULEVARD_WARNING_SECS`: default 3
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for an unknown auth mode, a zero capacity,
    /// or a buffer or monitor timing outside its `MAX_*` bound.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(
            &std::env::var("BOULEVARD_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        );
        let auth_mode = parse_auth_mode(std::env::var("BOULEVARD_AUTH_MODE").ok().as_deref())?;
        let credentials_path = std::env::var("BOULEVARD_CREDENTIALS_PATH")
            .map_or_else(|_| default_credentials_path(), PathBuf::from);

        let slot_capacity = env_parse("BOULEVARD_SLOT_CAPACITY", DEFAULT_SLOT_CAPACITY);
        if slot_capacity == 0 {
            return Err(ConfigError::Parse("BOULEVARD_SLOT_CAPACITY must be at least 1".into()));
        }

        let timeouts = HttpTimeouts {
            request_secs: env_parse("BOULEVARD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("BOULEVARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let past_buffer_mins = env_parse("BOULEVARD_PAST_BUFFER_MINS", DEFAULT_PAST_BUFFER_MINS);
        if !(0..=MAX_PAST_BUFFER_MINS).contains(&past_buffer_mins) {
            return Err(ConfigError::Parse(format!(
                "BOULEVARD_PAST_BUFFER_MINS must be between 0 and {MAX_PAST_BUFFER_MINS}"
            )));
        }

        let inactivity_secs =
            bounded_env("BOULEVARD_INACTIVITY_TIMEOUT_SECS", DEFAULT_INACTIVITY_TIMEOUT_SECS, MAX_MONITOR_SECS)?;
        let check_ms = bounded_env("BOULEVARD_CHECK_INTERVAL_MS", DEFAULT_CHECK_INTERVAL_MS, MAX_CHECK_INTERVAL_MS)?;
        let warning_secs = bounded_env("BOULEVARD_WARNING_SECS", DEFAULT_WARNING_SECS, MAX_MONITOR_SECS)?;
        let monitor = MonitorConfig {
            inactivity_timeout: Duration::from_secs(inactivity_secs),
            check_interval: Duration::from_millis(check_ms.max(1)),
            warning_period: Duration::from_secs(warning_secs),
        };

        Ok(Self {
            base_url,
            auth_mode,
            credentials_path,
            timeouts,
            slot_capacity,
            past_buffer_mins,
            monitor,
        })
    }

    /// Replace the base URL, applying the same normalization as `from_env`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn bounded_env(key: &str, default: u64, max: u64) -> Result<u64, ConfigError> {
    let value = env_parse(key, default);
    if value > max {
        return Err(ConfigError::Parse(format!("{key} must be at most {max}")));
    }
    Ok(value)
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_auth_mode(raw: Option<&str>) -> Result<AuthMode, ConfigError> {
    match raw.unwrap_or("bearer") {
        "bearer" => Ok(AuthMode::Bearer),
        "cookie" => Ok(AuthMode::Cookie),
        other => Err(ConfigError::Parse(format!(
            "unknown BOULEVARD_AUTH_MODE '{other}' (expected 'bearer' or 'cookie')"
        ))),
    }
}

fn default_credentials_path() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(PathBuf::new, PathBuf::from)
        .join(DEFAULT_CREDENTIALS_FILE)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
