//! Application-level configuration loading: storage backend, admin access, mail and job schedules.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WHO_SAYS_CONFIG_PATH";
const DEFAULT_SENDER_EMAIL: &str = "noreply@who-says.local";
const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 3_600;
const DEFAULT_AVERAGE_REFRESH_INTERVAL_SECS: u64 = 600;
const DEFAULT_WIN_RETRY_ATTEMPTS: u32 = 5;
const DEFAULT_WIN_RETRY_INITIAL_DELAY_MS: u64 = 25;

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// MongoDB, configured through `MONGO_URI` and `MONGO_DB`.
    Mongo,
    /// Process-local tables, lost on restart.
    Memory,
}

impl Default for StorageBackend {
    fn default() -> Self {
        if cfg!(feature = "mongo-store") {
            StorageBackend::Mongo
        } else {
            StorageBackend::Memory
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Backoff applied when the win transaction hits write contention.
pub struct WinRetryPolicy {
    /// Total number of attempts, the first one included.
    pub attempts: u32,
    /// Delay before the second attempt; doubled after each failure.
    pub initial_delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    pub storage: StorageBackend,
    /// Token expected in `X-Admin-Token`; admin routes are open when unset.
    pub admin_token: Option<String>,
    pub sender_email: String,
    /// Mail relay receiving reminder emails; reminders are only logged when unset.
    pub mail_webhook_url: Option<String>,
    pub reminder_interval: Duration,
    pub average_refresh_interval: Duration,
    pub win_retry: WinRetryPolicy,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        storage = ?app_config.storage,
                        admin_protected = app_config.admin_token.is_some(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent fields take their default value.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    storage: StorageBackend,
    admin_token: Option<String>,
    sender_email: Option<String>,
    mail_webhook_url: Option<String>,
    reminder_interval_secs: Option<u64>,
    average_refresh_interval_secs: Option<u64>,
    win_retry_attempts: Option<u32>,
    win_retry_initial_delay_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            storage: value.storage,
            admin_token: non_blank(value.admin_token),
            sender_email: non_blank(value.sender_email)
                .unwrap_or_else(|| DEFAULT_SENDER_EMAIL.into()),
            mail_webhook_url: non_blank(value.mail_webhook_url),
            reminder_interval: positive_secs(
                value.reminder_interval_secs,
                DEFAULT_REMINDER_INTERVAL_SECS,
            ),
            average_refresh_interval: positive_secs(
                value.average_refresh_interval_secs,
                DEFAULT_AVERAGE_REFRESH_INTERVAL_SECS,
            ),
            win_retry: WinRetryPolicy {
                attempts: value
                    .win_retry_attempts
                    .unwrap_or(DEFAULT_WIN_RETRY_ATTEMPTS)
                    .max(1),
                initial_delay: Duration::from_millis(
                    value
                        .win_retry_initial_delay_ms
                        .unwrap_or(DEFAULT_WIN_RETRY_INITIAL_DELAY_MS),
                ),
            },
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

// tokio intervals panic on a zero period.
fn positive_secs(value: Option<u64>, default: u64) -> Duration {
    Duration::from_secs(value.filter(|secs| *secs > 0).unwrap_or(default))
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
