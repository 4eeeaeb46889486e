use crate::error::{AppError, Result};
use crate::types::NotificationType;
use std::env;
use std::time::Duration;

/// Upper bound for `NotificationConfig::event_capacity`.
pub const MAX_EVENT_CAPACITY: usize = 65_536;

/// Notification queue tuning.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Queue capacity; the oldest entries are evicted beyond it.
    pub max_notifications: usize,
    /// Default lifetime of success notifications.
    pub success_duration: Duration,
    /// Default lifetime of info notifications.
    pub info_duration: Duration,
    /// Default lifetime of warning notifications.
    pub warning_duration: Duration,
    /// Default lifetime of error notifications (longest, errors matter most).
    pub error_duration: Duration,
    /// Exit-animation delay between hiding and removal.
    pub hide_delay: Duration,
    /// Buffer size of the lifecycle event channel.
    pub event_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_notifications: 5,
            success_duration: Duration::from_millis(4000),
            info_duration: Duration::from_millis(4000),
            warning_duration: Duration::from_millis(5000),
            error_duration: Duration::from_millis(6000),
            hide_delay: Duration::from_millis(300),
            event_capacity: 64,
        }
    }
}

impl NotificationConfig {
    /// Duration applied when a request does not set one.
    pub fn default_duration(&self, notification_type: NotificationType) -> Duration {
        match notification_type {
            NotificationType::Success => self.success_duration,
            NotificationType::Info => self.info_duration,
            NotificationType::Warning => self.warning_duration,
            NotificationType::Error => self.error_duration,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Notification queue settings.
    pub notifications: NotificationConfig,
    /// tracing filter directive.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notifications: NotificationConfig::default(),
            log_filter: "bazaar=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = NotificationConfig::default();

        let notifications = NotificationConfig {
            max_notifications: parse_usize("BAZAAR_MAX_NOTIFICATIONS", usize::MAX)?
                .unwrap_or(defaults.max_notifications),
            success_duration: parse_millis("BAZAAR_SUCCESS_DURATION_MS")?
                .unwrap_or(defaults.success_duration),
            info_duration: parse_millis("BAZAAR_INFO_DURATION_MS")?
                .unwrap_or(defaults.info_duration),
            warning_duration: parse_millis("BAZAAR_WARNING_DURATION_MS")?
                .unwrap_or(defaults.warning_duration),
            error_duration: parse_millis("BAZAAR_ERROR_DURATION_MS")?
                .unwrap_or(defaults.error_duration),
            hide_delay: parse_millis("BAZAAR_HIDE_DELAY_MS")?.unwrap_or(defaults.hide_delay),
            event_capacity: parse_usize("BAZAAR_EVENT_CAPACITY", MAX_EVENT_CAPACITY)?
                .unwrap_or(defaults.event_capacity),
        };

        let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| "bazaar=info".to_string());

        Ok(Self {
            notifications,
            log_filter,
        })
    }
}

fn parse_var(key: &str) -> Result<Option<u64>> {
    let Ok(value) = env::var(key) else {
        return Ok(None);
    };
    let parsed = value.trim().parse();
    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(AppError::Config {
            key: key.to_string(),
            value,
        }),
    }
}

fn parse_usize(key: &str, max: usize) -> Result<Option<usize>> {
    let Some(raw) = parse_var(key)? else {
        return Ok(None);
    };
    match usize::try_from(raw) {
        Ok(parsed) if parsed <= max => Ok(Some(parsed)),
        _ => Err(AppError::Config {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn parse_millis(key: &str) -> Result<Option<Duration>> {
    Ok(parse_var(key)?.map(Duration::from_millis))
}
