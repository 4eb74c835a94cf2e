//! Application configuration loaded from environment variables.

use std::time::Duration;

const DEFAULT_NOTIFICATION_TIMEOUT_MS: u64 = 10_000;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL URL; the in-memory store is used when unset
/// - `NOTIFIER_URL`, `NOTIFIER_TOKEN`: HTTP notification service; messages
///   are only recorded in memory when the URL is unset
/// - `NOTIFICATION_TIMEOUT_MS`: bound on one notifier call (default: `10000`)
/// - `STAFF_TOKEN`, `ADMIN_TOKEN`: bearer tokens for the staff and admin roles
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub notifier_url: Option<String>,
    pub notifier_token: Option<String>,
    pub notification_timeout: Duration,
    pub staff_token: Option<String>,
    pub admin_token: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: var("DATABASE_URL"),
            notifier_url: var("NOTIFIER_URL"),
            notifier_token: var("NOTIFIER_TOKEN"),
            notification_timeout: var("NOTIFICATION_TIMEOUT_MS")
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.notification_timeout),
            staff_token: var("STAFF_TOKEN"),
            admin_token: var("ADMIN_TOKEN"),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            notifier_url: None,
            notifier_token: None,
            notification_timeout: Duration::from_millis(DEFAULT_NOTIFICATION_TIMEOUT_MS),
            staff_token: None,
            admin_token: None,
        }
    }
}
