//! Runtime configuration for the [`UserSystem`](crate::lifecycle::UserSystem).

use crate::framework::SnapshotPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const ENV_REQUEST_TIMEOUT_MS: &str = "USER_MANAGEMENT_REQUEST_TIMEOUT_MS";
pub const ENV_DEFAULT_LIMIT: &str = "USER_MANAGEMENT_DEFAULT_LIMIT";
pub const ENV_DEFAULT_SKIP: &str = "USER_MANAGEMENT_DEFAULT_SKIP";
pub const ENV_MAILBOX_SIZE: &str = "USER_MANAGEMENT_MAILBOX_SIZE";
pub const ENV_SNAPSHOT_EVERY: &str = "USER_MANAGEMENT_SNAPSHOT_EVERY";

/// An environment variable held a value that doesn't parse.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// System configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Deadline for every request sent through the router
    pub request_timeout_ms: u64,

    /// Page size when a list request doesn't give one
    pub default_limit: i64,

    /// Offset when a list request doesn't give one
    pub default_skip: i64,

    /// Capacity of the router and processor mailboxes
    pub mailbox_size: usize,

    /// Key of the user aggregate's event log and snapshots
    pub persistence_id: String,

    pub snapshot: SnapshotPolicy,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5000,
            default_limit: 10,
            default_skip: 0,
            mailbox_size: 32,
            persistence_id: "user-actor".to_string(),
            snapshot: SnapshotPolicy::default(),
        }
    }
}

impl SystemConfig {
    /// Defaults overridden by any `USER_MANAGEMENT_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = parse(&lookup, ENV_REQUEST_TIMEOUT_MS)? {
            config.request_timeout_ms = v;
        }
        if let Some(v) = parse(&lookup, ENV_DEFAULT_LIMIT)? {
            config.default_limit = v;
        }
        if let Some(v) = parse(&lookup, ENV_DEFAULT_SKIP)? {
            config.default_skip = v;
        }
        if let Some(v) = parse(&lookup, ENV_MAILBOX_SIZE)? {
            config.mailbox_size = v;
        }
        if let Some(v) = parse(&lookup, ENV_SNAPSHOT_EVERY)? {
            config.snapshot.every = v;
        }

        Ok(config)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_page_defaults(mut self, limit: i64, skip: i64) -> Self {
        self.default_limit = limit;
        self.default_skip = skip;
        self
    }

    pub fn with_mailbox_size(mut self, size: usize) -> Self {
        self.mailbox_size = size;
        self
    }

    pub fn with_persistence_id(mut self, id: impl Into<String>) -> Self {
        self.persistence_id = id.into();
        self
    }

    pub fn with_snapshot_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.snapshot = policy;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SystemConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.default_skip, 0);
        assert_eq!(config.persistence_id, "user-actor");
        assert_eq!(config.snapshot, SnapshotPolicy { every: 1, compact_on_snapshot: false });
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_REQUEST_TIMEOUT_MS, "250"),
            (ENV_DEFAULT_LIMIT, " 50 "),
            (ENV_SNAPSHOT_EVERY, "4"),
        ]);
        let config = SystemConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.default_limit, 50);
        assert_eq!(config.default_skip, 0);
        assert_eq!(config.snapshot.every, 4);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let err = SystemConfig::from_lookup(|k| (k == ENV_MAILBOX_SIZE).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_MAILBOX_SIZE, .. }));
    }
}
