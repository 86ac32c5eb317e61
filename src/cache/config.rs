//! Cache configuration.
//!
//! Controls how long snapshots live and how long a single cache call may take
//! before the coordinator gives up on it.

use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 10;
const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Lifetime of every snapshot written on a read miss.
    pub ttl: Duration,
    /// Upper bound for one get, set or delete against the cache backend.
    pub operation_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            operation_timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            ttl: settings.ttl,
            operation_timeout: settings.operation_timeout,
        }
    }
}
