//! Configuration for [`TtlCache`](crate::TtlCache) instances.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sizing and expiry policy for one cache instance.
///
/// Cheap to clone and serde-friendly so it can be embedded in higher-level
/// configs. Durations serialize as integer milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of live entries before LRU eviction kicks in.
    #[serde(default = "CacheConfig::default_max_entries")]
    pub max_entries: usize,
    /// TTL applied by [`insert`](crate::TtlCache::insert). `None` means
    /// entries only leave under LRU pressure or explicit removal.
    #[serde(default, with = "crate::serde_millis::option")]
    pub default_ttl: Option<Duration>,
    /// Interval used when a background sweeper is attached.
    #[serde(
        default = "CacheConfig::default_sweep_interval",
        with = "crate::serde_millis"
    )]
    pub sweep_interval: Duration,
}

impl CacheConfig {
    pub(crate) fn default_max_entries() -> usize {
        1024
    }

    pub(crate) fn default_sweep_interval() -> Duration {
        Duration::from_secs(60)
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Validate the configuration before constructing a cache from it.
    pub fn validate(&self) -> Result<(), CacheConfigError> {
        if self.max_entries == 0 {
            return Err(CacheConfigError::ZeroCapacity);
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheConfigError::ZeroSweepInterval);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: Self::default_max_entries(),
            default_ttl: None,
            sweep_interval: Self::default_sweep_interval(),
        }
    }
}

/// Rejected cache configurations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheConfigError {
    /// `max_entries` must be at least 1.
    #[error("cache capacity must be greater than zero")]
    ZeroCapacity,
    /// `sweep_interval` must be a positive duration.
    #[error("sweep interval must be greater than zero")]
    ZeroSweepInterval,
}
