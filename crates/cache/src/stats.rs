use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of a cache's counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that found a live entry.
    pub hits: u64,
    /// Reads that found nothing, including reads of expired entries.
    pub misses: u64,
    /// Entries removed by LRU pressure.
    pub evictions: u64,
    /// Entries removed because their TTL elapsed (lazy reads or sweeps).
    pub expirations: u64,
}

impl CacheStats {
    /// Hit rate in `[0.0, 1.0]`; zero when no reads have happened.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
