//! LEXGLOSS cache layer.
//!
//! One reusable LRU + TTL store used by every layer of the engine: the
//! vocabulary service memoizes match decisions in it, the scanner memoizes
//! translation results in it, and callers are free to reuse it for their own
//! lookups. Consolidating the caches here means one set of eviction rules
//! instead of one ad hoc map per component.
//!
//! ## Semantics
//!
//! - **LRU by access**: `get` repositions an entry as most-recently-used;
//!   inserting past `max_entries` evicts the least-recently-used entry.
//! - **TTL by wall clock**: an entry is valid iff `now <= expires_at`. Reads
//!   of an expired entry behave as misses and evict the entry on the spot
//!   (lazy expiration), so correctness never depends on the sweeper.
//! - **Counters**: hits, misses, evictions, and expirations are tracked and
//!   exposed via [`TtlCache::stats`].
//!
//! ## Background sweeping
//!
//! [`spawn_sweeper`] starts an interval-based sweep thread that proactively
//! removes expired entries. It holds only a weak handle, so dropping the last
//! `Arc<TtlCache>` ends the thread.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use cache::{CacheConfig, TtlCache};
//!
//! let cache: TtlCache<String, u32> = TtlCache::new(&CacheConfig {
//!     max_entries: 2,
//!     default_ttl: Some(Duration::from_secs(60)),
//!     ..Default::default()
//! });
//!
//! cache.insert("a".into(), 1);
//! cache.insert("b".into(), 2);
//! cache.insert("c".into(), 3); // evicts "a", the least recently used
//!
//! assert_eq!(cache.get(&"a".to_string()), None);
//! assert_eq!(cache.get(&"c".to_string()), Some(3));
//! ```

mod config;
mod stats;
mod store;
mod sweeper;

pub mod serde_millis;

pub use crate::config::{CacheConfig, CacheConfigError};
pub use crate::stats::CacheStats;
pub use crate::store::TtlCache;
pub use crate::sweeper::{spawn_sweeper, SweeperHandle};
