//! Interval-based background sweep for expired entries.
//!
//! The sweeper is an optimization: lazy expiration in `get`/`contains`
//! already guarantees that expired values are never served. Running a sweep
//! keeps memory bounded when a cache sees writes but little read traffic.

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::store::TtlCache;

/// Poll step so `stop()` does not wait out a whole sweep interval.
const STOP_POLL: Duration = Duration::from_millis(50);

/// Handle owning a sweep thread. Dropping the handle signals the thread to
/// exit; [`stop`](SweeperHandle::stop) additionally joins it.
pub struct SweeperHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signal the sweep thread and wait for it to finish.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Spawn a thread that calls [`TtlCache::cleanup`] every `interval`.
///
/// The thread holds only a `Weak` reference: once the last `Arc` to the cache
/// is dropped the thread exits on its next wake-up.
pub fn spawn_sweeper<K, V>(cache: &Arc<TtlCache<K, V>>, interval: Duration) -> SweeperHandle
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    let weak: Weak<TtlCache<K, V>> = Arc::downgrade(cache);
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let thread = thread::Builder::new()
        .name("gloss-cache-sweeper".to_string())
        .spawn(move || loop {
            let deadline = Instant::now() + interval;
            while Instant::now() < deadline {
                if stop_flag.load(Ordering::Relaxed) {
                    return;
                }
                thread::sleep(STOP_POLL.min(deadline.saturating_duration_since(Instant::now())));
            }

            match weak.upgrade() {
                Some(cache) => {
                    let removed = cache.cleanup();
                    if removed > 0 {
                        debug!(removed, "cache_sweep");
                    }
                }
                None => return,
            }
        })
        .expect("failed to spawn cache sweeper thread");

    SweeperHandle {
        stop,
        thread: Some(thread),
    }
}
