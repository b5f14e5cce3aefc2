//! Time-windowed request coalescing
//!
//! The first call for a key starts the underlying request. Every call with an
//! equal key made within `window` of that start, while the request is still
//! in flight, awaits the same future and receives a clone of its result. A
//! settled result is never replayed, and calls with different keys never
//! share a request.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

/// Statistics for coalescing behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoalescerStats {
    /// Requests actually started
    pub started: u64,
    /// Calls served by an already started request
    pub coalesced: u64,
}

struct Slot<V, E> {
    started_at: Instant,
    future: Shared<BoxFuture<'static, Result<V, E>>>,
}

impl<V: Clone, E: Clone> Slot<V, E> {
    fn is_joinable(&self, now: Instant, window: Duration) -> bool {
        self.future.peek().is_none() && now.duration_since(self.started_at) < window
    }
}

/// Request coalescer keyed by call arguments
pub struct Coalescer<K, V, E> {
    window: Duration,
    slots: Mutex<HashMap<K, Slot<V, E>>>,
    stats: Mutex<CoalescerStats>,
}

impl<K, V, E> Coalescer<K, V, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create coalescer with window
    #[inline]
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slots: Mutex::new(HashMap::new()),
            stats: Mutex::new(CoalescerStats::default()),
        }
    }

    /// Coalescing window
    #[inline]
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Run `call` for `key`, or join a pending request started less than
    /// `window` ago
    ///
    /// `call` is only invoked when a new request is started.
    pub async fn run<F, Fut>(&self, key: K, call: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let future = {
            let now = Instant::now();
            let mut slots = self.slots.lock();
            slots.retain(|_, slot| slot.is_joinable(now, self.window));

            if let Some(slot) = slots.get(&key) {
                tracing::debug!(?key, "coalescing with in-flight request");
                self.stats.lock().coalesced += 1;
                slot.future.clone()
            } else {
                let future = call().boxed().shared();
                slots.insert(
                    key,
                    Slot {
                        started_at: now,
                        future: future.clone(),
                    },
                );
                self.stats.lock().started += 1;
                future
            }
        };

        future.await
    }

    /// Stop joining pending requests whose key matches
    ///
    /// Requests already started keep running for their current callers; later
    /// calls with a matching key start a fresh request.
    pub fn forget_where(&self, mut matches: impl FnMut(&K) -> bool) {
        self.slots.lock().retain(|key, _| !matches(key));
    }

    /// Current statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CoalescerStats {
        *self.stats.lock()
    }
}

impl<K, V, E> std::fmt::Debug for Coalescer<K, V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coalescer")
            .field("window", &self.window)
            .field("in_flight", &self.slots.lock().len())
            .finish_non_exhaustive()
    }
}
