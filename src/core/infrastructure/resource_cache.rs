//! Fetch-side cache of backend listings.

use crate::ConsoleResult;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tracing::debug;

/// Backend listings the client caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Machines,
    Blueprints,
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Machines => write!(f, "machines"),
            ResourceKey::Blueprints => write!(f, "blueprints"),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    fetched_at: Instant,
    generation: u64,
}

/// Cached value of one resource.
///
/// The latest value lives in a watch channel, so reads never wait on the
/// network. Fetches are serialized by `in_flight`, which also keeps the
/// outcome of the last fetch: callers that queued behind a fetch receive its
/// result, success or failure, instead of issuing their own request.
#[derive(Debug)]
pub struct ResourceCache<V> {
    key: ResourceKey,
    stale_time: Duration,
    generation: AtomicU64,
    completed: AtomicU64,
    latest: watch::Sender<Option<Entry<V>>>,
    in_flight: Mutex<Option<ConsoleResult<V>>>,
}

impl<V: Clone> ResourceCache<V> {
    pub fn new(key: ResourceKey, stale_time: Duration) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            key,
            stale_time,
            generation: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            latest,
            in_flight: Mutex::new(None),
        }
    }

    /// Returns the cached value if it is fresh, otherwise runs `fetch`.
    ///
    /// Callers arriving while a fetch is running share its outcome.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> ConsoleResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ConsoleResult<V>>,
    {
        if let Some(value) = self.fresh() {
            debug!(resource = %self.key, "cache hit");
            return Ok(value);
        }

        let seen = self.completed.load(Ordering::SeqCst);
        let mut last = self.in_flight.lock().await;
        if self.completed.load(Ordering::SeqCst) != seen {
            if let Some(result) = last.as_ref() {
                debug!(resource = %self.key, "joined in-flight fetch");
                return result.clone();
            }
        }

        debug!(resource = %self.key, "cache miss");
        self.run(&mut last, fetch).await
    }

    /// Runs `fetch` regardless of the cached value's age.
    pub async fn refresh<F, Fut>(&self, fetch: F) -> ConsoleResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ConsoleResult<V>>,
    {
        let mut last = self.in_flight.lock().await;
        debug!(resource = %self.key, "forced refresh");
        self.run(&mut last, fetch).await
    }

    /// Marks the cached value stale.
    ///
    /// A fetch that is in flight when this is called stores a value that is
    /// already stale.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        debug!(resource = %self.key, "invalidated");
    }

    /// Last successfully fetched value, fresh or not. Never waits on a fetch.
    pub fn peek(&self) -> Option<V> {
        self.latest.borrow().as_ref().map(|entry| entry.value.clone())
    }

    fn fresh(&self) -> Option<V> {
        let latest = self.latest.borrow();
        let entry = latest.as_ref()?;
        if entry.generation != self.generation.load(Ordering::SeqCst) {
            return None;
        }
        if entry.fetched_at.elapsed() >= self.stale_time {
            return None;
        }
        Some(entry.value.clone())
    }

    async fn run<F, Fut>(&self, last: &mut Option<ConsoleResult<V>>, fetch: F) -> ConsoleResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ConsoleResult<V>>,
    {
        let generation = self.generation.load(Ordering::SeqCst);
        let result = fetch().await;
        match &result {
            Ok(value) => {
                self.latest.send_replace(Some(Entry {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                    generation,
                }));
            }
            Err(e) => debug!(resource = %self.key, error = %e, "fetch failed"),
        }
        *last = Some(result.clone());
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}
