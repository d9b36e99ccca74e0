use std::{any::Any, collections::HashMap, fmt::Display, future::Future, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use super::clock::{Clock, SystemClock};

/// How long a cached provider response stays fresh.
///
/// The tier reflects how volatile the data is: popular tracks churn fast,
/// album listings barely change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    /// 5 minutes
    Short,
    /// 1 hour
    Medium,
    /// 24 hours
    Long,
}

impl CacheTtl {
    pub fn duration(self) -> Duration {
        match self {
            CacheTtl::Short => Duration::minutes(5),
            CacheTtl::Medium => Duration::hours(1),
            CacheTtl::Long => Duration::hours(24),
        }
    }
}

impl From<CacheTtl> for Duration {
    fn from(ttl: CacheTtl) -> Self {
        ttl.duration()
    }
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-memory key/value cache with absolute per-entry expiry.
///
/// Values of any `Clone + Send + Sync` type can be stored; each key is expected
/// to always hold the same type. Entries are only replaced, never evicted, so
/// an expired entry stays around as a fallback for when the upstream fails.
pub struct ExpiringCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl ExpiringCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Returns the cached value for `key`, or runs `fetch` to produce it.
    ///
    /// # Behavior
    ///
    /// - A live entry is returned as is and `fetch` is not called.
    /// - On a miss or an expired entry `fetch` runs; a success is stored with
    ///   an expiry of `now + ttl`.
    /// - If `fetch` fails and any earlier value exists for `key`, expired or
    ///   not, that stale value is returned instead of the error.
    /// - If `fetch` fails and nothing was ever stored, the error is returned
    ///   unchanged.
    ///
    /// The lock is released while `fetch` runs, so two concurrent misses on the
    /// same key both fetch and the last one to finish wins.
    ///
    /// # Example
    ///
    /// ```
    /// let tracks = cache
    ///     .get_or_fetch("spotify:popular-tracks", CacheTtl::Short, || async {
    ///         client.load_popular_tracks().await
    ///     })
    ///     .await?;
    /// ```
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: impl Into<Duration>,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let now = self.clock.now();
        let cached: Option<(T, bool)> = {
            let entries = self.entries.lock().await;
            entries.get(key).and_then(|entry| {
                entry
                    .value
                    .downcast_ref::<T>()
                    .map(|value| (value.clone(), entry.is_live(now)))
            })
        };

        if let Some((value, true)) = &cached {
            debug!(key, "cache hit");
            return Ok(value.clone());
        }

        match fetch().await {
            Ok(value) => {
                let entry = CacheEntry {
                    value: Arc::new(value.clone()),
                    expires_at: now + ttl.into(),
                };
                self.entries.lock().await.insert(key.to_string(), entry);
                Ok(value)
            }
            Err(err) => match cached {
                Some((stale, _)) => {
                    warn!(key, error = %err, "upstream fetch failed, serving stale cache entry");
                    Ok(stale)
                }
                None => {
                    error!(key, error = %err, "upstream fetch failed with nothing cached");
                    Err(err)
                }
            },
        }
    }

    /// Drops every entry, live or expired.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for ExpiringCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a cache key from provider prefix, operation and parameters,
/// e.g. `spotify:track:4uLU6hMCjMI75M1A2tKUQC`.
pub fn cache_key(prefix: &str, operation: &str, params: &[&str]) -> String {
    let mut key = format!("{prefix}:{operation}");
    for param in params {
        key.push(':');
        key.push_str(param);
    }
    key
}
