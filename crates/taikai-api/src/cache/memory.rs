//! In-process TTL + version response cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::ApiError;

/// A cached payload with its storage time and version tag.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    payload: T,
    stored_at: Instant,
    version: String,
}

/// String-keyed memoization cache for upstream responses.
///
/// An entry is served only while it is younger than the TTL **and** carries
/// the expected version tag; either condition failing alone evicts it and
/// forces a re-fetch. Entries for the same key are replaced, never mutated.
/// Callers share one instance per resource kind behind `Arc<Mutex<...>>`.
#[derive(Debug, Default)]
pub struct ResponseCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
}

impl<T: Clone> ResponseCache<T> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the cached payload for `key`, or fetches and stores it.
    ///
    /// `fetch` is awaited only on a miss; its error is propagated unchanged
    /// and nothing is stored in that case.
    ///
    /// # Errors
    ///
    /// Returns whatever `fetch` returns on a cache miss that fails.
    pub async fn get_or_fetch<F, Fut>(
        &mut self,
        key: &str,
        ttl: Duration,
        version: &str,
        fetch: F,
    ) -> Result<T, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(payload) = self.get(key, ttl, version) {
            tracing::debug!(key, "response cache hit");
            return Ok(payload);
        }

        tracing::debug!(key, "response cache miss");
        let payload = fetch().await?;
        self.entries.insert(
            String::from(key),
            CacheEntry {
                payload: payload.clone(),
                stored_at: Instant::now(),
                version: String::from(version),
            },
        );
        Ok(payload)
    }

    /// Looks up a fresh entry, evicting it if stale or version-mismatched.
    fn get(&mut self, key: &str, ttl: Duration, version: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        if entry.version == version && entry.stored_at.elapsed() < ttl {
            return Some(entry.payload.clone());
        }
        self.entries.remove(key);
        None
    }

    /// Number of entries currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
