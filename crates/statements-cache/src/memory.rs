//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use statements_core::{CacheKey, CalcGraph, CalcGraphCache, FilingId, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Simple in-memory cache.
///
/// Data is stored in `RwLock`-protected `HashMap`s and is lost when the cache
/// is dropped. Graphs are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    graphs: RwLock<HashMap<CacheKey, CacheEntry<CalcGraph>>>,
    taxonomy_years: RwLock<HashMap<FilingId, CacheEntry<u16>>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached graphs.
    pub async fn graph_count(&self) -> usize {
        self.graphs.read().await.len()
    }
}

#[async_trait]
impl CalcGraphCache for InMemoryCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get_graph(&self, key: &CacheKey) -> Result<Option<CalcGraph>> {
        let cache = self.graphs.read().await;
        match cache.get(key) {
            Some(entry) => {
                debug!(parents = entry.data.len(), "Cache hit for calculation graph");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for calculation graph");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, graph), fields(key = %key, parents = graph.len()))]
    async fn put_graph(&self, key: &CacheKey, graph: &CalcGraph) -> Result<()> {
        let mut cache = self.graphs.write().await;
        cache.insert(key.clone(), CacheEntry::new(graph.clone()));
        debug!("Cached calculation graph");
        Ok(())
    }

    #[instrument(skip(self), fields(filing = %filing))]
    async fn get_taxonomy_year(&self, filing: &FilingId) -> Result<Option<u16>> {
        let cache = self.taxonomy_years.read().await;
        Ok(cache.get(filing).map(|entry| entry.data))
    }

    #[instrument(skip(self), fields(filing = %filing))]
    async fn put_taxonomy_year(&self, filing: &FilingId, year: u16) -> Result<()> {
        let mut cache = self.taxonomy_years.write().await;
        cache.insert(filing.clone(), CacheEntry::new(year));
        debug!(year, "Cached taxonomy year");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut total_removed = 0usize;

        {
            let mut cache = self.graphs.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        {
            let mut cache = self.taxonomy_years.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        if total_removed > 0 {
            debug!("Invalidated {} stale cache entries", total_removed);
        }

        Ok(total_removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.graphs.write().await.clear();
        self.taxonomy_years.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}
