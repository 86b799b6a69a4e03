//! No-op cache implementation.

use async_trait::async_trait;
use statements_core::{CacheKey, CalcGraph, CalcGraphCache, FilingId, Result};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// All `get_*` methods return `Ok(None)` and all `put_*` methods return `Ok(())`.
/// Useful for disabling caching or forcing every load to hit the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CalcGraphCache for NoopCache {
    async fn get_graph(&self, _key: &CacheKey) -> Result<Option<CalcGraph>> {
        trace!("NoopCache: get_graph called, returning None");
        Ok(None)
    }

    async fn put_graph(&self, _key: &CacheKey, _graph: &CalcGraph) -> Result<()> {
        trace!("NoopCache: put_graph called, doing nothing");
        Ok(())
    }

    async fn get_taxonomy_year(&self, _filing: &FilingId) -> Result<Option<u16>> {
        trace!("NoopCache: get_taxonomy_year called, returning None");
        Ok(None)
    }

    async fn put_taxonomy_year(&self, _filing: &FilingId, _year: u16) -> Result<()> {
        trace!("NoopCache: put_taxonomy_year called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        trace!("NoopCache: invalidate_stale called, returning 0");
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statements_core::{CalcGraphBuilder, CalcSource};

    #[tokio::test]
    async fn test_noop_cache_never_returns_data() {
        let cache = NoopCache::new();
        let filing = FilingId::new(320193, "0000320193-24-000081");
        let key = CacheKey::filing(filing.clone(), CalcSource::FilingLinkbase);

        let mut builder = CalcGraphBuilder::new();
        builder.add_arc("us-gaap_Assets", "us-gaap_AssetsCurrent", 1.0, 1.0);
        cache.put_graph(&key, &builder.build()).await.unwrap();
        cache.put_taxonomy_year(&filing, 2024).await.unwrap();

        assert!(cache.get_graph(&key).await.unwrap().is_none());
        assert!(cache.get_taxonomy_year(&filing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_noop_cache_management() {
        let cache = NoopCache::new();
        let removed = cache
            .invalidate_stale(Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert!(cache.clear().await.is_ok());
    }
}
