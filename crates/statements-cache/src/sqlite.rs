//! SQLite-based cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use statements_core::{CacheKey, CalcGraph, CalcGraphCache, FilingId, ReconError, Result};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument};

/// SQLite-based cache for calculation graphs.
///
/// This cache stores graphs as JSON in a SQLite database file, providing
/// persistence across runs so linkbases are downloaded once per filing and
/// once per taxonomy year.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| ReconError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory SQLite cache.
    ///
    /// Useful for testing; data is lost when the cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| ReconError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ReconError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS calc_graph_cache (
                cache_key TEXT PRIMARY KEY NOT NULL,
                parent_count INTEGER NOT NULL,
                graph_json TEXT NOT NULL,
                cached_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| ReconError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS taxonomy_year_cache (
                cik INTEGER NOT NULL,
                adsh TEXT NOT NULL,
                year INTEGER NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (cik, adsh)
            )",
            [],
        )
        .map_err(|e| ReconError::Cache(e.to_string()))?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }
}

#[async_trait]
impl CalcGraphCache for SqliteCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get_graph(&self, key: &CacheKey) -> Result<Option<CalcGraph>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ReconError::Cache(e.to_string()))?;

        let result = conn
            .query_row(
                "SELECT graph_json FROM calc_graph_cache WHERE cache_key = ?1",
                params![key.storage_key()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| ReconError::Cache(e.to_string()))?;

        match result {
            Some(json) => {
                let graph: CalcGraph =
                    serde_json::from_str(&json).map_err(|e| ReconError::Parse(e.to_string()))?;
                debug!(parents = graph.len(), "Found cached calculation graph");
                Ok(Some(graph))
            }
            None => {
                debug!("No cached calculation graph found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, graph), fields(key = %key, parents = graph.len()))]
    async fn put_graph(&self, key: &CacheKey, graph: &CalcGraph) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();
        let graph_json =
            serde_json::to_string(graph).map_err(|e| ReconError::Parse(e.to_string()))?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| ReconError::Cache(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO calc_graph_cache
             (cache_key, parent_count, graph_json, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key.storage_key(), graph.len() as i64, graph_json, cached_at],
        )
        .map_err(|e| ReconError::Cache(e.to_string()))?;

        debug!("Cached calculation graph");
        Ok(())
    }

    #[instrument(skip(self), fields(filing = %filing))]
    async fn get_taxonomy_year(&self, filing: &FilingId) -> Result<Option<u16>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ReconError::Cache(e.to_string()))?;

        conn.query_row(
            "SELECT year FROM taxonomy_year_cache WHERE cik = ?1 AND adsh = ?2",
            params![filing.cik as i64, filing.adsh],
            |row| row.get::<_, u16>(0),
        )
        .optional()
        .map_err(|e| ReconError::Cache(e.to_string()))
    }

    #[instrument(skip(self), fields(filing = %filing))]
    async fn put_taxonomy_year(&self, filing: &FilingId, year: u16) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();
        let conn = self
            .conn
            .lock()
            .map_err(|e| ReconError::Cache(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO taxonomy_year_cache (cik, adsh, year, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![filing.cik as i64, filing.adsh, year, cached_at],
        )
        .map_err(|e| ReconError::Cache(e.to_string()))?;

        debug!(year, "Cached taxonomy year");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(ttl)
                .map_err(|e| ReconError::Cache(format!("Invalid TTL duration: {}", e)))?;
        let cutoff_str = cutoff.to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|e| ReconError::Cache(e.to_string()))?;

        let mut total_deleted = conn
            .execute(
                "DELETE FROM calc_graph_cache WHERE cached_at < ?1",
                params![cutoff_str],
            )
            .map_err(|e| ReconError::Cache(e.to_string()))?;

        total_deleted += conn
            .execute(
                "DELETE FROM taxonomy_year_cache WHERE cached_at < ?1",
                params![cutoff_str],
            )
            .map_err(|e| ReconError::Cache(e.to_string()))?;

        if total_deleted > 0 {
            debug!("Invalidated {} stale cache entries", total_deleted);
        }

        Ok(total_deleted)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ReconError::Cache(e.to_string()))?;

        conn.execute("DELETE FROM calc_graph_cache", [])
            .map_err(|e| ReconError::Cache(e.to_string()))?;
        conn.execute("DELETE FROM taxonomy_year_cache", [])
            .map_err(|e| ReconError::Cache(e.to_string()))?;

        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statements_core::{CalcGraphBuilder, CalcSource};

    fn sample_graph() -> CalcGraph {
        let mut builder = CalcGraphBuilder::new();
        builder.add_arc("us-gaap_Liabilities", "us-gaap_LiabilitiesCurrent", 1.0, 1.0);
        builder.add_arc("us-gaap_Liabilities", "us-gaap_LongTermDebtNoncurrent", 1.0, 2.0);
        builder.add_arc("us-gaap_AssetsCurrent", "us-gaap_InventoryNet", 1.0, 1.0);
        builder.build()
    }

    #[tokio::test]
    async fn test_sqlite_cache_initialization() {
        let cache = SqliteCache::in_memory();
        assert!(cache.is_ok());
    }

    #[tokio::test]
    async fn test_graph_cache() {
        let cache = SqliteCache::in_memory().unwrap();
        let filing = FilingId::new(320193, "0000320193-24-000081");
        let key = CacheKey::filing(filing, CalcSource::FilingLinkbase);

        assert!(cache.get_graph(&key).await.unwrap().is_none());

        let graph = sample_graph();
        cache.put_graph(&key, &graph).await.unwrap();

        let retrieved = cache.get_graph(&key).await.unwrap().unwrap();
        assert_eq!(retrieved, graph);
        assert_eq!(retrieved.children("Liabilities").len(), 2);
    }

    #[tokio::test]
    async fn test_empty_graph_is_a_hit() {
        let cache = SqliteCache::in_memory().unwrap();
        let key = CacheKey::Taxonomy(2019);
        cache.put_graph(&key, &CalcGraph::new()).await.unwrap();
        let retrieved = cache.get_graph(&key).await.unwrap();
        assert!(retrieved.is_some_and(|g| g.is_empty()));
    }

    #[tokio::test]
    async fn test_taxonomy_year_cache() {
        let cache = SqliteCache::in_memory().unwrap();
        let filing = FilingId::new(320193, "0000320193-24-000081");
        assert!(cache.get_taxonomy_year(&filing).await.unwrap().is_none());
        cache.put_taxonomy_year(&filing, 2024).await.unwrap();
        assert_eq!(cache.get_taxonomy_year(&filing).await.unwrap(), Some(2024));
    }

    #[tokio::test]
    async fn test_invalidate_stale() {
        let cache = SqliteCache::in_memory().unwrap();
        cache
            .put_graph(&CacheKey::Taxonomy(2023), &sample_graph())
            .await
            .unwrap();

        let removed = cache
            .invalidate_stale(Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let removed = cache.invalidate_stale(Duration::ZERO).await.unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let cache = SqliteCache::in_memory().unwrap();
        let key = CacheKey::Taxonomy(2023);
        cache.put_graph(&key, &sample_graph()).await.unwrap();

        cache.clear().await.unwrap();

        assert!(cache.get_graph(&key).await.unwrap().is_none());
    }
}
