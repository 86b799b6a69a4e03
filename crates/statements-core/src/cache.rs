//! Cache trait for calculation graphs.
//!
//! This module defines the [`CalcGraphCache`] trait used by the calculation
//! graph loader. Filing-level sources are keyed per filing and source; the
//! standard taxonomy is keyed per year. An empty graph stored under a key
//! records a definitive not-found so the artifact is not fetched again.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::{
    calc::{CalcGraph, CalcSource},
    error::Result,
    types::FilingId,
};

/// Key of a cached calculation graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A filing-level source (filing linkbase or embedded schema).
    Filing {
        /// The filing.
        filing: FilingId,
        /// The source tier.
        source: CalcSource,
    },
    /// The merged standard taxonomy graph for a year.
    Taxonomy(u16),
}

impl CacheKey {
    /// Key for a filing-level source.
    #[must_use]
    pub const fn filing(filing: FilingId, source: CalcSource) -> Self {
        Self::Filing { filing, source }
    }

    /// Stable string form used as a storage key.
    #[must_use]
    pub fn storage_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filing { filing, source } => {
                write!(f, "filing:{}:{}:{}", filing.cik, filing.adsh, source)
            }
            Self::Taxonomy(year) => write!(f, "taxonomy:{}", year),
        }
    }
}

/// Trait for caching calculation graphs and per-filing taxonomy years.
///
/// Implementations can store data in various backends (SQLite, in-memory, etc.)
/// to avoid repeated downloads of linkbases.
#[async_trait]
pub trait CalcGraphCache: Send + Sync + fmt::Debug {
    /// Retrieves a cached graph.
    ///
    /// Returns `Ok(Some(graph))` if cached (possibly empty), `Ok(None)` if not cached.
    async fn get_graph(&self, key: &CacheKey) -> Result<Option<CalcGraph>>;

    /// Stores a graph in the cache.
    async fn put_graph(&self, key: &CacheKey, graph: &CalcGraph) -> Result<()>;

    /// Retrieves the cached taxonomy year of a filing.
    async fn get_taxonomy_year(&self, filing: &FilingId) -> Result<Option<u16>>;

    /// Stores the taxonomy year of a filing.
    async fn put_taxonomy_year(&self, filing: &FilingId, year: u16) -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
