//! Tiered calculation graph loader.
//!
//! Sources are tried in order until one yields relationships:
//!
//! 1. The filing's calculation linkbase (`*_cal.xml`)
//! 2. Calculation arcs embedded in the filing's extension schema (`.xsd`)
//! 3. The standard US-GAAP statement linkbases for the filing's taxonomy year
//!
//! Every attempt is recorded with its reason. Results are cached per filing and
//! source (tiers 1 and 2) or per taxonomy year (tier 3). A definitive not-found
//! is cached as an empty graph; a transport failure is not cached.

use std::sync::Arc;

use statements_core::{
    ArtifactFetcher, CacheKey, CalcGraph, CalcGraphBuilder, CalcGraphCache, CalcGraphLoad,
    CalcSource, FilingId, ReconConfig, SourceAttempt,
};
use tracing::{debug, info, instrument, warn};

use crate::index::{FilingIndex, taxonomy_year};
use crate::linkbase::{add_calc_arcs, parse_calc_graph};

/// Base URL of the FASB US-GAAP taxonomy.
pub const FASB_US_GAAP_URL: &str = "https://xbrl.fasb.org/us-gaap";

/// Statement linkbases of the US-GAAP taxonomy that are merged into one graph:
/// classified balance sheet, deposit-based operations balance sheet, income
/// statement, indirect cash flow, and stockholders' equity.
pub const TAXONOMY_STATEMENTS: [&str; 5] = ["sfp-cls", "sfp-dbo", "soi", "scf-indir", "sheci"];

/// URLs of the standard statement calculation linkbases for a taxonomy year.
#[must_use]
pub fn taxonomy_linkbase_urls(year: u16) -> Vec<String> {
    TAXONOMY_STATEMENTS
        .iter()
        .map(|stmt| {
            format!(
                "{}/{}/stm/us-gaap-stm-{}-cal-{}.xml",
                FASB_US_GAAP_URL, year, stmt, year
            )
        })
        .collect()
}

/// Why a source produced nothing, and whether that outcome may be cached.
#[derive(Debug, Clone)]
struct Fallthrough {
    reason: String,
    cacheable: bool,
}

impl Fallthrough {
    fn not_found(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            cacheable: true,
        }
    }

    fn transient(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            cacheable: false,
        }
    }
}

type Lookup<T> = std::result::Result<T, Fallthrough>;

/// Loads calculation graphs with caching and a three-tier fallback chain.
#[derive(Clone)]
pub struct CalcGraphLoader {
    fetcher: Arc<dyn ArtifactFetcher>,
    cache: Arc<dyn CalcGraphCache>,
    default_taxonomy_year: u16,
}

impl std::fmt::Debug for CalcGraphLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalcGraphLoader")
            .field("fetcher", &self.fetcher.name())
            .field("cache", &self.cache)
            .field("default_taxonomy_year", &self.default_taxonomy_year)
            .finish()
    }
}

impl CalcGraphLoader {
    /// Creates a loader over a fetcher and a cache, with the default
    /// taxonomy year of [`ReconConfig::default`].
    pub fn new(fetcher: Arc<dyn ArtifactFetcher>, cache: Arc<dyn CalcGraphCache>) -> Self {
        Self {
            fetcher,
            cache,
            default_taxonomy_year: ReconConfig::default().default_taxonomy_year,
        }
    }

    /// Sets the taxonomy year used when a filing declares none.
    #[must_use]
    pub const fn with_default_taxonomy_year(mut self, year: u16) -> Self {
        self.default_taxonomy_year = year;
        self
    }

    /// Loads the calculation graph for a filing.
    ///
    /// Never fails: when every source is exhausted the result carries an empty
    /// graph and the attempt log.
    #[instrument(skip(self), fields(filing = %filing))]
    pub async fn load(&self, filing: &FilingId) -> CalcGraphLoad {
        let mut attempts = Vec::with_capacity(3);
        let mut index: Option<Lookup<FilingIndex>> = None;

        for source in [CalcSource::FilingLinkbase, CalcSource::EmbeddedSchema] {
            let key = CacheKey::filing(filing.clone(), source);
            let (graph, attempt) = match self.cached(&key).await {
                Some(graph) => {
                    let attempt = cached_attempt(source, &graph);
                    (graph, attempt)
                }
                None => {
                    let result = self.load_filing_source(filing, source, &mut index).await;
                    self.settle(&key, source, result).await
                }
            };
            attempts.push(attempt);
            if !graph.is_empty() {
                info!(source = %source, parents = graph.len(), "Loaded calculation graph");
                return CalcGraphLoad {
                    graph,
                    source: Some(source),
                    attempts,
                };
            }
        }

        let year = self.taxonomy_year(filing).await;
        let source = CalcSource::Taxonomy(year);
        let key = CacheKey::Taxonomy(year);
        let (graph, attempt) = match self.cached(&key).await {
            Some(graph) => {
                let attempt = cached_attempt(source, &graph);
                (graph, attempt)
            }
            None => {
                let result = self.load_taxonomy(year).await;
                self.settle(&key, source, result).await
            }
        };
        attempts.push(attempt);

        if graph.is_empty() {
            warn!(
                attempts = attempts.len(),
                "No calculation graph available, roll-up skipping disabled"
            );
            return CalcGraphLoad {
                graph,
                source: None,
                attempts,
            };
        }

        info!(source = %source, parents = graph.len(), "Loaded calculation graph");
        CalcGraphLoad {
            graph,
            source: Some(source),
            attempts,
        }
    }

    async fn cached(&self, key: &CacheKey) -> Option<CalcGraph> {
        match self.cache.get_graph(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, fetching");
                None
            }
        }
    }

    async fn store(&self, key: &CacheKey, graph: &CalcGraph) {
        if let Err(e) = self.cache.put_graph(key, graph).await {
            warn!(key = %key, error = %e, "Failed to cache calculation graph");
        }
    }

    /// Caches a fresh outcome when allowed and turns it into a log entry.
    async fn settle(
        &self,
        key: &CacheKey,
        source: CalcSource,
        result: Lookup<(CalcGraph, String)>,
    ) -> (CalcGraph, SourceAttempt) {
        match result {
            Ok((graph, reason)) => {
                self.store(key, &graph).await;
                let attempt = SourceAttempt {
                    source,
                    parents: graph.len(),
                    cached: false,
                    reason,
                };
                (graph, attempt)
            }
            Err(fallthrough) => {
                debug!(source = %source, reason = %fallthrough.reason, "Source produced no graph");
                let graph = CalcGraph::new();
                if fallthrough.cacheable {
                    self.store(key, &graph).await;
                }
                let attempt = SourceAttempt {
                    source,
                    parents: 0,
                    cached: false,
                    reason: fallthrough.reason,
                };
                (graph, attempt)
            }
        }
    }

    async fn fetch(&self, url: &str, what: &str) -> Lookup<String> {
        match self.fetcher.fetch_text(url).await {
            Ok(Some(body)) => Ok(body),
            Ok(None) => Err(Fallthrough::not_found(format!("{} not found", what))),
            Err(e) => {
                warn!(
                    fetcher = self.fetcher.name(),
                    url,
                    error = %e,
                    "Fetch failed, trying next source"
                );
                Err(Fallthrough::transient(format!("{} fetch failed: {}", what, e)))
            }
        }
    }

    async fn filing_index(&self, filing: &FilingId) -> Lookup<FilingIndex> {
        let url = format!("{}index.json", filing.archive_url());
        let body = self.fetch(&url, "index.json").await?;
        FilingIndex::parse(&body).map_err(|e| Fallthrough::not_found(e.to_string()))
    }

    async fn load_filing_source(
        &self,
        filing: &FilingId,
        source: CalcSource,
        index: &mut Option<Lookup<FilingIndex>>,
    ) -> Lookup<(CalcGraph, String)> {
        let listing = match index {
            Some(listing) => listing.clone(),
            None => {
                let listing = self.filing_index(filing).await;
                *index = Some(listing.clone());
                listing
            }
        }?;

        let file = match source {
            CalcSource::FilingLinkbase => listing.calc_linkbase_file().ok_or_else(|| {
                Fallthrough::not_found("filing index lists no calculation linkbase")
            })?,
            CalcSource::EmbeddedSchema | CalcSource::Taxonomy(_) => listing
                .schema_file()
                .map(str::to_string)
                .ok_or_else(|| Fallthrough::not_found("filing index lists no extension schema"))?,
        };

        let url = format!("{}{}", filing.archive_url(), file);
        let body = self.fetch(&url, &file).await?;
        let graph = parse_calc_graph(&body)
            .map_err(|e| Fallthrough::not_found(format!("{} unreadable: {}", file, e)))?;
        if graph.is_empty() {
            return Err(Fallthrough::not_found(format!(
                "{} has no calculation arcs",
                file
            )));
        }

        let reason = format!("loaded {} parent tags from {}", graph.len(), file);
        Ok((graph, reason))
    }

    async fn taxonomy_year(&self, filing: &FilingId) -> u16 {
        match self.cache.get_taxonomy_year(filing).await {
            Ok(Some(year)) => return year,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Cache read failed, fetching MetaLinks.json"),
        }

        let url = format!("{}MetaLinks.json", filing.archive_url());
        let year = match self.fetch(&url, "MetaLinks.json").await {
            Ok(body) => match taxonomy_year(&body) {
                Ok(Some(year)) => Some(year),
                Ok(None) => Some(self.default_taxonomy_year),
                Err(e) => {
                    debug!(error = %e, "Unreadable MetaLinks.json, using default taxonomy year");
                    Some(self.default_taxonomy_year)
                }
            },
            Err(fallthrough) if fallthrough.cacheable => Some(self.default_taxonomy_year),
            Err(_) => None,
        };

        match year {
            Some(year) => {
                if let Err(e) = self.cache.put_taxonomy_year(filing, year).await {
                    warn!(error = %e, "Failed to cache taxonomy year");
                }
                year
            }
            None => self.default_taxonomy_year,
        }
    }

    async fn load_taxonomy(&self, year: u16) -> Lookup<(CalcGraph, String)> {
        let mut builder = CalcGraphBuilder::new();
        let mut loaded = 0usize;
        let mut transient = None;

        for url in taxonomy_linkbase_urls(year) {
            let body = match self.fetch(&url, &url).await {
                Ok(body) => body,
                Err(fallthrough) => {
                    if !fallthrough.cacheable {
                        transient = Some(fallthrough.reason);
                    }
                    continue;
                }
            };
            match add_calc_arcs(&body, &mut builder) {
                Ok(_) => loaded += 1,
                Err(e) => debug!(url, error = %e, "Skipping unreadable taxonomy linkbase"),
            }
        }

        if let Some(reason) = transient {
            return Err(Fallthrough::transient(reason));
        }
        if builder.is_empty() {
            return Err(Fallthrough::not_found(format!(
                "no US-GAAP {} statement linkbases available",
                year
            )));
        }

        let graph = builder.build();
        let reason = format!(
            "merged {} of {} US-GAAP {} statement linkbases ({} parent tags)",
            loaded,
            TAXONOMY_STATEMENTS.len(),
            year,
            graph.len()
        );
        Ok((graph, reason))
    }
}

fn cached_attempt(source: CalcSource, graph: &CalcGraph) -> SourceAttempt {
    let reason = if graph.is_empty() {
        "cached: not available".to_string()
    } else {
        format!("cached: {} parent tags", graph.len())
    };
    SourceAttempt {
        source,
        parents: graph.len(),
        cached: true,
        reason,
    }
}
