//! Per-filing pipeline and batch runner.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use statements_core::{
    ArtifactFetcher, CalcGraphCache, CalcGraphLoad, FilingData, FilingId, ReconConfig, Result,
    StatementKind,
};
use statements_edgar::{CalcGraphLoader, EdgarClient};
use statements_mapping::{MappingEngine, StandardizedStatement};
use statements_recon::{ReconstructedStatement, Reconstructor};

/// Everything produced for one filing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilingResult {
    /// The filing, when its submission is known.
    pub filing: Option<FilingId>,
    /// Calculation graph and the log of sources tried.
    pub calc: CalcGraphLoad,
    /// Reconstructed statements, in statement type order.
    pub statements: Vec<ReconstructedStatement>,
    /// Standardized balance sheet, income statement and cash flow statement.
    pub standardized: Vec<StandardizedStatement>,
}

impl FilingResult {
    /// The reconstructed statement of a type.
    #[must_use]
    pub fn statement(&self, kind: StatementKind) -> Option<&ReconstructedStatement> {
        self.statements.iter().find(|s| s.kind == kind)
    }

    /// The standardized statement of a type.
    #[must_use]
    pub fn standardized(&self, kind: StatementKind) -> Option<&StandardizedStatement> {
        self.standardized.iter().find(|s| s.kind == kind)
    }
}

/// Runs reconstruction and mapping for filings.
///
/// Without a loader every filing is reconstructed against an empty
/// calculation graph, so no roll-ups are marked.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use statements::{FilingData, FilingPipeline, InMemoryCache, ReconConfig};
///
/// async fn run(filings: Vec<FilingData>) -> statements::Result<()> {
///     let pipeline = FilingPipeline::new(ReconConfig::from_env())?
///         .with_edgar(Arc::new(InMemoryCache::new()))?;
///     for result in pipeline.process_batch(&filings).await {
///         println!("{:?}: {} statements", result.filing, result.standardized.len());
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FilingPipeline {
    config: ReconConfig,
    reconstructor: Reconstructor,
    engine: MappingEngine,
    loader: Option<CalcGraphLoader>,
}

impl FilingPipeline {
    /// Creates a pipeline without a calculation graph loader.
    pub fn new(config: ReconConfig) -> Result<Self> {
        Ok(Self {
            reconstructor: Reconstructor::new(config.clone()),
            engine: MappingEngine::new(config.clone())?,
            loader: None,
            config,
        })
    }

    /// Uses `loader` for calculation graphs.
    #[must_use]
    pub fn with_loader(mut self, loader: CalcGraphLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Loads calculation graphs through `fetcher`, cached in `cache`.
    #[must_use]
    pub fn with_fetcher(
        self,
        fetcher: Arc<dyn ArtifactFetcher>,
        cache: Arc<dyn CalcGraphCache>,
    ) -> Self {
        let loader = CalcGraphLoader::new(fetcher, cache)
            .with_default_taxonomy_year(self.config.default_taxonomy_year);
        self.with_loader(loader)
    }

    /// Loads calculation graphs from EDGAR and the FASB taxonomy with the
    /// configured user agent, rate limit and timeout.
    pub fn with_edgar(self, cache: Arc<dyn CalcGraphCache>) -> Result<Self> {
        let client = EdgarClient::from_config(&self.config)?;
        Ok(self.with_fetcher(Arc::new(client), cache))
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Loads the calculation graph, reconstructs every presented statement
    /// and maps the ones with rule tables.
    #[instrument(skip_all, fields(adsh = data.filing().map(|f| f.adsh.as_str()).unwrap_or_default()))]
    pub async fn process_filing(&self, data: &FilingData) -> FilingResult {
        let filing = data.filing().cloned();
        let calc = match (&self.loader, &filing) {
            (Some(loader), Some(filing)) => loader.load(filing).await,
            _ => {
                debug!("No loader or filing identity, using an empty calculation graph");
                CalcGraphLoad::default()
            }
        };

        let mut statements = self.reconstructor.reconstruct_all(data, &calc.graph);
        for statement in &mut statements {
            statement.metadata.calc_source = calc.source;
        }
        let standardized = self.engine.map_all(&statements);

        info!(
            statements = statements.len(),
            standardized = standardized.len(),
            halted = standardized.iter().filter(|s| s.status.is_halted()).count(),
            calc_source = ?calc.source,
            "Processed filing"
        );

        FilingResult {
            filing,
            calc,
            statements,
            standardized,
        }
    }

    /// Processes filings concurrently, at most `batch_concurrency` at a time.
    /// Results arrive in completion order.
    pub async fn process_batch(&self, filings: &[FilingData]) -> Vec<FilingResult> {
        info!(filings = filings.len(), concurrency = self.config.batch_concurrency, "Processing batch");
        stream::iter(filings)
            .map(|data| self.process_filing(data))
            .buffer_unordered(self.config.batch_concurrency.max(1))
            .collect()
            .await
    }
}
