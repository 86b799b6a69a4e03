#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Reconstruction and standardization of SEC financial statements.
//!
//! This crate re-exports the workspace crates and provides the
//! [`FilingPipeline`], which runs a filing end to end and processes batches
//! of filings concurrently.
//!
//! # Features
//!
//! - `cache-sqlite` - SQLite-based calculation graph cache
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use statements::{FilingData, FilingPipeline, InMemoryCache, ReconConfig, StatementKind};
//!
//! #[tokio::main]
//! async fn main() -> statements::Result<()> {
//!     let pipeline = FilingPipeline::new(ReconConfig::from_env())?
//!         .with_edgar(Arc::new(InMemoryCache::new()))?;
//!
//!     let data = FilingData::default();
//!     let result = pipeline.process_filing(&data).await;
//!     if let Some(bs) = result.standardized(StatementKind::BalanceSheet) {
//!         println!("{:?}", bs.current_value("total_assets"));
//!     }
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use statements_core::*;

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use statements_cache::SqliteCache;
pub use statements_cache::{InMemoryCache, NoopCache};

// Calculation graph loading
pub use statements_edgar::{CalcGraphLoader, EdgarClient, FilingIndex};

// Reconstruction
pub use statements_recon::{
    FilingFrames, LineItem, ReconstructedStatement, Reconstructor, StatementMetadata,
    StatementTree, ValidationReport,
};

// Mapping
pub use statements_mapping::{
    MappingEngine, MappingStatus, Provenance, SourceItem, StandardField, StandardizedStatement,
    Strategy,
};

mod pipeline;
pub use pipeline::{FilingPipeline, FilingResult};
