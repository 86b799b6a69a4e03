#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for financial statement reconstruction.
//!
//! This crate provides the foundational abstractions shared by the workspace:
//!
//! - [`FilingData`](types::FilingData) - Typed SUB/PRE/NUM/TAG rows of one filing
//! - [`Period`](period::Period) - Reporting periods and their labels
//! - [`CalcGraph`](calc::CalcGraph) - Calculation roll-up relationships
//! - [`ArtifactFetcher`](fetch::ArtifactFetcher) - Remote artifact acquisition
//! - [`CalcGraphCache`](cache::CalcGraphCache) - Caching abstraction
//! - [`ReconConfig`](config::ReconConfig) - Tolerances and client settings

/// Cache trait and keys for calculation graphs.
pub mod cache;
/// Calculation graph types.
pub mod calc;
/// Pipeline configuration.
pub mod config;
/// Error types for reconstruction operations.
pub mod error;
/// Remote artifact fetcher trait.
pub mod fetch;
/// Reporting period definitions.
pub mod period;
/// Typed rows of the raw data sets.
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{CacheKey, CalcGraphCache};
pub use calc::{
    CalcChild, CalcGraph, CalcGraphBuilder, CalcGraphLoad, CalcSource, SourceAttempt, local_name,
    same_concept,
};
pub use config::ReconConfig;
pub use error::{ReconError, Result};
pub use fetch::ArtifactFetcher;
pub use period::{Period, PeriodKey, PeriodValues, period_label};
pub use types::{
    FactKind, FilingData, FilingId, NumericFact, Polarity, PresentationRow, StatementKind,
    Submission, TagInfo, ValueType,
};
