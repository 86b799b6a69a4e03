#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Standard-schema mapping of reconstructed statements.
//!
//! - [`LabelNormalizer`](normalize::LabelNormalizer) - Label normalization shared by rules and line items
//! - [`Pattern`](pattern::Pattern) - The rule pattern language
//! - [`RuleBook`](rules::RuleBook) - Compiled control and item rule tables
//! - [`MappingEngine`](engine::MappingEngine) - Per-statement mapping pipeline
//! - [`StandardizedStatement`](standardized::StandardizedStatement) - Mapped output with provenance
//!
//! # Example
//!
//! ```no_run
//! use statements_core::ReconConfig;
//! use statements_mapping::MappingEngine;
//! use statements_recon::ReconstructedStatement;
//!
//! fn print_fields(statement: &ReconstructedStatement) -> statements_core::Result<()> {
//!     let engine = MappingEngine::new(ReconConfig::default())?;
//!     if let Some(mapped) = engine.map(statement) {
//!         for (name, field) in &mapped.fields {
//!             println!("{name}: {:?} ({:?})", field.values, field.provenance);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

/// Aggregation of mapped line items.
pub mod aggregate;
/// Control total identification.
pub mod controls;
/// The mapping pipeline.
pub mod engine;
/// Label normalization.
pub mod normalize;
/// Rule pattern language.
pub mod pattern;
/// Balance sheet validation and residuals.
pub mod residual;
/// Rule tables.
pub mod rules;
/// Standardized output.
pub mod standardized;

pub use aggregate::{Assignment, aggregate, mapped_ancestors, split_stockholders_equity};
pub use controls::{ControlLines, identify_controls};
pub use engine::MappingEngine;
pub use normalize::LabelNormalizer;
pub use pattern::{Candidate, Pattern, Position, Predicate};
pub use residual::{FINANCIAL_SECTOR, SPLIT_UNAVAILABLE, derive_balance_sheet};
pub use rules::{ControlRule, Rule, RuleBook, RuleSet, Strategy};
pub use standardized::{
    MappingStatus, Provenance, SourceItem, StandardField, StandardizedStatement,
};
