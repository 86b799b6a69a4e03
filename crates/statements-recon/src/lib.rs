#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Statement reconstruction from the SEC financial statement data sets.
//!
//! - [`FilingFrames`](frame::FilingFrames) - Typed rows from the raw polars tables
//! - [`StatementTree`](hierarchy::StatementTree) - Arena-backed presentation hierarchy
//! - [`discover_periods`](periods::discover_periods) - Reporting periods of a statement
//! - [`AncestorLookup`](rollup::AncestorLookup) - Calculation parents and control ancestors
//! - [`Reconstructor`](reconstruct::Reconstructor) - The per-statement pipeline
//!
//! # Example
//!
//! ```no_run
//! use statements_core::{CalcGraph, FilingData, StatementKind};
//! use statements_recon::Reconstructor;
//!
//! fn print_balance_sheet(data: &FilingData) {
//!     let reconstructor = Reconstructor::default();
//!     if let Some(bs) = reconstructor.reconstruct(data, StatementKind::BalanceSheet, &CalcGraph::new()) {
//!         for item in bs.line_items() {
//!             println!("{:>4} {} {:?}", item.line, item.label, item.values);
//!         }
//!     }
//! }
//! ```

/// Ingestion of the raw SUB/PRE/NUM/TAG tables.
pub mod frame;
/// Presentation hierarchy.
pub mod hierarchy;
/// Reporting period discovery.
pub mod periods;
/// Statement reconstruction.
pub mod reconstruct;
/// Roll-up marking and calculation ancestor lookup.
pub mod rollup;
/// Reconstructed statement output.
pub mod statement;
/// Statement validation.
pub mod validate;
/// Binding numeric facts to line items.
pub mod values;

pub use frame::FilingFrames;
pub use hierarchy::{LineItem, NodeId, StatementTree, select_report};
pub use periods::{discover_periods, infer_opening_date, instant_dates, representative_tags};
pub use reconstruct::Reconstructor;
pub use rollup::{AncestorLookup, CONTROL_ITEM_TAGS, is_control_tag, mark_roll_ups};
pub use statement::{ReconstructedStatement, StatementMetadata};
pub use validate::{
    EquationCheck, RollupIssue, ValidationReport, relative_difference, validate, within_tolerance,
};
pub use values::{FactIndex, attach_values, is_opening_item};
