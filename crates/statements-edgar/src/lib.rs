#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR access and calculation graph loading.
//!
//! This crate provides:
//!
//! - [`EdgarClient`] - Rate-limited client implementing [`ArtifactFetcher`]
//! - [`FilingIndex`] - Filing directory listing (`index.json`)
//! - [`parse_calc_graph`] - Calculation linkbase parser
//! - [`CalcGraphLoader`] - Three-tier loader with caching and an attempt log
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use statements_cache::InMemoryCache;
//! use statements_core::FilingId;
//! use statements_edgar::{CalcGraphLoader, EdgarClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EdgarClient::new("MyApp/1.0 (contact@example.com)")?;
//!     let loader = CalcGraphLoader::new(Arc::new(client), Arc::new(InMemoryCache::new()));
//!
//!     let filing = FilingId::new(320193, "0000320193-24-000081");
//!     let load = loader.load(&filing).await;
//!     for attempt in &load.attempts {
//!         println!("{}: {}", attempt.source, attempt.reason);
//!     }
//!     Ok(())
//! }
//! ```

/// Rate-limited HTTP client.
pub mod client;
/// `index.json` and `MetaLinks.json` parsing.
pub mod index;
/// Calculation linkbase parsing.
pub mod linkbase;
/// Tiered calculation graph loader.
pub mod loader;

pub use client::EdgarClient;
pub use index::{FilingIndex, taxonomy_year};
pub use linkbase::{add_calc_arcs, parse_calc_graph};
pub use loader::{CalcGraphLoader, taxonomy_linkbase_urls};

pub use statements_core::ArtifactFetcher;
