//! Error types for reconstruction operations.
//!
//! This module defines [`ReconError`] which covers the failures that can occur
//! while ingesting raw tables, fetching calculation linkbases, parsing them, or
//! talking to a cache.
//!
//! Accounting problems (a missing total, an unbalanced balance sheet) are not
//! errors: they are reported as halted mapping results so a batch can continue.

use thiserror::Error;

/// Errors that can occur during reconstruction and acquisition.
#[derive(Error, Debug)]
pub enum ReconError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// A remote artifact does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded by the remote host.
    #[error("Rate limited by {host}: retry after {retry_after:?}")]
    RateLimited {
        /// The host that rate limited the request.
        host: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// Error parsing a JSON document or a raw value.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error parsing an XML linkbase or schema.
    #[error("XML error: {0}")]
    Xml(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// A raw table is missing a required column.
    #[error("Missing column {column} in {table} table")]
    MissingColumn {
        /// Table name (SUB, PRE, NUM or TAG).
        table: String,
        /// The column that was expected.
        column: String,
    },

    /// The input rows are inconsistent or unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl ReconError {
    /// Returns true if this error means the artifact simply does not exist.
    ///
    /// Not-found is an expected condition for calculation linkbases and moves
    /// the loader on to the next source.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias using [`ReconError`].
pub type Result<T> = std::result::Result<T, ReconError>;
