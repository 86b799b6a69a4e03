//! Remote artifact acquisition trait.
//!
//! The calculation graph loader reads filing indexes, linkbases and taxonomy
//! files through an [`ArtifactFetcher`]. The production implementation is the
//! rate-limited EDGAR client; tests use a scripted in-memory fetcher.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::Result;

/// Fetches text artifacts by URL.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync + Debug {
    /// Returns the fetcher name for logging.
    fn name(&self) -> &str;

    /// Fetches the body of `url` as text.
    ///
    /// Returns `Ok(None)` when the artifact does not exist (HTTP 404), which is
    /// an expected outcome. Transport failures are returned as errors.
    async fn fetch_text(&self, url: &str) -> Result<Option<String>>;
}
