//! Rate-limited HTTP client for EDGAR and FASB artifacts.

use async_trait::async_trait;
use reqwest::StatusCode;
use statements_core::{ArtifactFetcher, ReconConfig, ReconError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Default rate limit: 10 requests per second (SEC requirement)
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// SEC EDGAR artifact client.
///
/// Fetches filing indexes, linkbases and taxonomy files. Every request waits
/// on a shared rate limiter, so clones of the client used by concurrent
/// pipelines still respect the SEC limit of 10 requests per second.
#[derive(Debug, Clone)]
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    user_agent: String,
}

impl EdgarClient {
    /// Create a new EDGAR client with the specified user agent.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_settings(user_agent, DEFAULT_RATE_LIMIT, DEFAULT_TIMEOUT)
    }

    /// Create a client from the pipeline configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ReconConfig) -> Result<Self> {
        Self::with_settings(
            &config.user_agent,
            config.rate_limit(),
            config.request_timeout(),
        )
    }

    /// Create a client with an explicit rate limit and timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_settings(user_agent: &str, rate_limit: Duration, timeout: Duration) -> Result<Self> {
        if user_agent.trim().is_empty() {
            return Err(ReconError::InvalidInput(
                "EDGAR requires a non-empty User-Agent".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ReconError::Network(e.to_string()))?;

        Ok(Self::with_client(client, user_agent, rate_limit))
    }

    /// Create a new EDGAR client with a custom HTTP client.
    pub fn with_client(client: reqwest::Client, user_agent: &str, rate_limit: Duration) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(rate_limit))),
            user_agent: user_agent.to_string(),
        }
    }

    /// The configured user agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl ArtifactFetcher for EdgarClient {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    async fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        // Rate limit
        self.rate_limiter.lock().await.wait().await;

        debug!(url, "Fetching artifact");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ReconError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                debug!(url, "Artifact not found");
                Ok(None)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(ReconError::RateLimited {
                    host: response
                        .url()
                        .host_str()
                        .unwrap_or_default()
                        .to_string(),
                    retry_after,
                })
            }
            status if !status.is_success() => Err(ReconError::Network(format!(
                "Failed to fetch {}: HTTP {}",
                url, status
            ))),
            _ => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| ReconError::Network(e.to_string()))?;
                Ok(Some(body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_user_agent() {
        assert!(EdgarClient::new("  ").is_err());
        let client = EdgarClient::new("Test/1.0 (test@example.com)").unwrap();
        assert_eq!(client.name(), "SEC EDGAR");
        assert_eq!(client.user_agent(), "Test/1.0 (test@example.com)");
    }

    #[test]
    fn test_client_from_config() {
        let config = ReconConfig::default().with_user_agent("Acme research@acme.test");
        let client = EdgarClient::from_config(&config).unwrap();
        assert_eq!(client.user_agent(), "Acme research@acme.test");
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let mut limiter = RateLimiter::new(Duration::from_millis(30));
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
