//! Reconstruction and acquisition settings.
//!
//! [`ReconConfig`] gathers every tunable threshold of the pipeline together
//! with the remote-access parameters of the EDGAR client.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Default `User-Agent` sent to EDGAR. Callers should override it with a
/// contact address, as the regulator requires.
pub const DEFAULT_USER_AGENT: &str = "statements/0.1 (research@example.com)";

/// Environment variable overriding the `User-Agent`.
pub const USER_AGENT_ENV: &str = "STATEMENTS_USER_AGENT";

/// Pipeline configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Relative tolerance for statement equations (e.g. assets = L + E).
    pub equation_tolerance: f64,
    /// Relative tolerance for roll-up validation.
    pub rollup_tolerance: f64,
    /// Absolute amount below which a residual is treated as zero.
    pub residual_epsilon: f64,
    /// Average days per month used for opening-balance date inference.
    pub days_per_month: f64,
    /// Taxonomy year used when a filing does not declare one.
    pub default_taxonomy_year: u16,
    /// `User-Agent` header for remote requests.
    pub user_agent: String,
    /// Minimum interval between remote requests, in milliseconds.
    pub rate_limit_ms: u64,
    /// Remote request timeout, in seconds.
    pub request_timeout_secs: u64,
    /// Number of filings processed concurrently by the batch runner.
    pub batch_concurrency: usize,
    /// First SIC code of the financial sector.
    pub financial_sic_start: u32,
    /// Last SIC code of the financial sector.
    pub financial_sic_end: u32,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            equation_tolerance: 0.001,
            rollup_tolerance: 0.001,
            residual_epsilon: 0.01,
            days_per_month: 30.4,
            default_taxonomy_year: 2023,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit_ms: 100,
            request_timeout_secs: 30,
            batch_concurrency: 4,
            financial_sic_start: 6000,
            financial_sic_end: 6999,
        }
    }
}

impl ReconConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with the `User-Agent` taken from
    /// `STATEMENTS_USER_AGENT` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(agent) = std::env::var(USER_AGENT_ENV) {
            if !agent.trim().is_empty() {
                config.user_agent = agent;
            }
        }
        config
    }

    /// Sets the statement equation tolerance.
    #[must_use]
    pub const fn with_equation_tolerance(mut self, tolerance: f64) -> Self {
        self.equation_tolerance = tolerance;
        self
    }

    /// Sets the roll-up tolerance.
    #[must_use]
    pub const fn with_rollup_tolerance(mut self, tolerance: f64) -> Self {
        self.rollup_tolerance = tolerance;
        self
    }

    /// Sets the days-per-month constant.
    #[must_use]
    pub const fn with_days_per_month(mut self, days: f64) -> Self {
        self.days_per_month = days;
        self
    }

    /// Sets the fallback taxonomy year.
    #[must_use]
    pub const fn with_default_taxonomy_year(mut self, year: u16) -> Self {
        self.default_taxonomy_year = year;
        self
    }

    /// Sets the `User-Agent`.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the minimum interval between requests.
    #[must_use]
    pub const fn with_rate_limit(mut self, interval: Duration) -> Self {
        self.rate_limit_ms = interval.as_millis() as u64;
        self
    }

    /// Sets the batch concurrency (at least 1).
    #[must_use]
    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    /// Minimum interval between requests.
    #[must_use]
    pub const fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    /// Request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// SIC codes treated as the financial sector.
    #[must_use]
    pub const fn financial_sic_range(&self) -> RangeInclusive<u32> {
        self.financial_sic_start..=self.financial_sic_end
    }

    /// Returns true if the SIC code falls in the financial sector.
    #[must_use]
    pub fn is_financial_sic(&self, sic: Option<u32>) -> bool {
        sic.is_some_and(|sic| self.financial_sic_range().contains(&sic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReconConfig::default();
        assert_eq!(config.equation_tolerance, 0.001);
        assert_eq!(config.days_per_month, 30.4);
        assert_eq!(config.default_taxonomy_year, 2023);
        assert_eq!(config.rate_limit(), Duration::from_millis(100));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_financial_sic() {
        let config = ReconConfig::default();
        assert!(config.is_financial_sic(Some(6022)));
        assert!(config.is_financial_sic(Some(6999)));
        assert!(!config.is_financial_sic(Some(3571)));
        assert!(!config.is_financial_sic(None));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: ReconConfig =
            serde_json::from_str(r#"{"days_per_month": 30.5, "batch_concurrency": 8}"#).unwrap();
        assert_eq!(config.days_per_month, 30.5);
        assert_eq!(config.batch_concurrency, 8);
        assert_eq!(config.rollup_tolerance, 0.001);
    }

    #[test]
    fn test_builders() {
        let config = ReconConfig::new()
            .with_user_agent("Acme research@acme.test")
            .with_batch_concurrency(0)
            .with_rate_limit(Duration::from_millis(250));
        assert_eq!(config.user_agent, "Acme research@acme.test");
        assert_eq!(config.batch_concurrency, 1);
        assert_eq!(config.rate_limit_ms, 250);
    }
}
