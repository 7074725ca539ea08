//! # Builder for CheckerConfig
//!
//! ```
//! use std::time::Duration;
//! use segcheck_engine::{CheckerConfig, UrlResolution};
//!
//! let config = CheckerConfig::builder()
//!     .with_timeout(Duration::from_secs(30))
//!     .with_url_resolution(UrlResolution::Rfc3986)
//!     .with_concurrency(4)
//!     .build();
//! assert_eq!(config.concurrency, 4);
//! ```

use std::time::Duration;

use crate::{CheckerConfig, resolver::UrlResolution};

/// Builder for creating CheckerConfig instances with a fluent API
#[derive(Debug, Clone, Default)]
pub struct CheckerConfigBuilder {
    config: CheckerConfig,
}

impl CheckerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overall timeout for each HTTP request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.config.follow_redirects = follow;
        self
    }

    pub fn with_url_resolution(mut self, resolution: UrlResolution) -> Self {
        self.config.url_resolution = resolution;
        self
    }

    /// Set how many segments are checked at once; values below one mean one
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency.max(1);
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    pub fn build(self) -> CheckerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sequential_without_timeouts() {
        let config = CheckerConfig::builder().build();
        assert_eq!(config.concurrency, 1);
        assert!(config.timeout.is_zero());
        assert!(config.connect_timeout.is_zero());
        assert!(config.follow_redirects);
        assert!(!config.fail_fast);
        assert_eq!(config.url_resolution, UrlResolution::Naive);
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let config = CheckerConfig::builder().with_concurrency(0).build();
        assert_eq!(config.concurrency, 1);
    }
}
