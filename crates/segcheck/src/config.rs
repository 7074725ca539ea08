use std::time::Duration;

use crate::resolver::UrlResolution;

/// Configurable options for a check run
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Overall timeout for each HTTP request, zero disables it
    pub timeout: Duration,

    /// Connection timeout, zero disables it
    pub connect_timeout: Duration,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// How playlist URIs are resolved against their parent URL
    pub url_resolution: UrlResolution,

    /// Number of segments checked at the same time
    pub concurrency: usize,

    /// Stop scheduling segments after the first one that does not pass
    pub fail_fast: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            connect_timeout: Duration::ZERO,
            follow_redirects: true,
            url_resolution: UrlResolution::default(),
            concurrency: 1,
            fail_fast: false,
        }
    }
}

impl CheckerConfig {
    pub fn builder() -> crate::builder::CheckerConfigBuilder {
        crate::builder::CheckerConfigBuilder::new()
    }
}
