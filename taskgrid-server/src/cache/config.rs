//! Cache configuration

use std::time::Duration;

/// Response cache settings.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use taskgrid_server::cache::CacheConfig;
///
/// let config = CacheConfig::default().with_ttl(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether lookups and stores happen at all.
    ///
    /// Default: true
    pub enabled: bool,

    /// Lifetime of every entry.
    ///
    /// Default: 5 minutes
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(300), // 5 minutes
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// A config with caching turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}
