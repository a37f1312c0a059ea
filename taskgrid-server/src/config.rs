//! Server configuration from the environment

use std::env;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;

use crate::cache::CacheConfig;
use crate::rate_limit::RateLimitConfig;

/// CORS response settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Origin`.
    pub origin: String,
    /// Whether to send `Access-Control-Allow-Credentials: true`.
    pub credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: "*".to_string(),
            credentials: false,
        }
    }
}

/// Everything the server needs to start.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use taskgrid_server::config::ServerConfig;
///
/// let config = ServerConfig::default()
///     .with_port(0)
///     .with_rate_limit(10, Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub cors: CorsConfig,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub log_level: LevelFilter,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3001,
            cors: CorsConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            log_level: LevelFilter::Info,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from environment variables, falling back to
    /// the defaults for anything unset or unparsable.
    ///
    /// | variable | default |
    /// |----------|---------|
    /// | `HOST` | `127.0.0.1` |
    /// | `PORT` | `3001` |
    /// | `CORS_ORIGIN` | `*` |
    /// | `CORS_CREDENTIALS` | `false` |
    /// | `CACHE_ENABLED` | `true` |
    /// | `CACHE_TTL` (seconds) | `300` |
    /// | `RATE_LIMIT_ENABLED` | `true` |
    /// | `RATE_LIMIT_WINDOW_MS` | `60000` |
    /// | `RATE_LIMIT_MAX` | `100` |
    /// | `LOG_LEVEL` | `info` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).map(|v| v.trim().to_string());

        fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> T {
            match value {
                Some(raw) => raw.parse().unwrap_or_else(|_| {
                    log::warn!("ignoring invalid {}={:?}", key, raw);
                    default
                }),
                None => default,
            }
        }

        let cache = CacheConfig::default()
            .with_enabled(parse_or(
                "CACHE_ENABLED",
                parsed("CACHE_ENABLED"),
                defaults.cache.enabled,
            ))
            .with_ttl(Duration::from_secs(parse_or(
                "CACHE_TTL",
                parsed("CACHE_TTL"),
                defaults.cache.ttl.as_secs(),
            )));

        let rate_limit = RateLimitConfig::default()
            .with_enabled(parse_or(
                "RATE_LIMIT_ENABLED",
                parsed("RATE_LIMIT_ENABLED"),
                defaults.rate_limit.enabled,
            ))
            .with_window(Duration::from_millis(parse_or(
                "RATE_LIMIT_WINDOW_MS",
                parsed("RATE_LIMIT_WINDOW_MS"),
                defaults.rate_limit.window.as_millis() as u64,
            )))
            .with_max(parse_or(
                "RATE_LIMIT_MAX",
                parsed("RATE_LIMIT_MAX"),
                defaults.rate_limit.max,
            ));

        Self {
            host: parse_or("HOST", parsed("HOST"), defaults.host),
            port: parse_or("PORT", parsed("PORT"), defaults.port),
            cors: CorsConfig {
                origin: parsed("CORS_ORIGIN").unwrap_or(defaults.cors.origin),
                credentials: parse_or(
                    "CORS_CREDENTIALS",
                    parsed("CORS_CREDENTIALS"),
                    defaults.cors.credentials,
                ),
            },
            cache,
            rate_limit,
            log_level: parse_or("LOG_LEVEL", parsed("LOG_LEVEL"), defaults.log_level),
        }
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Enables rate limiting with `max` requests per `window`.
    pub fn with_rate_limit(mut self, max: u32, window: Duration) -> Self {
        self.rate_limit = RateLimitConfig::default()
            .with_max(max)
            .with_window(window);
        self
    }

    pub fn without_rate_limit(mut self) -> Self {
        self.rate_limit = self.rate_limit.with_enabled(false);
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_map(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]);
        assert_eq!(config.port, 3001);
        assert_eq!(config.cors.origin, "*");
        assert!(!config.cors.credentials);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl, Duration::from_secs(300));
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.window, Duration::from_millis(60_000));
        assert_eq!(config.rate_limit.max, 100);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("PORT", "8080"),
            ("CORS_ORIGIN", "http://localhost:5173"),
            ("CORS_CREDENTIALS", "true"),
            ("CACHE_ENABLED", "false"),
            ("CACHE_TTL", "10"),
            ("RATE_LIMIT_WINDOW_MS", "1000"),
            ("RATE_LIMIT_MAX", "5"),
            ("LOG_LEVEL", "debug"),
        ]);
        assert_eq!(config.addr().port(), 8080);
        assert_eq!(config.cors.origin, "http://localhost:5173");
        assert!(config.cors.credentials);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl, Duration::from_secs(10));
        assert_eq!(config.rate_limit.window, Duration::from_secs(1));
        assert_eq!(config.rate_limit.max, 5);
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_map(&[("PORT", "abc"), ("CACHE_TTL", "-1")]);
        assert_eq!(config.port, 3001);
        assert_eq!(config.cache.ttl, Duration::from_secs(300));
    }
}
