//! Fixed window rate limiter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Rate limit settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Default: true
    pub enabled: bool,
    /// Length of one window.
    ///
    /// Default: 1 minute
    pub window: Duration,
    /// Requests allowed per client per window.
    ///
    /// Default: 100
    pub max: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: Duration::from_secs(60), // 1 minute
            max: 100,
        }
    }
}

impl RateLimitConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max = max;
        self
    }
}

/// Outcome of one [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// The request is over the quota and must be rejected.
    pub limited: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// `reset_at` as whole Unix seconds, rounded up.
    pub fn reset_epoch_secs(&self) -> i64 {
        let millis = self.reset_at.timestamp_millis();
        (millis + 999).div_euclid(1000)
    }
}

/// Fixed window rate limiter keyed by client.
///
/// Each client gets a counter that resets when its window ends. The counter
/// is incremented before it is compared, so the `max + 1`th request in a
/// window is the first one limited. Cheap to clone.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use taskgrid_server::rate_limit::RateLimitConfig;
/// use taskgrid_server::rate_limit::RateLimiter;
///
/// let limiter = RateLimiter::new(RateLimitConfig::default().with_max(10));
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<RateLimiterInner>,
}

struct RateLimiterInner {
    state: Mutex<HashMap<String, Window>>,
    config: RateLimitConfig,
}

struct Window {
    count: u32,
    reset_at: Instant,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            inner: Arc::new(RateLimiterInner {
                state: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.inner.config
    }

    /// Counts one request for `key` and decides whether it is allowed.
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let config = &self.inner.config;
        let now = Instant::now();

        if !config.enabled {
            return RateLimitDecision {
                limited: false,
                remaining: config.max,
                reset_at: wall_clock(now + config.window, now),
            };
        }

        let mut state = self.inner.state.lock().await;
        let window = state.entry(key.to_string()).or_insert(Window {
            count: 0,
            reset_at: now + config.window,
        });
        if window.reset_at <= now {
            window.count = 0;
            window.reset_at = now + config.window;
        }

        window.count = window.count.saturating_add(1);
        let limited = window.count > config.max;
        let remaining = config.max.saturating_sub(window.count);

        if limited {
            log::warn!("rate limit exceeded for {}", key);
        }

        RateLimitDecision {
            limited,
            remaining,
            reset_at: wall_clock(window.reset_at, now),
        }
    }

    /// Drops windows that have ended. Returns the number removed.
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut state = self.inner.state.lock().await;
        let before = state.len();
        state.retain(|_, window| window.reset_at > now);
        before - state.len()
    }

    /// Number of clients currently tracked.
    pub async fn tracked(&self) -> usize {
        self.inner.state.lock().await.len()
    }

    /// Runs [`cleanup`](Self::cleanup) once per window until `shutdown` fires.
    pub fn spawn_cleanup(&self, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        let period = self.inner.config.window.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        let removed = limiter.cleanup().await;
                        if removed > 0 {
                            log::debug!("rate limiter dropped {} expired windows", removed);
                        }
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Converts a monotonic deadline to wall-clock time.
fn wall_clock(deadline: Instant, now: Instant) -> DateTime<Utc> {
    let ahead = deadline.saturating_duration_since(now);
    Utc::now() + chrono::Duration::from_std(ahead).unwrap_or(chrono::Duration::zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32) -> RateLimiter {
        RateLimiter::new(
            RateLimitConfig::default()
                .with_max(max)
                .with_window(Duration::from_secs(60)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_limits_after_max() {
        let limiter = limiter(3);

        for expected in [2, 1, 0] {
            let decision = limiter.check("1.2.3.4").await;
            assert!(!decision.limited);
            assert_eq!(decision.remaining, expected);
        }

        let decision = limiter.check("1.2.3.4").await;
        assert!(decision.limited);
        assert_eq!(decision.remaining, 0);

        assert!(!limiter.check("5.6.7.8").await.limited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = limiter(1);
        assert!(!limiter.check("a").await.limited);
        assert!(limiter.check("a").await.limited);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!limiter.check("a").await.limited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_expired() {
        let limiter = limiter(5);
        limiter.check("a").await;
        limiter.check("b").await;
        assert_eq!(limiter.tracked().await, 2);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(limiter.cleanup().await, 0);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(limiter.cleanup().await, 2);
    }

    #[tokio::test]
    async fn test_disabled_always_allows() {
        let limiter = RateLimiter::new(RateLimitConfig::default().with_enabled(false).with_max(1));
        for _ in 0..5 {
            let decision = limiter.check("a").await;
            assert!(!decision.limited);
            assert_eq!(decision.remaining, 1);
        }
        assert_eq!(limiter.tracked().await, 0);
    }
}
