//! Trailing-edge debouncing on the Tokio timer

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Delay used by the multi-user search box.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Collapses bursts of calls into one trailing action.
///
/// Each [`call`](Debouncer::call) cancels the pending timer and arms a new one.
/// Once a timer fires, its action runs to completion: a later call does not
/// abort work that has already started. Dropping the debouncer cancels the
/// pending timer.
///
/// Must be used inside a Tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    /// Creates a debouncer with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Returns the configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `action` to run after the delay, replacing any pending one.
    pub fn call<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            action.await;
        });
    }

    /// Cancels the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_only_trailing_call_runs() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        for i in 0..5 {
            let fired = fired.clone();
            debouncer.call(async move {
                fired.lock().unwrap().push(i);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*fired.lock().unwrap(), vec![4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending() {
        let fired = Arc::new(Mutex::new(false));
        {
            let mut debouncer = Debouncer::default();
            let fired = fired.clone();
            debouncer.call(async move {
                *fired.lock().unwrap() = true;
            });
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!*fired.lock().unwrap());
    }
}
