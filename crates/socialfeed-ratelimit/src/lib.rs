//! # SocialFeed Rate Limit
//!
//! A single-process, best-effort fixed-window limiter keyed by client
//! identifier.
//!
//! Each key gets a window that opens on its first request and closes
//! `window` later. Up to `limit` calls are admitted inside a window; the rest
//! are rejected with the time remaining until the window closes. Expired
//! windows are replaced on access, and a background sweep started with
//! [`FixedWindowLimiter::start`] drops keys that went quiet so the map never
//! grows without bound.
//!
//! # Example
//!
//! ```ignore
//! use socialfeed_ratelimit::FixedWindowLimiter;
//!
//! let limiter = FixedWindowLimiter::new(20, Duration::from_secs(5));
//! limiter.start();
//! let (admitted, retry_after) = limiter.allow("203.0.113.7");
//! limiter.stop();
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use socialfeed_config::RateLimitConfig;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    deadline: Instant,
}

fn admit(window: &mut Window, limit: u32, now: Instant) -> (bool, Duration) {
    if window.count < limit {
        window.count += 1;
        (true, Duration::ZERO)
    } else {
        (false, window.deadline.saturating_duration_since(now))
    }
}

#[derive(Debug)]
struct Windows {
    limit: u32,
    window: Duration,
    entries: Mutex<HashMap<String, Window>>,
}

impl Windows {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn allow(&self, key: &str, now: Instant) -> (bool, Duration) {
        let mut entries = self.entries();

        let fresh = Window {
            count: 0,
            deadline: now + self.window,
        };
        if let Some(window) = entries.get_mut(key) {
            if window.deadline <= now {
                *window = fresh;
            }
            return admit(window, self.limit, now);
        }

        let mut window = fresh;
        let decision = admit(&mut window, self.limit, now);
        entries.insert(key.to_string(), window);
        decision
    }

    fn sweep(&self, now: Instant) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, window| window.deadline > now);
        before - entries.len()
    }
}

#[derive(Debug)]
pub struct FixedWindowLimiter {
    windows: Arc<Windows>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl FixedWindowLimiter {
    /// `limit` is clamped to at least one request per window.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(Windows {
                limit: limit.max(1),
                window,
                entries: Mutex::new(HashMap::new()),
            }),
            sweeper: Mutex::new(None),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_window, config.window)
    }

    pub fn limit(&self) -> u32 {
        self.windows.limit
    }

    pub fn window(&self) -> Duration {
        self.windows.window
    }

    /// Admission check for `key`.
    ///
    /// Returns whether the call is admitted and, when it is not, how long the
    /// caller should wait before the window resets.
    pub fn allow(&self, key: &str) -> (bool, Duration) {
        self.windows.allow(key, Instant::now())
    }

    /// Removes every expired window. Returns how many keys were dropped.
    pub fn sweep(&self) -> usize {
        self.windows.sweep(Instant::now())
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.windows.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawns the periodic sweep on the current tokio runtime. Calling it
    /// again while the sweep runs is a no-op.
    pub fn start(&self) {
        let mut sweeper = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        if sweeper.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let period = self.windows.window;
        let windows = Arc::downgrade(&self.windows);
        *sweeper = Some(tokio::spawn(sweep_loop(windows, period)));
        tracing::debug!(period = ?period, "rate limiter sweep started");
    }

    pub fn stop(&self) {
        let task = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
            tracing::debug!("rate limiter sweep stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for FixedWindowLimiter {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweep_loop(windows: Weak<Windows>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(windows) = windows.upgrade() else {
            break;
        };
        let dropped = windows.sweep(Instant::now());
        if dropped > 0 {
            tracing::trace!(dropped, "expired rate limit windows removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(10);

    #[tokio::test(start_paused = true)]
    async fn test_admits_up_to_limit_then_rejects() {
        let limiter = FixedWindowLimiter::new(3, WINDOW);

        for _ in 0..3 {
            assert_eq!(limiter.allow("10.0.0.1"), (true, Duration::ZERO));
        }

        let (admitted, retry_after) = limiter.allow("10.0.0.1");
        assert!(!admitted);
        assert_eq!(retry_after, WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_counts_down() {
        let limiter = FixedWindowLimiter::new(1, WINDOW);
        assert!(limiter.allow("k").0);

        tokio::time::advance(Duration::from_secs(4)).await;
        let (admitted, retry_after) = limiter.allow("k");
        assert!(!admitted);
        assert_eq!(retry_after, Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_duration() {
        let limiter = FixedWindowLimiter::new(2, WINDOW);
        assert!(limiter.allow("k").0);
        assert!(limiter.allow("k").0);
        assert!(!limiter.allow("k").0);

        tokio::time::advance(WINDOW).await;
        assert!(limiter.allow("k").0);
        assert!(limiter.allow("k").0);
        assert!(!limiter.allow("k").0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_anchored_to_first_request() {
        let limiter = FixedWindowLimiter::new(2, WINDOW);
        assert!(limiter.allow("k").0);

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(limiter.allow("k").0);
        assert!(!limiter.allow("k").0);

        // Second request does not extend the window.
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(limiter.allow("k").0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let limiter = FixedWindowLimiter::new(1, WINDOW);
        assert!(limiter.allow("a").0);
        assert!(!limiter.allow("a").0);
        assert!(limiter.allow("b").0);
        assert_eq!(limiter.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_drops_only_expired_keys() {
        let limiter = FixedWindowLimiter::new(5, WINDOW);
        limiter.allow("old");
        tokio::time::advance(Duration::from_secs(6)).await;
        limiter.allow("new");
        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(limiter.sweep(), 1);
        assert_eq!(limiter.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_cleans_up_every_key() {
        let limiter = FixedWindowLimiter::new(1, WINDOW);
        limiter.start();
        assert!(limiter.is_running());

        for i in 0..50 {
            limiter.allow(&format!("client-{i}"));
        }
        assert_eq!(limiter.len(), 50);

        tokio::time::sleep(WINDOW * 2 + Duration::from_millis(1)).await;
        assert!(limiter.is_empty());

        limiter.stop();
        assert!(!limiter.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_keeps_single_sweeper() {
        let limiter = FixedWindowLimiter::new(1, WINDOW);
        limiter.start();
        limiter.start();
        assert!(limiter.is_running());
        limiter.stop();
        limiter.stop();
        assert!(!limiter.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_never_exceed_limit() {
        let limiter = Arc::new(FixedWindowLimiter::new(10, Duration::from_secs(60)));

        let tasks: Vec<_> = (0..100)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.allow("shared").0 })
            })
            .collect();

        let mut admitted = 0;
        for task in tasks {
            if task.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }

    #[test]
    fn test_limit_clamped_to_one() {
        let limiter = FixedWindowLimiter::new(0, WINDOW);
        assert_eq!(limiter.limit(), 1);
    }

    #[test]
    fn test_from_config() {
        let config = RateLimitConfig {
            requests_per_window: 7,
            window: Duration::from_secs(3),
            ..RateLimitConfig::default()
        };
        let limiter = FixedWindowLimiter::from_config(&config);
        assert_eq!(limiter.limit(), 7);
        assert_eq!(limiter.window(), Duration::from_secs(3));
    }
}
