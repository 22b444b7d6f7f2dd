//! The token-bucket + fixed-window admission limiter.
//!
//! §9 open question 4, resolved: the naive approach holds one mutex across
//! the whole acquire, including the sleep, which serializes every waiter on
//! a bucket and can livelock under high qps. Here the mutex is held only to
//! refill/read/decide; it is released before any `sleep`, and tokens are
//! re-checked from scratch after waking, so independent callers waiting on
//! the same key interleave instead of queuing behind whichever one is
//! asleep.

use super::types::{KeyConfig, KeyState, RateLimitStrategy};
use crate::core::errors::{GatewayError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-acquire-cycle sleep cap, per §4.6 ("capped at 500 ms per cycle").
const MAX_SLEEP: Duration = Duration::from_millis(500);

enum Gate {
    Proceed,
    WaitFor(Duration),
}

/// Process-wide registry of per-key bucket/window state, guarded by a
/// single mutex per §5's locking discipline (acquisition is brief; the
/// mutex is never held across I/O or sleeps).
#[derive(Default)]
pub struct RateLimiter {
    entries: Mutex<HashMap<String, KeyState>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }

    /// Lazily configures a key's bucket/window parameters. A key is
    /// configured at most once -- the first caller to specify limits for a
    /// given key wins, matching the "lazily configured on first request"
    /// lifecycle rule in §3. Subsequent calls are no-ops if the key already
    /// exists.
    pub fn configure(&self, key: &str, config: KeyConfig) {
        let mut entries = self.entries.lock();
        entries.entry(key.to_string()).or_insert_with(|| KeyState::new(config));
    }

    /// Acquires `requested` units of capacity under `key`, applying the
    /// token bucket first (if configured) and then the fixed window (if
    /// configured), per §4.6. `timeout` bounds total wall-clock time spent
    /// waiting across both phases combined.
    pub async fn acquire(
        &self,
        key: &str,
        requested: f64,
        strategy: RateLimitStrategy,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let deadline = timeout.map(|d| Instant::now() + d);

        self.run_gate(strategy, deadline, || self.bucket_gate(key, requested)).await?;
        self.run_gate(strategy, deadline, || self.window_gate(key)).await?;
        Ok(())
    }

    async fn run_gate(
        &self,
        strategy: RateLimitStrategy,
        deadline: Option<Instant>,
        decide: impl Fn() -> Gate,
    ) -> Result<()> {
        loop {
            match decide() {
                Gate::Proceed => return Ok(()),
                Gate::WaitFor(wait) => {
                    if strategy == RateLimitStrategy::Fail {
                        return Err(GatewayError::RateLimitExceeded(format!(
                            "would need to wait {wait:?}"
                        )));
                    }
                    let wait = wait.min(MAX_SLEEP);
                    if let Some(deadline) = deadline {
                        if Instant::now() + wait > deadline {
                            return Err(GatewayError::RateLimitTimeout(
                                deadline.saturating_duration_since(Instant::now()),
                            ));
                        }
                    }
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    fn bucket_gate(&self, key: &str, requested: f64) -> Gate {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let state = entries.entry(key.to_string()).or_insert_with(|| KeyState::new(KeyConfig::default()));

        if !state.config.has_bucket() {
            return Gate::Proceed;
        }
        let qps = state.config.qps.expect("has_bucket checked qps is set");
        let burst = state.config.burst.expect("has_bucket checked burst is set");

        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * qps).min(burst);
        state.last_refill = now;

        if state.tokens >= requested {
            state.tokens -= requested;
            Gate::Proceed
        } else {
            let needed = requested - state.tokens;
            let wait_secs = if qps > 0.0 { needed / qps } else { f64::INFINITY };
            Gate::WaitFor(Duration::from_secs_f64(wait_secs.min(MAX_SLEEP.as_secs_f64())))
        }
    }

    fn window_gate(&self, key: &str) -> Gate {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let state = entries.entry(key.to_string()).or_insert_with(|| KeyState::new(KeyConfig::default()));

        if !state.config.has_window() {
            return Gate::Proceed;
        }
        let limit = state.config.window_limit.expect("has_window checked window_limit is set");
        let window_seconds = state.config.window_seconds.expect("has_window checked window_seconds is set");

        if now.duration_since(state.window_start).as_secs_f64() >= window_seconds {
            state.window_count = 0;
            state.window_start = now;
        }

        if state.window_count < limit {
            state.window_count += 1;
            Gate::Proceed
        } else {
            let elapsed = now.duration_since(state.window_start).as_secs_f64();
            let remaining = (window_seconds - elapsed).max(0.0);
            Gate::WaitFor(Duration::from_secs_f64(remaining.min(MAX_SLEEP.as_secs_f64())))
        }
    }
}
