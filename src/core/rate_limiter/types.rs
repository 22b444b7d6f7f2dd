//! Rate limiter configuration and per-key state.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// What `acquire` does when it can't get tokens immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitStrategy {
    /// Sleep and retry until tokens are available or `timeout` elapses.
    #[default]
    Wait,
    /// Raise `RateLimitExceeded` immediately.
    Fail,
}

/// Per-key configuration. Either mechanism is optional; when both are set,
/// the bucket is checked first (smoothing) and the window second (hard
/// cap), per §4.6.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyConfig {
    pub qps: Option<f64>,
    pub burst: Option<f64>,
    pub window_limit: Option<u64>,
    pub window_seconds: Option<f64>,
}

impl KeyConfig {
    pub fn has_bucket(&self) -> bool {
        self.qps.is_some() && self.burst.is_some()
    }

    pub fn has_window(&self) -> bool {
        self.window_limit.is_some() && self.window_seconds.is_some()
    }
}

#[derive(Debug, Clone)]
pub(super) struct KeyState {
    pub(super) config: KeyConfig,
    pub(super) tokens: f64,
    pub(super) last_refill: Instant,
    pub(super) window_count: u64,
    pub(super) window_start: Instant,
}

impl KeyState {
    pub(super) fn new(config: KeyConfig) -> Self {
        let now = Instant::now();
        Self {
            tokens: config.burst.unwrap_or(0.0),
            last_refill: now,
            window_count: 0,
            window_start: now,
            config,
        }
    }
}
