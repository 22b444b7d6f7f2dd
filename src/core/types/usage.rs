//! Token usage accounting.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Raw token counters returned by a provider call.
///
/// `cached_tokens` and `reasoning_tokens` are sub-counts of `input_tokens`
/// and `output_tokens` respectively, not additional tokens -- this is what
/// the cost formula in [`crate::core::token_meter::cost`] relies on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cached_tokens: u64,
    pub reasoning_tokens: u64,
}

impl UsageStats {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self { input_tokens, output_tokens, cached_tokens: 0, reasoning_tokens: 0 }
    }

    /// `cached_tokens <= input_tokens` and `reasoning_tokens <= output_tokens`
    /// are expected but not enforced here; upstreams occasionally violate
    /// them. Returns the violated invariant names, if any.
    pub fn validation_warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.cached_tokens > self.input_tokens {
            warnings.push("cached_tokens exceeds input_tokens");
        }
        if self.reasoning_tokens > self.output_tokens {
            warnings.push("reasoning_tokens exceeds output_tokens");
        }
        warnings
    }

    /// Parses usage from a raw JSON payload, aliasing the OpenAI legacy
    /// `prompt_tokens`/`completion_tokens` names onto the canonical ones and
    /// pulling the nested `*_tokens_details` sub-objects when present.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let get_u64 = |keys: &[&str]| -> u64 {
            for key in keys {
                if let Some(v) = value.get(key).and_then(|v| v.as_u64()) {
                    return v;
                }
            }
            0
        };
        let input_tokens = get_u64(&["input_tokens", "prompt_tokens"]);
        let output_tokens = get_u64(&["output_tokens", "completion_tokens"]);
        let cached_tokens = value
            .get("input_tokens_details")
            .and_then(|d| d.get("cached_tokens"))
            .and_then(|v| v.as_u64())
            .or_else(|| value.get("cached_tokens").and_then(|v| v.as_u64()))
            .unwrap_or(0);
        let reasoning_tokens = value
            .get("output_tokens_details")
            .and_then(|d| d.get("reasoning_tokens"))
            .and_then(|v| v.as_u64())
            .or_else(|| value.get("reasoning_tokens").and_then(|v| v.as_u64()))
            .unwrap_or(0);
        Self { input_tokens, output_tokens, cached_tokens, reasoning_tokens }
    }
}

impl AddAssign for UsageStats {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
        self.cached_tokens += rhs.cached_tokens;
        self.reasoning_tokens += rhs.reasoning_tokens;
    }
}
