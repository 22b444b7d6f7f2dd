//! Pricing table and the per-call cost formula (§4.6).

use crate::core::types::UsageStats;
use serde::{Deserialize, Serialize};

/// USD price per one million tokens, by token class. Missing components
/// default to 0 via `#[serde(default)]`, matching "missing price
/// components default to 0" in §4.6.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ModelPricing {
    #[serde(default)]
    pub prompt: f64,
    #[serde(default)]
    pub cached_prompt: f64,
    #[serde(default)]
    pub completion: f64,
    #[serde(default)]
    pub reasoning: f64,
}

/// Computes cost in USD for one `UsageStats` sample under `pricing`.
///
/// ```text
/// cost = ((input - cached)/1e6)    * prompt
///      + (cached/1e6)              * cached_prompt
///      + ((output - reasoning)/1e6)* completion
///      + (reasoning/1e6)           * reasoning
/// ```
pub fn compute_cost(usage: &UsageStats, pricing: &ModelPricing) -> f64 {
    let input = usage.input_tokens as f64;
    let cached = (usage.cached_tokens as f64).min(input);
    let output = usage.output_tokens as f64;
    let reasoning = (usage.reasoning_tokens as f64).min(output);

    ((input - cached) / 1e6) * pricing.prompt
        + (cached / 1e6) * pricing.cached_prompt
        + ((output - reasoning) / 1e6) * pricing.completion
        + (reasoning / 1e6) * pricing.reasoning
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_matches_formula_exactly() {
        let usage = UsageStats { input_tokens: 1_000_000, output_tokens: 500_000, cached_tokens: 200_000, reasoning_tokens: 100_000 };
        let pricing = ModelPricing { prompt: 3.0, cached_prompt: 1.5, completion: 15.0, reasoning: 20.0 };
        let cost = compute_cost(&usage, &pricing);
        let expected = (0.8 * 3.0) + (0.2 * 1.5) + (0.4 * 15.0) + (0.1 * 20.0);
        assert!((cost - expected).abs() < 1e-9);
    }

    #[test]
    fn zeroing_a_price_component_removes_exactly_its_contribution() {
        let usage = UsageStats { input_tokens: 1_000_000, output_tokens: 1_000_000, cached_tokens: 0, reasoning_tokens: 0 };
        let full = ModelPricing { prompt: 3.0, cached_prompt: 1.5, completion: 15.0, reasoning: 20.0 };
        let no_completion = ModelPricing { completion: 0.0, ..full };
        let cost_full = compute_cost(&usage, &full);
        let cost_reduced = compute_cost(&usage, &no_completion);
        assert!((cost_full - cost_reduced - 15.0).abs() < 1e-9);
    }

    #[test]
    fn missing_pricing_defaults_to_zero_cost() {
        let usage = UsageStats::new(1000, 1000);
        let pricing = ModelPricing::default();
        assert_eq!(compute_cost(&usage, &pricing), 0.0);
    }
}
