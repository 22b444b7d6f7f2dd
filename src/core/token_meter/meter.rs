//! Usage aggregation by `(provider, model)` and in total.
//!
//! `TokenMeter` is created fresh per request (§3) but is the sole
//! shared-mutable state multiple concurrent UltraThink agents write into
//! within that request, so `record` must be linearizable (§5) -- `dashmap`
//! gives per-shard locking without requiring callers to hold a guard across
//! an await point.

use super::cost::{compute_cost, ModelPricing};
use crate::core::errors::{GatewayError, Result};
use crate::core::types::UsageStats;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct MeterSummary {
    pub total_usage: UsageStats,
    pub total_cost_usd: f64,
    pub by_provider: HashMap<String, HashMap<String, UsageStats>>,
}

#[derive(Default)]
pub struct TokenMeter {
    /// Keyed by `(provider, model)`.
    entries: DashMap<(String, String), UsageStats>,
    strict_accounting: bool,
}

impl TokenMeter {
    pub fn new() -> Self {
        Self { entries: DashMap::new(), strict_accounting: false }
    }

    pub fn with_strict_accounting(strict_accounting: bool) -> Self {
        Self { entries: DashMap::new(), strict_accounting }
    }

    /// Records usage from a raw JSON payload, aliasing OpenAI-legacy field
    /// names onto the canonical ones via [`UsageStats::from_json`].
    pub fn record_json(&self, provider: &str, model: &str, usage: &serde_json::Value) -> Result<()> {
        self.record(provider, model, UsageStats::from_json(usage))
    }

    pub fn record(&self, provider: &str, model: &str, usage: UsageStats) -> Result<()> {
        self.validate(&usage, provider, model)?;
        let key = (provider.to_string(), model.to_string());
        self.entries
            .entry(key)
            .and_modify(|existing| *existing += usage)
            .or_insert(usage);
        Ok(())
    }

    /// Warns (default) or raises `ValidationError` (`strict_accounting`)
    /// when `cached_tokens > input_tokens` or `reasoning_tokens >
    /// output_tokens`, per §4.6's promotion rule.
    fn validate(&self, usage: &UsageStats, provider: &str, model: &str) -> Result<()> {
        let warnings = usage.validation_warnings();
        if warnings.is_empty() {
            return Ok(());
        }
        if self.strict_accounting {
            return Err(GatewayError::Validation(format!(
                "[{provider}/{model}] {}",
                warnings.join(", ")
            )));
        }
        for warning in warnings {
            warn!(provider, model, "{warning}");
        }
        Ok(())
    }

    pub fn summary(&self, pricing: &HashMap<(String, String), ModelPricing>) -> MeterSummary {
        let mut total_usage = UsageStats::default();
        let mut total_cost_usd = 0.0;
        let mut by_provider: HashMap<String, HashMap<String, UsageStats>> = HashMap::new();

        for entry in self.entries.iter() {
            let (provider, model) = entry.key().clone();
            let usage = *entry.value();
            total_usage += usage;
            let model_pricing = pricing.get(&(provider.clone(), model.clone())).copied().unwrap_or_default();
            total_cost_usd += compute_cost(&usage, &model_pricing);
            by_provider.entry(provider).or_default().insert(model, usage);
        }

        MeterSummary { total_usage, total_cost_usd, by_provider }
    }
}
