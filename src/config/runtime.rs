//! The read-only configuration view the core consumes (§6).
//!
//! Everything here is resolved once, at process start, by [`super::loader`]
//! and handed down as `Arc<RuntimeConfig>`. The core never re-reads a file
//! or an environment variable after that point.

use crate::core::rate_limiter::RateLimitStrategy;
use crate::core::token_meter::ModelPricing;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Per-logical-model engine defaults, used when a request omits the
/// corresponding field. Mirrors the optional fields on the wire request
/// shape (§6) one-for-one.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineDefaults {
    pub max_iterations: u32,
    pub required_verifications: u32,
    pub max_errors_before_give_up: u32,
    pub num_agents: u32,
    pub parallel_agents: u32,
    pub max_iterations_per_agent: u32,
    pub required_verifications_per_agent: u32,
    pub max_errors_per_agent: u32,
    pub enable_planning: bool,
    pub enable_parallel_check: bool,
    pub strict_agent_config: bool,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            required_verifications: 3,
            max_errors_before_give_up: 3,
            num_agents: 4,
            parallel_agents: 2,
            max_iterations_per_agent: 10,
            required_verifications_per_agent: 2,
            max_errors_per_agent: 3,
            enable_planning: true,
            enable_parallel_check: false,
            strict_agent_config: false,
        }
    }
}

/// Resolution target for one logical model-id: which provider and which
/// backend-specific model string to send on the wire, plus the engine
/// defaults that apply when a request doesn't override them.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelRoute {
    pub provider: String,
    pub backend_model: String,
    #[serde(default)]
    pub engine_defaults: EngineDefaults,
}

/// Which adapter to construct for a configured provider name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

/// Everything needed to construct one provider adapter instance.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCredentials {
    pub kind: ProviderKind,
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout_seconds() -> u64 {
    120
}

impl ProviderCredentials {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// System-wide rate-limit defaults, applied to a bucket the first time it's
/// seen unless a request supplies its own `rate_limit` block (§6).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitDefaults {
    pub qps: Option<f64>,
    pub burst: Option<f64>,
    pub window_limit: Option<u64>,
    pub window_seconds: Option<f64>,
    pub timeout_seconds: Option<f64>,
    pub strategy: RateLimitStrategy,
}

impl Default for RateLimitDefaults {
    fn default() -> Self {
        Self {
            qps: Some(5.0),
            burst: Some(5.0),
            window_limit: None,
            window_seconds: None,
            timeout_seconds: Some(30.0),
            strategy: RateLimitStrategy::Wait,
        }
    }
}

impl RateLimitDefaults {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs_f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// The full read-only view. Built once by [`super::loader::load`] and
/// shared as `Arc<RuntimeConfig>` (§6's "the core never re-reads it").
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    pub bind_address: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub models: HashMap<String, ModelRoute>,
    pub providers: HashMap<String, ProviderCredentials>,
    #[serde(default)]
    pub pricing: HashMap<String, HashMap<String, ModelPricing>>,
    #[serde(default)]
    pub rate_limit_defaults: RateLimitDefaults,
    #[serde(default)]
    pub strict_accounting: bool,
    #[serde(default)]
    pub prefix_cache_enabled: bool,
}

impl RuntimeConfig {
    /// Resolves a logical model-id to its route, or a `NotFound`-class
    /// message for the caller to turn into a 404.
    pub fn resolve_model(&self, logical_model: &str) -> Option<&ModelRoute> {
        self.models.get(logical_model)
    }

    pub fn provider_credentials(&self, provider: &str) -> Option<&ProviderCredentials> {
        self.providers.get(provider)
    }

    pub fn model_pricing(&self, provider: &str, backend_model: &str) -> ModelPricing {
        self.pricing
            .get(provider)
            .and_then(|by_model| by_model.get(backend_model))
            .copied()
            .unwrap_or_default()
    }

    /// Flattened `(provider, model) -> ModelPricing` view, the shape
    /// [`crate::core::token_meter::TokenMeter::summary`] actually consumes.
    pub fn pricing_table(&self) -> HashMap<(String, String), ModelPricing> {
        let mut table = HashMap::new();
        for (provider, by_model) in &self.pricing {
            for (model, pricing) in by_model {
                table.insert((provider.clone(), model.clone()), *pricing);
            }
        }
        table
    }
}
