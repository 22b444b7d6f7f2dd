//! `/reasoning/deepthink` and `/reasoning/ultrathink` (§6).
//!
//! Both handlers follow the same shape: resolve the logical model-id,
//! fetch or lazily construct the provider, configure the rate-limiter
//! bucket for this request's key, build a fresh `TokenMeter`/`PrefixCache`
//! scope, run the engine, and serialize `{result, usage, cost_usd,
//! detailed_usage}`.

use crate::core::engines::deepthink::{DeepThink, DeepThinkParams};
use crate::core::engines::ultrathink::{UltraThink, UltraThinkParams};
use crate::core::errors::{GatewayError, Result};
use crate::core::prefix_cache::PrefixCache;
use crate::core::providers::Provider;
use crate::core::rate_limiter::{bucket_key, KeyConfig, RateLimitStrategy, RateLimiter};
use crate::core::token_meter::TokenMeter;
use crate::core::types::{EngineResult, Message};
use crate::server::state::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// `rate_limit` override block (§6). Any field left unset falls back to
/// `RuntimeConfig::rate_limit_defaults`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RateLimitOverride {
    pub qps: Option<f64>,
    pub burst: Option<f64>,
    pub window_limit: Option<u64>,
    pub window_seconds: Option<f64>,
    pub timeout: Option<f64>,
    pub strategy: Option<RateLimitStrategy>,
    pub bucket_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeepThinkRequest {
    pub model: String,
    pub problem: Value,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub knowledge_context: Option<String>,
    #[serde(default)]
    pub max_iterations: Option<u32>,
    #[serde(default)]
    pub required_verifications: Option<u32>,
    #[serde(default)]
    pub enable_parallel_check: Option<bool>,
    #[serde(default)]
    pub llm_params: Option<Value>,
    #[serde(default)]
    pub rate_limit: Option<RateLimitOverride>,
}

#[derive(Debug, Deserialize)]
pub struct UltraThinkRequest {
    pub model: String,
    pub problem: Value,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub knowledge_context: Option<String>,
    #[serde(default)]
    pub num_agents: Option<u32>,
    #[serde(default)]
    pub parallel_agents: Option<u32>,
    /// Per-agent iteration cap (§6 notes this reuses the field name from
    /// the DeepThink body, scoped per-agent in this endpoint).
    #[serde(default)]
    pub max_iterations: Option<u32>,
    #[serde(default)]
    pub required_verifications: Option<u32>,
    #[serde(default)]
    pub enable_planning: Option<bool>,
    #[serde(default)]
    pub enable_parallel_check: Option<bool>,
    #[serde(default)]
    pub llm_params: Option<Value>,
    #[serde(default)]
    pub rate_limit: Option<RateLimitOverride>,
}

#[derive(Debug, Serialize)]
pub struct ReasoningResponse {
    pub result: EngineResult,
    pub usage: crate::core::types::UsageStats,
    pub cost_usd: f64,
    pub detailed_usage: HashMap<String, HashMap<String, crate::core::types::UsageStats>>,
}

/// Renders `problem` (string or structured, §3) down to the plain text the
/// engines operate on.
fn problem_text(problem: &Value) -> String {
    match problem {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

struct Resolved {
    provider: Arc<dyn Provider>,
    backend_model: String,
}

fn resolve(state: &AppState, logical_model: &str) -> Result<Resolved> {
    let route = state
        .runtime_config
        .resolve_model(logical_model)
        .ok_or_else(|| GatewayError::NotFound(format!("unknown model: {logical_model}")))?;
    let provider = state
        .registry
        .get(&route.provider)
        .ok_or_else(|| GatewayError::Config(format!("provider '{}' is not registered", route.provider)))?;
    Ok(Resolved { provider, backend_model: route.backend_model.clone() })
}

/// Configures the rate limiter for this request's key (lazily, per §3 --
/// a no-op if the key was already configured by an earlier request) and
/// returns the key plus the per-acquire strategy/timeout to use.
fn configure_rate_limit(
    limiter: &RateLimiter,
    provider_name: &str,
    backend_model: &str,
    defaults: &crate::config::RateLimitDefaults,
    override_: Option<&RateLimitOverride>,
) -> (String, RateLimitStrategy, Option<Duration>) {
    let key = override_
        .and_then(|o| o.bucket_key.clone())
        .unwrap_or_else(|| bucket_key(provider_name, backend_model, None));

    let config = KeyConfig {
        qps: override_.and_then(|o| o.qps).or(defaults.qps),
        burst: override_.and_then(|o| o.burst).or(defaults.burst),
        window_limit: override_.and_then(|o| o.window_limit).or(defaults.window_limit),
        window_seconds: override_.and_then(|o| o.window_seconds).or(defaults.window_seconds),
    };
    limiter.configure(&key, config);

    let strategy = override_.and_then(|o| o.strategy).unwrap_or(defaults.strategy);
    let timeout = override_
        .and_then(|o| o.timeout)
        .map(Duration::from_secs_f64)
        .or_else(|| defaults.timeout());

    (key, strategy, timeout)
}

pub async fn deepthink(
    state: web::Data<AppState>,
    body: web::Json<DeepThinkRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let resolved = resolve(&state, &body.model)?;
    let route = state.runtime_config.resolve_model(&body.model).expect("checked in resolve");
    let defaults = &route.engine_defaults;

    let (bucket_key, strategy, timeout) = configure_rate_limit(
        &state.rate_limiter,
        resolved.provider.name(),
        &resolved.backend_model,
        &state.runtime_config.rate_limit_defaults,
        body.rate_limit.as_ref(),
    );

    let token_meter = Arc::new(TokenMeter::with_strict_accounting(state.runtime_config.strict_accounting));
    let prefix_cache: PrefixCache = state.prefix_cache.clone();

    let engine = DeepThink::new(
        DeepThinkParams {
            provider: resolved.provider,
            model: resolved.backend_model,
            problem: problem_text(&body.problem),
            history: body.history,
            knowledge: body.knowledge_context,
            max_iterations: body.max_iterations.unwrap_or(defaults.max_iterations),
            required_successful_verifications: body
                .required_verifications
                .unwrap_or(defaults.required_verifications),
            max_errors_before_give_up: defaults.max_errors_before_give_up,
            enable_parallel_check: body.enable_parallel_check.unwrap_or(defaults.enable_parallel_check),
            model_stages: HashMap::new(),
            llm_params: body.llm_params.unwrap_or_else(|| serde_json::json!({})),
            bucket_key,
            rate_limit_timeout: timeout,
            rate_limit_strategy: strategy,
        },
        token_meter.clone(),
        prefix_cache,
        state.rate_limiter.clone(),
    );

    let result = engine.run().await?;
    let summary = token_meter.summary(&state.runtime_config.pricing_table());
    Ok(HttpResponse::Ok().json(ReasoningResponse {
        result: EngineResult::DeepThink(result),
        usage: summary.total_usage,
        cost_usd: summary.total_cost_usd,
        detailed_usage: summary.by_provider,
    }))
}

pub async fn ultrathink(
    state: web::Data<AppState>,
    body: web::Json<UltraThinkRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let resolved = resolve(&state, &body.model)?;
    let route = state.runtime_config.resolve_model(&body.model).expect("checked in resolve");
    let defaults = &route.engine_defaults;

    let (bucket_key, strategy, timeout) = configure_rate_limit(
        &state.rate_limiter,
        resolved.provider.name(),
        &resolved.backend_model,
        &state.runtime_config.rate_limit_defaults,
        body.rate_limit.as_ref(),
    );

    let token_meter = Arc::new(TokenMeter::with_strict_accounting(state.runtime_config.strict_accounting));
    let prefix_cache: PrefixCache = state.prefix_cache.clone();

    let engine = UltraThink::new(
        UltraThinkParams {
            provider: resolved.provider,
            model: resolved.backend_model,
            problem: problem_text(&body.problem),
            history: body.history,
            knowledge: body.knowledge_context,
            num_agents: body.num_agents.unwrap_or(defaults.num_agents),
            max_iterations_per_agent: body.max_iterations.unwrap_or(defaults.max_iterations_per_agent),
            required_verifications_per_agent: body
                .required_verifications
                .unwrap_or(defaults.required_verifications_per_agent),
            max_errors_per_agent: defaults.max_errors_per_agent,
            parallel_agents: body.parallel_agents.unwrap_or(defaults.parallel_agents),
            enable_parallel_check: body.enable_parallel_check.unwrap_or(defaults.enable_parallel_check),
            enable_planning: body.enable_planning.unwrap_or(defaults.enable_planning),
            strict_agent_config: defaults.strict_agent_config,
            llm_params: body.llm_params.unwrap_or_else(|| serde_json::json!({})),
            bucket_key,
            rate_limit_timeout: timeout,
            rate_limit_strategy: strategy,
        },
        token_meter.clone(),
        prefix_cache,
        state.rate_limiter.clone(),
    );

    let result = engine.run().await?;
    let summary = token_meter.summary(&state.runtime_config.pricing_table());
    Ok(HttpResponse::Ok().json(ReasoningResponse {
        result: EngineResult::UltraThink(result),
        usage: summary.total_usage,
        cost_usd: summary.total_cost_usd,
        detailed_usage: summary.by_provider,
    }))
}
