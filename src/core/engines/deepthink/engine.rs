//! The single-agent iterative reasoning engine (§4.2): propose, verify,
//! correct, summarize.

use crate::core::engines::{prompts, EventLevel, EventSink, Stage, TracingSink};
use crate::core::errors::{GatewayError, Result};
use crate::core::prefix_cache::{KeyInput, PrefixCache};
use crate::core::providers::{ChatParams, Extras, Provider, ResponseParams};
use crate::core::rate_limiter::{RateLimitStrategy, RateLimiter};
use crate::core::token_meter::TokenMeter;
use crate::core::types::{
    DeepThinkMode, DeepThinkResult, Message, ProviderCallResult, VerificationRecord,
};
use crate::core::verifier::{VerifyOutcome, Verifier};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Everything `DeepThink::new` needs that is specific to one run. The
/// shared infrastructure (token meter, prefix cache, rate limiter) is
/// passed separately since UltraThink reuses the same instances across
/// several concurrently-running `DeepThink`s.
pub struct DeepThinkParams {
    pub provider: Arc<dyn Provider>,
    pub model: String,
    pub problem: String,
    pub history: Vec<Message>,
    pub knowledge: Option<String>,
    pub max_iterations: u32,
    pub required_successful_verifications: u32,
    pub max_errors_before_give_up: u32,
    pub enable_parallel_check: bool,
    pub model_stages: HashMap<Stage, String>,
    pub llm_params: Value,
    pub bucket_key: String,
    pub rate_limit_timeout: Option<Duration>,
    pub rate_limit_strategy: RateLimitStrategy,
}

pub struct DeepThink {
    params: DeepThinkParams,
    token_meter: Arc<TokenMeter>,
    prefix_cache: PrefixCache,
    rate_limiter: Arc<RateLimiter>,
    verifier: Verifier,
    sink: Arc<dyn EventSink>,
}

impl DeepThink {
    pub fn new(
        params: DeepThinkParams,
        token_meter: Arc<TokenMeter>,
        prefix_cache: PrefixCache,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            params,
            token_meter,
            prefix_cache,
            rate_limiter,
            verifier: Verifier::default(),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_verifier(mut self, verifier: Verifier) -> Self {
        self.verifier = verifier;
        self
    }

    fn stage_model(&self, stage: Stage) -> &str {
        self.params.model_stages.get(&stage).map(String::as_str).unwrap_or(&self.params.model)
    }

    fn emit(&self, level: EventLevel, event: &str, payload: Value) {
        self.sink.emit(level, event, payload);
    }

    async fn acquire_rate_limit(&self) -> Result<()> {
        self.rate_limiter
            .acquire(
                &self.params.bucket_key,
                1.0,
                self.params.rate_limit_strategy,
                self.params.rate_limit_timeout,
            )
            .await
    }

    /// Runs the full propose/verify/correct/summarize algorithm (§4.2).
    pub async fn run(&self) -> Result<DeepThinkResult> {
        let provider_name = self.params.provider.name().to_string();
        let system_text = match &self.params.knowledge {
            Some(knowledge) => format!("{}\n\n{knowledge}", prompts::DEEP_THINK_INITIAL),
            None => prompts::DEEP_THINK_INITIAL.to_string(),
        };

        let mut messages = vec![Message::system(system_text.clone())];
        messages.extend(self.params.history.clone());
        messages.push(Message::user(self.params.problem.clone()));

        let initial_model = self.stage_model(Stage::Initial).to_string();
        let history_json = serde_json::to_value(&self.params.history)?;
        let key = self.prefix_cache.compute_key(&KeyInput {
            provider: &provider_name,
            model: &initial_model,
            system: &system_text,
            knowledge: self.params.knowledge.as_deref(),
            history: &history_json,
            params: &self.params.llm_params,
        })?;
        let previous_response_id = self.prefix_cache.get(&key).await;
        let carried_previous_id = previous_response_id.is_some();

        self.emit(EventLevel::Debug, "deepthink.stage", json!({"stage": Stage::Initial.as_str()}));
        self.acquire_rate_limit().await?;
        let initial = match self
            .call(&initial_model, &messages, true, previous_response_id)
            .await
        {
            Ok(result) => result,
            Err(err) => {
                if carried_previous_id && err.is_non_retriable_provider_error() {
                    self.prefix_cache.evict(&key).await;
                }
                return Err(err);
            }
        };
        if let Some(response_id) = &initial.response_id {
            self.prefix_cache.set(&key, response_id.clone()).await;
        }

        let mut candidate = initial.content;
        let mut iterations = 1u32;
        let mut verification_logs = Vec::new();

        let verification_model = self.stage_model(Stage::Verification).to_string();
        let outcome = self.verify_candidate(&verification_model, &candidate).await?;
        let mut successes = if outcome.record.passes_with_arith_gate() { 1 } else { 0 };
        let mut errors = if outcome.record.passes_with_arith_gate() { 0 } else { 1 };
        verification_logs.push(outcome.record);

        while iterations < self.params.max_iterations
            && successes < self.params.required_successful_verifications
            && errors < self.params.max_errors_before_give_up
        {
            let feedback = format_feedback(verification_logs.last().expect("at least one verification recorded"));
            let correction_model = self.stage_model(Stage::Correction).to_string();
            let correction_messages = vec![
                Message::system(prompts::DEEP_THINK_CORRECT),
                Message::user(prompts::correction_user_message(&self.params.problem, &candidate, &feedback)),
            ];

            self.emit(EventLevel::Debug, "deepthink.stage", json!({"stage": Stage::Correction.as_str()}));
            self.acquire_rate_limit().await?;
            let correction = self.call(&correction_model, &correction_messages, false, None).await?;
            candidate = correction.content;
            iterations += 1;

            let outcome = self.verify_candidate(&verification_model, &candidate).await?;
            if outcome.record.passes_with_arith_gate() {
                successes += 1;
                errors = 0;
            } else {
                errors += 1;
            }
            verification_logs.push(outcome.record);
        }

        let summary_model = self.stage_model(Stage::Summary).to_string();
        let summary_messages =
            vec![Message::system(prompts::DEEP_THINK_SUMMARY), Message::user(candidate.clone())];
        self.emit(EventLevel::Debug, "deepthink.stage", json!({"stage": Stage::Summary.as_str()}));
        self.acquire_rate_limit().await?;
        let summary = self.call(&summary_model, &summary_messages, false, None).await?;

        Ok(DeepThinkResult {
            mode: DeepThinkMode::DeepThink,
            iterations,
            successful_verifications: successes,
            verification_logs,
            final_solution: candidate,
            summary: summary.content,
        })
    }

    async fn call(
        &self,
        model: &str,
        messages: &[Message],
        store: bool,
        previous_response_id: Option<String>,
    ) -> Result<ProviderCallResult> {
        let provider = &self.params.provider;
        let temperature = self.params.llm_params.get("temperature").and_then(Value::as_f64);
        let max_tokens =
            self.params.llm_params.get("max_tokens").and_then(Value::as_u64).map(|v| v as u32);

        let result = if provider.capabilities().supports_responses {
            provider
                .response(
                    model,
                    messages,
                    ResponseParams {
                        temperature,
                        max_output_tokens: max_tokens,
                        previous_response_id,
                        store: Some(store),
                        response_format: None,
                        extras: Extras::default(),
                    },
                )
                .await?
        } else {
            provider
                .chat(model, messages, ChatParams { temperature, max_tokens, extras: Extras::default() })
                .await?
        };

        self.token_meter.record(provider.name(), model, result.usage)?;
        Ok(result)
    }

    async fn verify_candidate(&self, model: &str, candidate: &str) -> Result<VerifyOutcome> {
        self.emit(EventLevel::Debug, "deepthink.stage", json!({"stage": Stage::Verification.as_str()}));
        self.acquire_rate_limit().await?;
        let outcome = self
            .verifier
            .verify(
                &self.params.provider,
                model,
                &self.params.problem,
                candidate,
                &self.params.llm_params,
                self.params.enable_parallel_check,
            )
            .await?;
        self.token_meter.record(self.params.provider.name(), model, outcome.usage)?;
        Ok(outcome)
    }
}

fn format_feedback(record: &VerificationRecord) -> String {
    let mut parts = Vec::new();
    if let Some(issues) = &record.issues {
        if !issues.is_empty() {
            parts.push(format!("Issues: {}", issues.join("; ")));
        }
    }
    if let Some(reasons) = &record.reasons {
        if !reasons.is_empty() {
            parts.push(format!("Reasons: {}", reasons.join("; ")));
        }
    }
    if let Some(error) = &record.error {
        parts.push(format!("Error: {error}"));
    }
    if parts.is_empty() {
        "No specific feedback was provided.".to_string()
    } else {
        parts.join("\n")
    }
}
