//! The multi-agent exploration engine (§4.4): plan, fan out DeepThink
//! agents under a bounded semaphore, synthesize, summarize.

use super::agent_config::{parse_agent_configs, AgentConfig};
use crate::core::engines::deepthink::{DeepThink, DeepThinkParams};
use crate::core::engines::{prompts, EventLevel, EventSink, Stage, TracingSink};
use crate::core::errors::{GatewayError, Result};
use crate::core::prefix_cache::PrefixCache;
use crate::core::providers::{ChatParams, Extras, Provider};
use crate::core::rate_limiter::{RateLimitStrategy, RateLimiter};
use crate::core::token_meter::TokenMeter;
use crate::core::types::{
    AgentResult, Message, ProviderCallResult, UltraThinkMode, UltraThinkResult,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub struct UltraThinkParams {
    pub provider: Arc<dyn Provider>,
    pub model: String,
    pub problem: String,
    pub history: Vec<Message>,
    pub knowledge: Option<String>,
    pub num_agents: u32,
    pub max_iterations_per_agent: u32,
    pub required_verifications_per_agent: u32,
    pub max_errors_per_agent: u32,
    pub parallel_agents: u32,
    pub enable_parallel_check: bool,
    pub enable_planning: bool,
    pub strict_agent_config: bool,
    pub llm_params: Value,
    pub bucket_key: String,
    pub rate_limit_timeout: Option<Duration>,
    pub rate_limit_strategy: RateLimitStrategy,
}

pub struct UltraThink {
    params: UltraThinkParams,
    token_meter: Arc<TokenMeter>,
    prefix_cache: PrefixCache,
    rate_limiter: Arc<RateLimiter>,
    sink: Arc<dyn EventSink>,
}

impl UltraThink {
    pub fn new(
        params: UltraThinkParams,
        token_meter: Arc<TokenMeter>,
        prefix_cache: PrefixCache,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self { params, token_meter, prefix_cache, rate_limiter, sink: Arc::new(TracingSink) }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
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

    async fn call(&self, model: &str, messages: &[Message], stage: Stage) -> Result<ProviderCallResult> {
        self.emit(EventLevel::Debug, "ultrathink.stage", json!({"stage": stage.as_str()}));
        self.acquire_rate_limit().await?;
        let temperature = self.params.llm_params.get("temperature").and_then(Value::as_f64);
        let max_tokens =
            self.params.llm_params.get("max_tokens").and_then(Value::as_u64).map(|v| v as u32);
        let result = self
            .params
            .provider
            .chat(model, messages, ChatParams { temperature, max_tokens, extras: Extras::default() })
            .await?;
        self.token_meter.record(self.params.provider.name(), model, result.usage)?;
        Ok(result)
    }

    /// Runs the plan/agent-config/fan-out/synthesis/summary algorithm
    /// (§4.4). `enable_planning = false` skips step 1 entirely, a real
    /// behavioral switch rather than a no-op flag (§9 open question 3).
    pub async fn run(&self) -> Result<UltraThinkResult> {
        let plan = if self.params.enable_planning {
            let messages =
                vec![Message::system(prompts::ULTRA_THINK_PLAN), Message::user(self.params.problem.clone())];
            self.call(&self.params.model, &messages, Stage::Planning).await?.content
        } else {
            String::new()
        };

        let config_system = if plan.is_empty() {
            prompts::ULTRA_THINK_AGENT_CONFIG.to_string()
        } else {
            format!("{}\n\nPlan:\n{plan}", prompts::ULTRA_THINK_AGENT_CONFIG)
        };
        let config_messages = vec![
            Message::system(config_system),
            Message::user(format!(
                "Problem:\n{}\n\nGenerate {} agent configurations.",
                self.params.problem, self.params.num_agents
            )),
        ];
        let config_reply = self.call(&self.params.model, &config_messages, Stage::Planning).await?.content;
        let agent_configs = parse_agent_configs(
            &config_reply,
            self.params.num_agents,
            self.params.strict_agent_config,
            self.sink.as_ref(),
        )?;

        let knowledge_for_agents = if plan.is_empty() {
            self.params.knowledge.clone()
        } else {
            Some(match &self.params.knowledge {
                Some(existing) => format!("{existing}\n\nPlan:\n{plan}"),
                None => format!("Plan:\n{plan}"),
            })
        };

        let agent_results = self.run_agents(&agent_configs, knowledge_for_agents).await?;

        let synthesis_prompt = agent_results
            .iter()
            .map(|r| format!("Agent {}:\n{}", r.agent_id, r.result.final_solution))
            .collect::<Vec<_>>()
            .join("\n\n");
        let synthesis_messages = vec![
            Message::system(prompts::ULTRA_THINK_SYNTHESIS),
            Message::user(format!("Problem:\n{}\n\n{synthesis_prompt}", self.params.problem)),
        ];
        let synthesis =
            self.call(&self.params.model, &synthesis_messages, Stage::Synthesis).await?.content;

        let summary_messages =
            vec![Message::system(crate::core::engines::prompts::DEEP_THINK_SUMMARY), Message::user(synthesis.clone())];
        let summary = self.call(&self.params.model, &summary_messages, Stage::Summary).await?.content;

        Ok(UltraThinkResult {
            mode: UltraThinkMode::UltraThink,
            plan,
            num_agents: agent_configs.len() as u32,
            agent_results,
            synthesis,
            summary,
        })
    }

    /// Spawns one `DeepThink` per config under a semaphore sized
    /// `max(1, parallel_agents)`. Propagates the first failure encountered
    /// while walking results in configuration order, aborting any
    /// still-running agents (§4.4, §9 open question 2: first-failure-aborts
    /// is the implemented default).
    async fn run_agents(
        &self,
        agent_configs: &[AgentConfig],
        knowledge: Option<String>,
    ) -> Result<Vec<AgentResult>> {
        let semaphore = Arc::new(Semaphore::new(self.params.parallel_agents.max(1) as usize));
        let mut handles = Vec::with_capacity(agent_configs.len());

        for config in agent_configs {
            let semaphore = semaphore.clone();
            let provider = self.params.provider.clone();
            let model = config.model.clone().unwrap_or_else(|| self.params.model.clone());
            let problem = prompts::agent_guided_problem(&self.params.problem, &config.specific_prompt);
            let history = self.params.history.clone();
            let knowledge = knowledge.clone();
            let llm_params = config.llm_params.clone().unwrap_or_else(|| self.params.llm_params.clone());
            let throttle = config
                .qps
                .filter(|qps| *qps > 0.0)
                .map(|qps| Duration::from_secs_f64(1.0 / qps))
                .or_else(|| config.throttle_seconds.map(Duration::from_secs_f64));
            let bucket_key = self.params.bucket_key.clone();
            let token_meter = self.token_meter.clone();
            let prefix_cache = self.prefix_cache.clone();
            let rate_limiter = self.rate_limiter.clone();
            let sink = self.sink.clone();
            let agent_id = config.agent_id.clone();
            let max_iterations = self.params.max_iterations_per_agent;
            let required_successful_verifications = self.params.required_verifications_per_agent;
            let max_errors_before_give_up = self.params.max_errors_per_agent;
            let enable_parallel_check = self.params.enable_parallel_check;
            let rate_limit_timeout = self.params.rate_limit_timeout;
            let rate_limit_strategy = self.params.rate_limit_strategy;

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
                if let Some(throttle) = throttle {
                    tokio::time::sleep(throttle).await;
                }
                let agent = DeepThink::new(
                    DeepThinkParams {
                        provider,
                        model,
                        problem,
                        history,
                        knowledge,
                        max_iterations,
                        required_successful_verifications,
                        max_errors_before_give_up,
                        enable_parallel_check,
                        model_stages: HashMap::new(),
                        llm_params,
                        bucket_key,
                        rate_limit_timeout,
                        rate_limit_strategy,
                    },
                    token_meter,
                    prefix_cache,
                    rate_limiter,
                )
                .with_sink(sink);
                (agent_id, agent.run().await)
            });
            handles.push(Some(handle));
        }

        let mut agent_results = Vec::with_capacity(handles.len());
        for i in 0..handles.len() {
            let handle = handles[i].take().expect("each handle is awaited exactly once");
            match handle.await {
                Ok((agent_id, Ok(result))) => agent_results.push(AgentResult { agent_id, result }),
                Ok((_agent_id, Err(err))) => {
                    abort_remaining(&handles[i + 1..]);
                    return Err(err);
                }
                Err(join_err) => {
                    abort_remaining(&handles[i + 1..]);
                    return Err(GatewayError::Server(format!("agent task panicked: {join_err}")));
                }
            }
        }
        Ok(agent_results)
    }
}

fn abort_remaining(handles: &[Option<tokio::task::JoinHandle<(String, Result<crate::core::types::DeepThinkResult>)>>]) {
    for handle in handles.iter().flatten() {
        handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engines::RecordingSink;
    use crate::core::providers::capabilities::ProviderCapabilities;
    use crate::core::providers::error::ProviderError;
    use crate::core::types::{StreamChunk, UsageStats};
    use async_trait::async_trait;
    use futures::stream::BoxStream;

    /// Routes on message content rather than call order, since two agents
    /// under `parallel_agents=2` genuinely race against the same provider.
    struct RoutingProvider;

    #[async_trait]
    impl Provider for RoutingProvider {
        fn name(&self) -> &str {
            "stub"
        }
        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities::NONE
        }
        async fn chat(
            &self,
            _model: &str,
            messages: &[Message],
            _params: ChatParams,
        ) -> std::result::Result<ProviderCallResult, ProviderError> {
            let text = messages.iter().map(|m| m.content.as_text()).collect::<Vec<_>>().join("\n");
            let reply = if text.contains("agent configurations") {
                r#"[{"agentId":"a1","specificPrompt":"Use A"},{"agentId":"a2","specificPrompt":"Use B"}]"#
            } else if text.contains("Candidate solution:\nsolution A")
                || text.contains("Candidate solution:\nsolution B")
            {
                r#"{"verdict":"pass"}"#
            } else if text.contains("Guidance for this attempt: Use A") {
                "solution A"
            } else if text.contains("Guidance for this attempt: Use B") {
                "solution B"
            } else if text.contains("Agent a1:") {
                "Merged"
            } else if text.contains("solution A") {
                "summary A"
            } else if text.contains("solution B") {
                "summary B"
            } else if text.contains("Merged") {
                "Final: Merged"
            } else {
                panic!("unrouted prompt in test stub: {text}")
            };
            Ok(ProviderCallResult::text(reply, UsageStats::new(10, 5)))
        }
        async fn chat_stream(
            &self,
            _model: &str,
            _messages: &[Message],
            _params: ChatParams,
        ) -> std::result::Result<BoxStream<'static, std::result::Result<StreamChunk, ProviderError>>, ProviderError>
        {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn fans_out_to_two_agents_and_synthesizes_in_configuration_order() {
        let provider: Arc<dyn Provider> = Arc::new(RoutingProvider);

        let rate_limiter = Arc::new(RateLimiter::new());
        let engine = UltraThink::new(
            UltraThinkParams {
                provider,
                model: "m".to_string(),
                problem: "2+2".to_string(),
                history: Vec::new(),
                knowledge: None,
                num_agents: 2,
                max_iterations_per_agent: 5,
                required_verifications_per_agent: 1,
                max_errors_per_agent: 3,
                parallel_agents: 2,
                enable_parallel_check: false,
                enable_planning: false,
                strict_agent_config: false,
                llm_params: json!({}),
                bucket_key: "stub:m".to_string(),
                rate_limit_timeout: None,
                rate_limit_strategy: RateLimitStrategy::Wait,
            },
            Arc::new(TokenMeter::new()),
            PrefixCache::disabled(),
            rate_limiter,
        )
        .with_sink(Arc::new(RecordingSink::new()));

        let result = engine.run().await.unwrap();
        assert_eq!(result.agent_results.len(), 2);
        assert_eq!(result.agent_results[0].agent_id, "a1");
        assert_eq!(result.agent_results[1].agent_id, "a2");
        assert_eq!(result.synthesis, "Merged");
        assert_eq!(result.summary, "Final: Merged");
    }
}
