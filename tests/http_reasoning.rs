//! End-to-end HTTP tests against a stub [`Provider`], exercising the wire
//! shapes from §6 without making any real network call.

use actix_web::{test, web, App};
use async_trait::async_trait;
use futures::stream::BoxStream;
use reasoning_gateway::config::{EngineDefaults, ModelRoute, ProviderCredentials, ProviderKind, RuntimeConfig};
use reasoning_gateway::core::prefix_cache::PrefixCache;
use reasoning_gateway::core::providers::capabilities::ProviderCapabilities;
use reasoning_gateway::core::providers::error::ProviderError;
use reasoning_gateway::core::providers::{ChatParams, Provider, ProviderRegistry, ResponseParams};
use reasoning_gateway::core::rate_limiter::RateLimiter;
use reasoning_gateway::core::types::{Message, ProviderCallResult, StreamChunk, UsageStats};
use reasoning_gateway::server::{routes, AppState};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Returns scripted `chat` replies in call order, ignoring the prompt
/// content entirely -- sufficient to drive a full DeepThink/UltraThink run
/// deterministically over HTTP.
struct ScriptedProvider {
    replies: Mutex<VecDeque<&'static str>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<&'static str>) -> Self {
        Self { replies: Mutex::new(replies.into_iter().collect()) }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::NONE
    }

    async fn chat(
        &self,
        _model: &str,
        _messages: &[Message],
        _params: ChatParams,
    ) -> Result<ProviderCallResult, ProviderError> {
        let reply = self.replies.lock().unwrap().pop_front().expect("script exhausted");
        Ok(ProviderCallResult::text(reply, UsageStats::new(10, 5)))
    }

    async fn chat_stream(
        &self,
        _model: &str,
        _messages: &[Message],
        _params: ChatParams,
    ) -> Result<BoxStream<'static, Result<StreamChunk, ProviderError>>, ProviderError> {
        unimplemented!("not exercised by these tests")
    }

    async fn response(
        &self,
        _model: &str,
        _messages: &[Message],
        _params: ResponseParams,
    ) -> Result<ProviderCallResult, ProviderError> {
        unimplemented!("ScriptedProvider declares ProviderCapabilities::NONE")
    }
}

fn test_runtime_config() -> RuntimeConfig {
    let mut models = HashMap::new();
    models.insert(
        "fast".to_string(),
        ModelRoute {
            provider: "stub".to_string(),
            backend_model: "stub-model".to_string(),
            engine_defaults: EngineDefaults::default(),
        },
    );

    let mut providers = HashMap::new();
    providers.insert(
        "stub".to_string(),
        ProviderCredentials {
            kind: ProviderKind::OpenAi,
            api_key: "unused".to_string(),
            base_url: None,
            request_timeout_seconds: 30,
        },
    );

    RuntimeConfig {
        bind_address: "127.0.0.1:0".to_string(),
        log_level: "error".to_string(),
        log_format: reasoning_gateway::config::LogFormat::Pretty,
        models,
        providers,
        pricing: HashMap::new(),
        // No limits configured: the rate limiter becomes a no-op so these
        // tests don't depend on real wall-clock waits.
        rate_limit_defaults: reasoning_gateway::config::RateLimitDefaults {
            qps: None,
            burst: None,
            window_limit: None,
            window_seconds: None,
            timeout_seconds: None,
            strategy: reasoning_gateway::core::rate_limiter::RateLimitStrategy::Wait,
        },
        strict_accounting: false,
        prefix_cache_enabled: false,
    }
}

fn app_state(provider: Arc<dyn Provider>) -> web::Data<AppState> {
    let registry = Arc::new(ProviderRegistry::new());
    registry.register(provider);
    web::Data::new(AppState::new(
        Arc::new(test_runtime_config()),
        registry,
        Arc::new(RateLimiter::new()),
        PrefixCache::disabled(),
    ))
}

#[actix_web::test]
async fn health_check_returns_ok() {
    let state = app_state(Arc::new(ScriptedProvider::new(vec![])));
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn deepthink_returns_final_solution_and_usage() {
    let provider = ScriptedProvider::new(vec![
        "x=5",
        r#"{"verdict":"pass","confidence":0.9}"#,
        "Final: x=5",
    ]);
    let state = app_state(Arc::new(provider));
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/reasoning/deepthink")
        .set_json(json!({"model": "fast", "problem": "what is 2+3?"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success(), "status: {}", resp.status());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["result"]["final_solution"], "x=5");
    assert_eq!(body["result"]["summary"], "Final: x=5");
    assert_eq!(body["result"]["iterations"], 1);
    assert_eq!(body["usage"]["input_tokens"], 30);
    assert_eq!(body["usage"]["output_tokens"], 15);
}

#[actix_web::test]
async fn deepthink_rejects_unknown_model_with_404() {
    let state = app_state(Arc::new(ScriptedProvider::new(vec![])));
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/reasoning/deepthink")
        .set_json(json!({"model": "does-not-exist", "problem": "2+2"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "not_found");
}

#[actix_web::test]
async fn ultrathink_returns_synthesis_across_two_agents() {
    // Planning -> agent configs -> per-agent (propose, verify, summarize) x2 -> synthesis -> summary.
    let provider = ScriptedProvider::new(vec![
        "Try algebra; try substitution.",
        r#"[{"agentId":"a1","approach":"algebra","specificPrompt":"use algebra"},
            {"agentId":"a2","approach":"substitution","specificPrompt":"use substitution"}]"#,
        "x=5",
        r#"{"verdict":"pass"}"#,
        "Agent 1: x=5",
        "x=5",
        r#"{"verdict":"pass"}"#,
        "Agent 2: x=5",
        "Both agents agree: x=5",
        "Final answer: x=5",
    ]);
    let state = app_state(Arc::new(provider));
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/reasoning/ultrathink")
        .set_json(json!({
            "model": "fast",
            "problem": "solve for x",
            "num_agents": 2,
            "parallel_agents": 1,
            "required_verifications": 1,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success(), "status: {}", resp.status());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["result"]["agent_results"].as_array().unwrap().len(), 2);
    assert_eq!(body["result"]["summary"], "Final answer: x=5");
}
