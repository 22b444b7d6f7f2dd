//! Exercises the `Provider` trait through a `mockall`-generated mock rather
//! than a hand-written stub, so call arguments can be asserted on directly
//! instead of only inferred from scripted replies.

use async_trait::async_trait;
use futures::stream::BoxStream;
use mockall::mock;
use reasoning_gateway::core::prefix_cache::PrefixCache;
use reasoning_gateway::core::providers::capabilities::ProviderCapabilities;
use reasoning_gateway::core::providers::error::ProviderError;
use reasoning_gateway::core::providers::{ChatParams, Provider, ResponseParams};
use reasoning_gateway::core::rate_limiter::{KeyConfig, RateLimiter};
use reasoning_gateway::core::token_meter::TokenMeter;
use reasoning_gateway::core::types::{Message, ProviderCallResult, StreamChunk, UsageStats};
use std::sync::Arc;

mock! {
    pub LlmProvider {}

    #[async_trait]
    impl Provider for LlmProvider {
        fn name(&self) -> &str;
        fn capabilities(&self) -> ProviderCapabilities;
        async fn chat(
            &self,
            model: &str,
            messages: &[Message],
            params: ChatParams,
        ) -> Result<ProviderCallResult, ProviderError>;
        async fn chat_stream(
            &self,
            model: &str,
            messages: &[Message],
            params: ChatParams,
        ) -> Result<BoxStream<'static, Result<StreamChunk, ProviderError>>, ProviderError>;
        async fn response(
            &self,
            model: &str,
            messages: &[Message],
            params: ResponseParams,
        ) -> Result<ProviderCallResult, ProviderError>;
        fn estimate_tokens(&self, text: &str) -> u64;
    }
}

#[tokio::test]
async fn deepthink_calls_chat_with_the_expected_model_and_stops_at_required_verifications() {
    use reasoning_gateway::core::engines::deepthink::{DeepThink, DeepThinkParams};
    use reasoning_gateway::core::rate_limiter::RateLimitStrategy;
    use std::collections::HashMap;

    let mut mock = MockLlmProvider::new();
    mock.expect_name().return_const("mock".to_string());
    mock.expect_capabilities().return_const(ProviderCapabilities::NONE);

    let mut call_count = 0;
    mock.expect_chat().times(2).returning(move |model, _messages, _params| {
        call_count += 1;
        assert_eq!(model, "mock-model");
        let reply = match call_count {
            1 => "x=5",
            _ => r#"{"verdict":"pass","confidence":0.95}"#,
        };
        Ok(ProviderCallResult::text(reply, UsageStats::new(4, 2)))
    });
    mock.expect_chat().returning(|_model, _messages, _params| {
        Ok(ProviderCallResult::text("Final: x=5", UsageStats::new(4, 2)))
    });

    let provider: Arc<dyn Provider> = Arc::new(mock);
    let rate_limiter = Arc::new(RateLimiter::new());
    rate_limiter.configure("mock:mock-model", KeyConfig::default());

    let engine = DeepThink::new(
        DeepThinkParams {
            provider,
            model: "mock-model".to_string(),
            problem: "what is x?".to_string(),
            history: Vec::new(),
            knowledge: None,
            max_iterations: 10,
            required_successful_verifications: 1,
            max_errors_before_give_up: 3,
            enable_parallel_check: false,
            model_stages: HashMap::new(),
            llm_params: serde_json::json!({}),
            bucket_key: "mock:mock-model".to_string(),
            rate_limit_timeout: None,
            rate_limit_strategy: RateLimitStrategy::Wait,
        },
        Arc::new(TokenMeter::new()),
        PrefixCache::disabled(),
        rate_limiter,
    );

    let result = engine.run().await.unwrap();
    assert_eq!(result.iterations, 1);
    assert_eq!(result.successful_verifications, 1);
    assert_eq!(result.final_solution, "x=5");
    assert_eq!(result.summary, "Final: x=5");
}
