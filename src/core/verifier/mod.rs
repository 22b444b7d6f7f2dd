//! Structured judgment of a candidate solution, with an optional parallel
//! symbolic sanity check (§4.3).

mod arith;
mod schema;

pub use arith::{ArithmeticSanityCheck, SanityCheckBackend};
pub use schema::{verification_schema, FALLBACK_INSTRUCTION};

use crate::core::providers::{ChatParams, Provider, ResponseParams};
use crate::core::types::{Message, UsageStats, VerificationRecord};
use std::sync::Arc;

/// The outcome of one `verify` call: the judgment plus the token usage it
/// cost, so the caller (DeepThink) can feed it into the shared token meter.
pub struct VerifyOutcome {
    pub record: VerificationRecord,
    pub usage: UsageStats,
}

pub struct Verifier {
    backend: Arc<dyn SanityCheckBackend>,
}

impl Default for Verifier {
    fn default() -> Self {
        Self { backend: Arc::new(ArithmeticSanityCheck) }
    }
}

impl Verifier {
    pub fn new(backend: Arc<dyn SanityCheckBackend>) -> Self {
        Self { backend }
    }

    /// Issues one verification call at stage `verification`. Prefers the
    /// structured (Responses) path when the provider supports it; falls
    /// back to a strict text instruction otherwise. When
    /// `enable_parallel_check` is set, the arithmetic sanity check runs
    /// concurrently with the LLM call rather than after it.
    pub async fn verify(
        &self,
        provider: &Arc<dyn Provider>,
        model: &str,
        problem: &str,
        solution: &str,
        llm_params: &serde_json::Value,
        enable_parallel_check: bool,
    ) -> Result<VerifyOutcome, crate::core::providers::ProviderError> {
        let backend = self.backend.clone();
        let solution_owned = solution.to_string();

        let llm_call = self.call_verifier(provider, model, problem, solution, llm_params);

        if enable_parallel_check {
            let arith_task = tokio::task::spawn_blocking(move || backend.check(&solution_owned));
            let (llm_result, arith_result) = tokio::join!(llm_call, arith_task);
            let (mut record, usage) = llm_result?;
            record.arith = Some(arith_result.unwrap_or(None));
            Ok(VerifyOutcome { record, usage })
        } else {
            let (record, usage) = llm_call.await?;
            Ok(VerifyOutcome { record, usage })
        }
    }

    async fn call_verifier(
        &self,
        provider: &Arc<dyn Provider>,
        model: &str,
        problem: &str,
        solution: &str,
        llm_params: &serde_json::Value,
    ) -> Result<(VerificationRecord, UsageStats), crate::core::providers::ProviderError> {
        let prompt = format!(
            "Problem:\n{problem}\n\nCandidate solution:\n{solution}\n\nJudge whether the candidate solution is correct."
        );

        if provider.capabilities().supports_responses {
            let messages = vec![Message::user(prompt)];
            let result = provider
                .response(
                    model,
                    &messages,
                    ResponseParams {
                        temperature: extract_temperature(llm_params),
                        response_format: Some(verification_schema()),
                        store: Some(false),
                        ..Default::default()
                    },
                )
                .await?;
            let record = result
                .output_parsed
                .as_ref()
                .map(schema_value_to_record)
                .unwrap_or_else(|| schema::parse_verification_reply(&result.content));
            Ok((record, result.usage))
        } else {
            let messages = vec![Message::user(format!("{prompt}\n\n{}", schema::FALLBACK_INSTRUCTION))];
            let result = provider
                .chat(
                    model,
                    &messages,
                    ChatParams { temperature: extract_temperature(llm_params), ..Default::default() },
                )
                .await?;
            let record = schema::parse_verification_reply(&result.content);
            Ok((record, result.usage))
        }
    }
}

fn extract_temperature(llm_params: &serde_json::Value) -> Option<f64> {
    llm_params.get("temperature").and_then(|v| v.as_f64())
}

fn schema_value_to_record(value: &serde_json::Value) -> VerificationRecord {
    schema::parse_verification_reply(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::capabilities::ProviderCapabilities;
    use crate::core::providers::error::ProviderError;
    use crate::core::types::{ProviderCallResult, StreamChunk};
    use async_trait::async_trait;
    use futures::stream::BoxStream;

    struct FallbackProvider;

    #[async_trait]
    impl Provider for FallbackProvider {
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
            Ok(ProviderCallResult::text(r#"{"verdict":"pass","confidence":0.8}"#, UsageStats::new(10, 5)))
        }
        async fn chat_stream(
            &self,
            _model: &str,
            _messages: &[Message],
            _params: ChatParams,
        ) -> Result<BoxStream<'static, Result<StreamChunk, ProviderError>>, ProviderError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn fallback_path_is_used_when_responses_are_unsupported() {
        let provider: Arc<dyn Provider> = Arc::new(FallbackProvider);
        let verifier = Verifier::default();
        let outcome = verifier
            .verify(&provider, "m", "2+2", "4", &serde_json::json!({}), false)
            .await
            .unwrap();
        assert!(outcome.record.is_pass());
        assert_eq!(outcome.usage.input_tokens, 10);
    }

    #[tokio::test]
    async fn parallel_check_attaches_arith_result() {
        let provider: Arc<dyn Provider> = Arc::new(FallbackProvider);
        let verifier = Verifier::default();
        let outcome = verifier
            .verify(&provider, "m", "2+2", "answer: 2 + 2", &serde_json::json!({}), true)
            .await
            .unwrap();
        assert_eq!(outcome.record.arith, Some(Some(true)));
    }
}
