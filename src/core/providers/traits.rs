//! The uniform contract every upstream backend adapter implements.

use super::capabilities::ProviderCapabilities;
use super::error::ProviderError;
use crate::core::types::{Message, ProviderCallResult, StreamChunk};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashMap;

/// Extra, loosely-typed parameters a caller may pass through to a backend
/// without the core needing to know about every backend-specific knob.
pub type Extras = HashMap<String, serde_json::Value>;

/// Parameters for a [`Provider::response`] call.
#[derive(Debug, Clone, Default)]
pub struct ResponseParams {
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    pub previous_response_id: Option<String>,
    pub store: Option<bool>,
    pub response_format: Option<serde_json::Value>,
    pub extras: Extras,
}

/// Parameters for a [`Provider::chat`] / [`Provider::chat_stream`] call.
#[derive(Debug, Clone, Default)]
pub struct ChatParams {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub extras: Extras,
}

/// A capability-bearing handle over a specific upstream LLM backend.
///
/// Callers MUST consult [`Provider::capabilities`] before calling
/// [`Provider::response`] -- calling it on a provider that does not support
/// it is a programmer error and returns `invalid_request` without any
/// network call, per the capability negotiation contract.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable provider name, e.g. `"openai"`, `"anthropic"`. Used as the
    /// first component of rate-limiter bucket keys and cost-table lookups.
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

    /// Structured-output / prefix-caching entry point. Default
    /// implementation rejects with `invalid_request` for adapters that
    /// don't support it, matching the capability-negotiation contract even
    /// if a caller forgets to check `capabilities` first.
    async fn response(
        &self,
        model: &str,
        messages: &[Message],
        params: ResponseParams,
    ) -> Result<ProviderCallResult, ProviderError> {
        let _ = (model, messages, params);
        Err(ProviderError::invalid_request(
            self.name(),
            "this provider does not support the Responses entry point",
        ))
    }

    /// Rough token estimate for text the provider hasn't tokenized yet
    /// (used only for pre-flight rate-limiter sizing, never for billing).
    fn estimate_tokens(&self, text: &str) -> u64 {
        (text.len() as u64 / 4).max(1)
    }
}
