//! HTTP adapter for an OpenAI-compatible backend.

use super::transform::{message_to_json, parse_chat_response, parse_responses_body};
use crate::core::providers::capabilities::ProviderCapabilities;
use crate::core::providers::error::ProviderError;
use crate::core::providers::traits::{ChatParams, Provider, ResponseParams};
use crate::core::types::{Message, ProviderCallResult, StreamChunk, UsageStats};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures_util::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;

/// Minimal connection configuration; credentials and the base URL are
/// resolved from `RuntimeConfig` by the adapter layer, not parsed here.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

pub struct OpenAiProvider {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::configuration("openai", e.to_string()))?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send_json(&self, path: &str, body: Value) -> Result<Value, ProviderError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_reqwest_error("openai", e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::network("openai", e.to_string()))?;

        if status >= 400 {
            return Err(ProviderError::from_http_status("openai", status, &text));
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::serialization("openai", e.to_string()))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_responses: true,
            supports_streaming: true,
            supports_vision: true,
            supports_thinking: true,
            supports_caching: true,
        }
    }

    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        params: ChatParams,
    ) -> Result<ProviderCallResult, ProviderError> {
        let mut body = json!({
            "model": model,
            "messages": messages.iter().map(message_to_json).collect::<Vec<_>>(),
        });
        if let Some(temperature) = params.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = params.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        for (key, value) in params.extras {
            body[key] = value;
        }
        let response = self.send_json("chat/completions", body).await?;
        parse_chat_response(&response, "openai")
    }

    async fn chat_stream(
        &self,
        model: &str,
        messages: &[Message],
        params: ChatParams,
    ) -> Result<BoxStream<'static, Result<StreamChunk, ProviderError>>, ProviderError> {
        let mut body = json!({
            "model": model,
            "messages": messages.iter().map(message_to_json).collect::<Vec<_>>(),
            "stream": true,
            "stream_options": {"include_usage": true},
        });
        if let Some(temperature) = params.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = params.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let response = self
            .http
            .post(self.url("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_reqwest_error("openai", e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_http_status("openai", status, &text));
        }

        let byte_stream = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut buffer = String::new();
            futures::pin_mut!(byte_stream);
            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(ProviderError::streaming("openai", None, e.to_string()));
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(pos) = buffer.find("\n\n") {
                    let event = buffer[..pos].to_string();
                    buffer.drain(..pos + 2);
                    for line in event.lines() {
                        let Some(data) = line.strip_prefix("data: ") else { continue };
                        if data == "[DONE]" {
                            return;
                        }
                        match serde_json::from_str::<Value>(data) {
                            Ok(payload) => yield Ok(parse_stream_chunk(&payload)),
                            Err(e) => yield Err(ProviderError::streaming(
                                "openai",
                                None,
                                format!("malformed SSE payload: {e}"),
                            )),
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn response(
        &self,
        model: &str,
        messages: &[Message],
        params: ResponseParams,
    ) -> Result<ProviderCallResult, ProviderError> {
        let mut body = json!({
            "model": model,
            "input": messages.iter().map(message_to_json).collect::<Vec<_>>(),
        });
        if let Some(temperature) = params.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_output_tokens) = params.max_output_tokens {
            body["max_output_tokens"] = json!(max_output_tokens);
        }
        if let Some(previous_response_id) = params.previous_response_id {
            body["previous_response_id"] = json!(previous_response_id);
        }
        if let Some(store) = params.store {
            body["store"] = json!(store);
        }
        if let Some(response_format) = params.response_format {
            body["text"] = json!({"format": response_format});
        }
        for (key, value) in params.extras {
            body[key] = value;
        }
        let response = self.send_json("responses", body).await?;
        parse_responses_body(&response, "openai")
    }

    fn estimate_tokens(&self, text: &str) -> u64 {
        (text.len() as u64 / 4).max(1)
    }
}

fn parse_stream_chunk(payload: &Value) -> StreamChunk {
    let delta = payload
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("delta"))
        .and_then(|d| d.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string());
    let finish_reason = payload
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("finish_reason"))
        .and_then(|f| f.as_str())
        .map(|s| s.to_string());
    let usage = payload.get("usage").map(UsageStats::from_json);
    StreamChunk { delta, finish_reason, usage }
}

fn map_reqwest_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout(provider, error.to_string())
    } else {
        ProviderError::network(provider, error.to_string())
    }
}
