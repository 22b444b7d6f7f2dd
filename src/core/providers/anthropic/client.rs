//! HTTP adapter for an Anthropic-compatible backend.

use super::transform::{parse_message_response, split_system};
use crate::core::providers::capabilities::ProviderCapabilities;
use crate::core::providers::error::ProviderError;
use crate::core::providers::traits::{ChatParams, Provider};
use crate::core::types::{Message, ProviderCallResult, StreamChunk, UsageStats};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures_util::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub anthropic_version: String,
    pub request_timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            anthropic_version: "2023-06-01".to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

pub struct AnthropicProvider {
    http: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::configuration("anthropic", e.to_string()))?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.url(path))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.anthropic_version)
    }

    fn build_body(&self, model: &str, messages: &[Message], params: &ChatParams) -> Value {
        let (system, rest) = split_system(messages);
        let mut body = json!({
            "model": model,
            "messages": rest,
            "max_tokens": params.max_tokens.unwrap_or(4096),
        });
        if let Some(system) = system {
            body["system"] = system;
        }
        if let Some(temperature) = params.temperature {
            body["temperature"] = json!(temperature);
        }
        for (key, value) in &params.extras {
            body[key] = value.clone();
        }
        body
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_responses: false,
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
        let body = self.build_body(model, messages, &params);
        let response = self
            .request("messages")
            .json(&body)
            .send()
            .await
            .map_err(|e| map_reqwest_error("anthropic", e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::network("anthropic", e.to_string()))?;
        if status >= 400 {
            return Err(ProviderError::from_http_status("anthropic", status, &text));
        }
        let parsed: Value = serde_json::from_str(&text)
            .map_err(|e| ProviderError::serialization("anthropic", e.to_string()))?;
        parse_message_response(&parsed, "anthropic")
    }

    async fn chat_stream(
        &self,
        model: &str,
        messages: &[Message],
        params: ChatParams,
    ) -> Result<BoxStream<'static, Result<StreamChunk, ProviderError>>, ProviderError> {
        let mut body = self.build_body(model, messages, &params);
        body["stream"] = json!(true);

        let response = self
            .request("messages")
            .json(&body)
            .send()
            .await
            .map_err(|e| map_reqwest_error("anthropic", e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_http_status("anthropic", status, &text));
        }

        let byte_stream = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut buffer = String::new();
            futures::pin_mut!(byte_stream);
            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(ProviderError::streaming("anthropic", None, e.to_string()));
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(pos) = buffer.find("\n\n") {
                    let event = buffer[..pos].to_string();
                    buffer.drain(..pos + 2);
                    let mut event_type = None;
                    let mut data_line = None;
                    for line in event.lines() {
                        if let Some(t) = line.strip_prefix("event: ") {
                            event_type = Some(t.to_string());
                        } else if let Some(d) = line.strip_prefix("data: ") {
                            data_line = Some(d.to_string());
                        }
                    }
                    let (Some(event_type), Some(data)) = (event_type, data_line) else { continue };
                    let Ok(payload) = serde_json::from_str::<Value>(&data) else { continue };
                    match event_type.as_str() {
                        "content_block_delta" => {
                            if let Some(text) = payload
                                .get("delta")
                                .and_then(|d| d.get("text"))
                                .and_then(|t| t.as_str())
                            {
                                yield Ok(StreamChunk {
                                    delta: Some(text.to_string()),
                                    finish_reason: None,
                                    usage: None,
                                });
                            }
                        }
                        "message_delta" => {
                            let finish_reason = payload
                                .get("delta")
                                .and_then(|d| d.get("stop_reason"))
                                .and_then(|s| s.as_str())
                                .map(|s| s.to_string());
                            let usage = payload.get("usage").map(UsageStats::from_json);
                            yield Ok(StreamChunk { delta: None, finish_reason, usage });
                        }
                        "message_stop" => return,
                        _ => {}
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    // `response` is intentionally left at the trait default: this adapter
    // declares `supports_responses = false`, so callers must never invoke
    // it without violating the capability-negotiation contract first.

    fn estimate_tokens(&self, text: &str) -> u64 {
        (text.len() as u64 / 4).max(1)
    }
}

fn map_reqwest_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout(provider, error.to_string())
    } else {
        ProviderError::network(provider, error.to_string())
    }
}
