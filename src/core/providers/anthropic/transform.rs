//! Request/response shape translation between the core's canonical types and
//! Anthropic's `/v1/messages` wire format.

use crate::core::providers::error::ProviderError;
use crate::core::types::{ContentPart, Message, MessageContent, ProviderCallResult, Role, UsageStats};
use serde_json::{json, Value};

/// Anthropic has no `system` role message; the system prompt is a top-level
/// field. Returns `(system_text, remaining_messages_as_json)`.
pub fn split_system(messages: &[Message]) -> (Option<Value>, Vec<Value>) {
    let mut system_blocks = Vec::new();
    let mut rest = Vec::new();
    for message in messages {
        match message.role {
            Role::System => {
                system_blocks.push(json!({
                    "type": "text",
                    "text": message.content.as_text(),
                    "cache_control": {"type": "ephemeral"},
                }));
            }
            Role::User | Role::Assistant => rest.push(message_to_json(message)),
        }
    }
    let system = if system_blocks.is_empty() { None } else { Some(json!(system_blocks)) };
    (system, rest)
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "user", // unreachable: system messages are split out above
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn message_to_json(message: &Message) -> Value {
    match &message.content {
        MessageContent::Text(text) => json!({
            "role": role_str(message.role),
            "content": [{"type": "text", "text": text}],
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
            "type": "image",
            "source": {"type": "url", "url": image_url.url},
        }),
        ContentPart::ToolUse { id, name, parameters, .. } => json!({
            "type": "tool_use",
            "id": id,
            "name": name,
            "input": parameters,
        }),
        ContentPart::ToolResult { tool_use_id, content, is_error, .. } => json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": content.iter().map(part_to_json).collect::<Vec<_>>(),
            "is_error": is_error,
        }),
    }
}

pub fn parse_message_response(body: &Value, provider: &str) -> Result<ProviderCallResult, ProviderError> {
    let content_blocks = body
        .get("content")
        .and_then(|c| c.as_array())
        .cloned()
        .unwrap_or_default();

    let mut text = String::new();
    let mut raw_output = Vec::new();
    for block in &content_blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                if let Some(t) = block.get("text").and_then(|v| v.as_str()) {
                    text.push_str(t);
                    raw_output.push(ContentPart::Text { text: t.to_string() });
                }
            }
            Some("tool_use") => {
                let id = block.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let name = block.get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let parameters = block.get("input").cloned().unwrap_or(Value::Null);
                raw_output.push(ContentPart::ToolUse { id, name, parameters, details: None });
            }
            _ => {}
        }
    }

    let usage_raw = body.get("usage").cloned().unwrap_or(Value::Null);
    let mut usage = UsageStats::from_json(&usage_raw);
    // Anthropic reports cache tokens under its own field names rather than
    // the nested `input_tokens_details` shape `UsageStats::from_json` looks
    // for by default.
    if let Some(cached) = usage_raw.get("cache_read_input_tokens").and_then(|v| v.as_u64()) {
        usage.cached_tokens = cached;
    }

    let _ = provider;
    Ok(ProviderCallResult {
        content: text,
        raw_output: if raw_output.is_empty() { None } else { Some(raw_output) },
        output_parsed: None,
        usage,
        response_id: body.get("id").and_then(|v| v.as_str()).map(|s| s.to_string()),
        finish_reason: body.get("stop_reason").and_then(|v| v.as_str()).map(|s| s.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_system_pulls_system_messages_out_with_cache_control() {
        let messages = vec![
            Message::system("be terse"),
            Message::user("hi"),
            Message::assistant("hello"),
        ];
        let (system, rest) = split_system(&messages);
        let system = system.unwrap();
        assert_eq!(system[0]["text"], "be terse");
        assert_eq!(system[0]["cache_control"]["type"], "ephemeral");
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0]["role"], "user");
        assert_eq!(rest[1]["role"], "assistant");
    }

    #[test]
    fn split_system_returns_none_when_no_system_message_present() {
        let messages = vec![Message::user("hi")];
        let (system, rest) = split_system(&messages);
        assert!(system.is_none());
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn parse_message_response_extracts_text_blocks_and_tool_use() {
        let body = json!({
            "id": "msg_1",
            "stop_reason": "end_turn",
            "content": [
                {"type": "text", "text": "the answer is "},
                {"type": "text", "text": "42"},
                {"type": "tool_use", "id": "tool_1", "name": "calc", "input": {"x": 1}},
            ],
            "usage": {"input_tokens": 20, "output_tokens": 8},
        });
        let result = parse_message_response(&body, "anthropic").unwrap();
        assert_eq!(result.content, "the answer is 42");
        assert_eq!(result.response_id.as_deref(), Some("msg_1"));
        assert_eq!(result.finish_reason.as_deref(), Some("end_turn"));
        let raw = result.raw_output.unwrap();
        assert!(matches!(&raw[0], ContentPart::Text { text } if text == "the answer is "));
        match &raw[2] {
            ContentPart::ToolUse { id, name, parameters, .. } => {
                assert_eq!(id, "tool_1");
                assert_eq!(name, "calc");
                assert_eq!(parameters["x"], 1);
            }
            other => panic!("expected ToolUse, got {other:?}"),
        }
    }

    #[test]
    fn parse_message_response_maps_cache_read_tokens_onto_cached_tokens() {
        let body = json!({
            "content": [],
            "usage": {"input_tokens": 100, "output_tokens": 5, "cache_read_input_tokens": 60},
        });
        let result = parse_message_response(&body, "anthropic").unwrap();
        assert_eq!(result.usage.cached_tokens, 60);
        assert_eq!(result.usage.input_tokens, 100);
    }

    #[test]
    fn message_to_json_wraps_plain_text_in_a_single_content_block() {
        let message = Message::user("hi");
        let rendered = message_to_json(&message);
        assert_eq!(rendered["content"][0]["type"], "text");
        assert_eq!(rendered["content"][0]["text"], "hi");
    }
}
