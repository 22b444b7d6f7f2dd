//! Provider call results and top-level engine results.

use super::{message::ContentPart, usage::UsageStats, verification::VerificationRecord};
use serde::{Deserialize, Serialize};

/// The normalized result of a single provider call (`chat` or `response`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCallResult {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<Vec<ContentPart>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_parsed: Option<serde_json::Value>,
    pub usage: UsageStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl ProviderCallResult {
    pub fn text(content: impl Into<String>, usage: UsageStats) -> Self {
        Self {
            content: content.into(),
            raw_output: None,
            output_parsed: None,
            usage,
            response_id: None,
            finish_reason: None,
        }
    }
}

/// One streamed delta chunk from `chat_stream`. The final chunk of a stream
/// MAY carry a `usage` payload with no delta content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepThinkResult {
    pub mode: DeepThinkMode,
    pub iterations: u32,
    pub successful_verifications: u32,
    pub verification_logs: Vec<VerificationRecord>,
    pub final_solution: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum DeepThinkMode {
    #[serde(rename = "deep-think")]
    DeepThink,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_id: String,
    pub result: DeepThinkResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UltraThinkResult {
    pub mode: UltraThinkMode,
    pub plan: String,
    pub num_agents: u32,
    pub agent_results: Vec<AgentResult>,
    pub synthesis: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum UltraThinkMode {
    #[serde(rename = "ultra-think")]
    UltraThink,
}

/// The engine-polymorphic result returned at the HTTP boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EngineResult {
    DeepThink(DeepThinkResult),
    UltraThink(UltraThinkResult),
}
