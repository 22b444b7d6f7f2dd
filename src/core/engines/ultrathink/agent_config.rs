//! Parsing of the agent-config generator's JSON array output, with the
//! synthetic-fallback / `strict_agent_config` policy from §4.4 and §9 open
//! question 1.

use crate::core::engines::{EventLevel, EventSink};
use crate::core::errors::{GatewayError, Result};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub agent_id: String,
    #[serde(default)]
    pub approach: Option<String>,
    pub specific_prompt: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub llm_params: Option<Value>,
    #[serde(default)]
    pub qps: Option<f64>,
    #[serde(default)]
    pub throttle_seconds: Option<f64>,
}

/// Parses the agent-config generator's reply. On success, returns the
/// parsed list verbatim (§8 S3: its length, not `num_agents`, governs
/// `agent_results` length when shorter). On failure:
/// - `strict` (`strict_agent_config`): a hard `InvalidRequest`-class error.
/// - otherwise: `num_agents` synthetic `agent-k` configs, plus an explicit
///   `warn` event naming the parse failure (§8 S7), never a silent fallback.
pub fn parse_agent_configs(
    raw: &str,
    num_agents: u32,
    strict: bool,
    sink: &dyn EventSink,
) -> Result<Vec<AgentConfig>> {
    match try_parse(raw) {
        Some(configs) if !configs.is_empty() => Ok(configs),
        _ => {
            let reason = "agent-config generator output did not parse as a non-empty JSON array";
            if strict {
                return Err(GatewayError::InvalidRequest(reason.to_string()));
            }
            sink.emit(
                EventLevel::Warn,
                "ultrathink.agent_config.fallback",
                serde_json::json!({"reason": reason, "num_agents": num_agents}),
            );
            Ok(synthetic_configs(num_agents))
        }
    }
}

fn try_parse(raw: &str) -> Option<Vec<AgentConfig>> {
    let trimmed = raw.trim();
    if let Ok(configs) = serde_json::from_str::<Vec<AgentConfig>>(trimmed) {
        return Some(configs);
    }
    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Vec<AgentConfig>>(&trimmed[start..=end]).ok()
}

fn synthetic_configs(num_agents: u32) -> Vec<AgentConfig> {
    (1..=num_agents)
        .map(|k| AgentConfig {
            agent_id: format!("agent-{k}"),
            approach: Some(format!("Approach {k}")),
            specific_prompt: format!("Solve using method {k}"),
            model: None,
            llm_params: None,
            qps: None,
            throttle_seconds: None,
        })
        .collect()
}
