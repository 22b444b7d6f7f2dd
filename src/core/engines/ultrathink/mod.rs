mod agent_config;
mod engine;

pub use agent_config::AgentConfig;
pub use engine::{UltraThink, UltraThinkParams};
