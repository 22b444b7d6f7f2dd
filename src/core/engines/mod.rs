//! Reasoning engines: DeepThink (single-agent propose/verify/correct loop)
//! and UltraThink (multi-agent plan/fan-out/synthesize), plus the shared
//! stage labeling and progress-event sink both depend on.

pub mod deepthink;
pub mod events;
pub mod prompts;
pub mod ultrathink;

pub use events::{EventLevel, EventSink, RecordingSink, TracingSink};

/// The role a single LLM call plays within an engine run. `model_stages`
/// maps a subset of these to an override model name (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Initial,
    Verification,
    Correction,
    Summary,
    Planning,
    Synthesis,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::Verification => "verification",
            Stage::Correction => "correction",
            Stage::Summary => "summary",
            Stage::Planning => "planning",
            Stage::Synthesis => "synthesis",
        }
    }
}
