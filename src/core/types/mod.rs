//! Data types shared across providers, engines and the server adapter.

pub mod message;
pub mod result;
pub mod usage;
pub mod verification;

pub use message::{ContentPart, ImageUrl, Message, MessageContent, Role};
pub use result::{
    AgentResult, DeepThinkMode, DeepThinkResult, EngineResult, ProviderCallResult, StreamChunk,
    UltraThinkMode, UltraThinkResult,
};
pub use usage::UsageStats;
pub use verification::{ArithResult, Verdict, VerificationRecord};
