//! The provider abstraction: a uniform contract over heterogeneous upstream
//! LLM backends, plus the process-wide registry that hands out shared
//! instances.

pub mod anthropic;
pub mod capabilities;
pub mod error;
pub mod openai;
pub mod registry;
pub mod traits;

pub use capabilities::ProviderCapabilities;
pub use error::ProviderError;
pub use registry::ProviderRegistry;
pub use traits::{ChatParams, Provider, ResponseParams};
