//! The ambient configuration layer: builds the core's read-only
//! [`RuntimeConfig`] view from a config file, environment and CLI flags
//! (§1 Ambient Stack, §6).

pub mod loader;
pub mod runtime;

pub use loader::{load, load_from, Cli};
pub use runtime::{
    EngineDefaults, LogFormat, ModelRoute, ProviderCredentials, ProviderKind, RateLimitDefaults,
    RuntimeConfig,
};
