//! Anthropic-style reference adapter.
//!
//! Exercises the `supports_responses = false` path: every stage goes
//! through plain `chat`, and provider-side prompt reuse happens via
//! `cache_control` breakpoints on message blocks instead of a response id,
//! which the prefix cache never sees (it only persists response ids).

mod client;
mod transform;

pub use client::{AnthropicConfig, AnthropicProvider};
