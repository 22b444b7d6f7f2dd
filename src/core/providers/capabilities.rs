//! Static capability flags a provider declares support for.
//!
//! Deliberately a flat, immutable struct rather than the phantom-typed
//! capability machinery some gateways use -- engines only ever need to
//! branch on a handful of booleans before picking an entry point, and a
//! plain struct keeps that branch a one-line `if`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    /// The Responses-style entry point (structured output, provider-side
    /// prefix caching via response ids) is available.
    pub supports_responses: bool,
    pub supports_streaming: bool,
    pub supports_vision: bool,
    /// Extended/"thinking" reasoning tokens are billed and reported.
    pub supports_thinking: bool,
    /// Provider-side prompt caching (response-id continuation, or
    /// cache-control style prefix reuse) is available in some form.
    pub supports_caching: bool,
}

impl ProviderCapabilities {
    pub const NONE: Self = Self {
        supports_responses: false,
        supports_streaming: false,
        supports_vision: false,
        supports_thinking: false,
        supports_caching: false,
    };
}
