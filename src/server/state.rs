//! Shared application state, handed to every route handler behind
//! `web::Data`. Modeled on the reference gateway's `AppState`: a small
//! `Clone` struct of `Arc`-wrapped shared resources built once at startup.

use crate::config::RuntimeConfig;
use crate::core::prefix_cache::PrefixCache;
use crate::core::providers::ProviderRegistry;
use crate::core::rate_limiter::RateLimiter;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub runtime_config: Arc<RuntimeConfig>,
    pub registry: Arc<ProviderRegistry>,
    pub rate_limiter: Arc<RateLimiter>,
    pub prefix_cache: PrefixCache,
}

impl AppState {
    pub fn new(
        runtime_config: Arc<RuntimeConfig>,
        registry: Arc<ProviderRegistry>,
        rate_limiter: Arc<RateLimiter>,
        prefix_cache: PrefixCache,
    ) -> Self {
        Self { runtime_config, registry, rate_limiter, prefix_cache }
    }
}
