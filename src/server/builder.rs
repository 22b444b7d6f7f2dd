//! Builds the provider registry and shared application state from a
//! [`RuntimeConfig`] and runs the HTTP server.

use super::routes;
use super::state::AppState;
use crate::config::{ProviderCredentials, ProviderKind, RuntimeConfig};
use crate::core::errors::{GatewayError, Result};
use crate::core::prefix_cache::{MokaResponseIdStore, PrefixCache};
use crate::core::providers::anthropic::{AnthropicConfig, AnthropicProvider};
use crate::core::providers::openai::{OpenAiConfig, OpenAiProvider};
use crate::core::providers::{Provider, ProviderRegistry};
use crate::core::rate_limiter::RateLimiter;
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

/// Constructs one provider adapter from its configured credentials.
fn build_provider(credentials: &ProviderCredentials) -> Result<Arc<dyn Provider>> {
    match credentials.kind {
        ProviderKind::OpenAi => {
            let config = OpenAiConfig {
                api_key: credentials.api_key.clone(),
                base_url: credentials
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
                request_timeout: credentials.request_timeout(),
            };
            let provider = OpenAiProvider::new(config)
                .map_err(|e| GatewayError::Config(format!("openai provider: {e}")))?;
            Ok(Arc::new(provider))
        }
        ProviderKind::Anthropic => {
            let config = AnthropicConfig {
                api_key: credentials.api_key.clone(),
                base_url: credentials
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.anthropic.com/v1".to_string()),
                request_timeout: credentials.request_timeout(),
                ..Default::default()
            };
            let provider = AnthropicProvider::new(config)
                .map_err(|e| GatewayError::Config(format!("anthropic provider: {e}")))?;
            Ok(Arc::new(provider))
        }
    }
}

/// Eagerly constructs every configured provider and registers it under its
/// configured name (§3: "Provider instances: process-wide, lazily created
/// per `providerName`" -- eager here since credentials are already known at
/// startup; nothing prevents a later `get_or_try_init` for a name that
/// wasn't in the config).
fn build_registry(runtime_config: &RuntimeConfig) -> Result<ProviderRegistry> {
    let registry = ProviderRegistry::new();
    for credentials in runtime_config.providers.values() {
        let provider = build_provider(credentials)?;
        registry.register(provider);
    }
    Ok(registry)
}

/// Builds application state and runs the server to completion (i.e. until
/// the listener is shut down).
pub async fn run(runtime_config: RuntimeConfig) -> Result<()> {
    let runtime_config = Arc::new(runtime_config);
    let registry = Arc::new(build_registry(&runtime_config)?);
    let rate_limiter = Arc::new(RateLimiter::new());
    let prefix_cache = if runtime_config.prefix_cache_enabled {
        PrefixCache::new(Arc::new(MokaResponseIdStore::default()))
    } else {
        PrefixCache::disabled()
    };

    let state = web::Data::new(AppState::new(
        runtime_config.clone(),
        registry,
        rate_limiter,
        prefix_cache,
    ));

    let bind_address = runtime_config.bind_address.clone();
    info!(%bind_address, "starting reasoning gateway");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .configure(routes::configure)
    })
    .bind(&bind_address)
    .map_err(|e| GatewayError::Config(format!("failed to bind {bind_address}: {e}")))?
    .run()
    .await
    .map_err(|e| GatewayError::Server(format!("server error: {e}")))
}
