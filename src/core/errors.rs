//! Core error taxonomy.
//!
//! Mirrors the layering used throughout the reference gateway: a
//! backend-specific [`crate::core::providers::error::ProviderError`] is
//! produced at the adapter boundary and wrapped here into the taxonomy the
//! engines and the HTTP surface actually reason about.

use crate::core::providers::error::ProviderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// The unified error taxonomy at the core surface.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("rate limit wait timed out after {0:?}")]
    RateLimitTimeout(std::time::Duration),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream server error: {0}")]
    Server(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("verification output unparseable: {0}")]
    VerificationUnparseable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GatewayError {
    /// Canonical HTTP status for this error's kind, per the taxonomy table.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Auth(_) => 401,
            GatewayError::RateLimitExceeded(_) | GatewayError::RateLimitTimeout(_) => 429,
            GatewayError::Timeout(_) => 504,
            GatewayError::InvalidRequest(_)
            | GatewayError::VerificationUnparseable(_)
            | GatewayError::Validation(_)
            | GatewayError::Serialization(_) => 400,
            GatewayError::NotFound(_) => 404,
            GatewayError::Server(_) => 500,
            GatewayError::Config(_) | GatewayError::Cache(_) => 500,
            GatewayError::Provider(e) => e.status(),
        }
    }

    /// Machine-readable error type string, used in the HTTP error envelope.
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Auth(_) => "auth",
            GatewayError::RateLimitExceeded(_) => "rate_limit",
            GatewayError::RateLimitTimeout(_) => "rate_limit_timeout",
            GatewayError::Timeout(_) => "timeout",
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::Server(_) => "server",
            GatewayError::Provider(_) => "provider",
            GatewayError::VerificationUnparseable(_) => "verification_unparseable",
            GatewayError::Config(_) => "config",
            GatewayError::Validation(_) => "validation",
            GatewayError::Cache(_) => "cache",
            GatewayError::Serialization(_) => "serialization",
        }
    }

    /// Whether this error is safe to retry against a freshly-resolved
    /// previous-response-id, i.e. it was NOT caused by a bad cached id.
    /// Used by the prefix cache's eviction-on-bad-id policy.
    pub fn is_non_retriable_provider_error(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidRequest(_) | GatewayError::NotFound(_)
        ) || matches!(
            self,
            GatewayError::Provider(ProviderError::InvalidRequest { .. })
                | GatewayError::Provider(ProviderError::ModelNotFound { .. })
        )
    }
}
