//! Unified provider error taxonomy and backend-specific mappers.
//!
//! Every adapter maps its backend's status codes / error payloads onto this
//! enum at the boundary; nothing above the adapter ever inspects a raw HTTP
//! status or SDK exception type.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("[{provider}] authentication failed: {message}")]
    Authentication { provider: String, message: String },

    #[error("[{provider}] rate limited{}", retry_after.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimit {
        provider: String,
        message: String,
        retry_after: Option<u64>,
    },

    #[error("[{provider}] timed out: {message}")]
    Timeout { provider: String, message: String },

    #[error("[{provider}] invalid request: {message}")]
    InvalidRequest { provider: String, message: String },

    #[error("[{provider}] model or resource not found: {message}")]
    ModelNotFound { provider: String, message: String },

    #[error("[{provider}] server error ({status}): {message}")]
    ServerError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("[{provider}] provider error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("[{provider}] network error: {message}")]
    Network { provider: String, message: String },

    #[error("[{provider}] serialization error: {message}")]
    Serialization { provider: String, message: String },

    #[error("[{provider}] configuration error: {message}")]
    Configuration { provider: String, message: String },

    #[error("[{provider}] streaming error at stage {stage:?}: {message}")]
    Streaming {
        provider: String,
        stage: Option<String>,
        message: String,
    },
}

impl ProviderError {
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Authentication { provider, .. }
            | ProviderError::RateLimit { provider, .. }
            | ProviderError::Timeout { provider, .. }
            | ProviderError::InvalidRequest { provider, .. }
            | ProviderError::ModelNotFound { provider, .. }
            | ProviderError::ServerError { provider, .. }
            | ProviderError::ApiError { provider, .. }
            | ProviderError::Network { provider, .. }
            | ProviderError::Serialization { provider, .. }
            | ProviderError::Configuration { provider, .. }
            | ProviderError::Streaming { provider, .. } => provider,
        }
    }

    /// Canonical HTTP status per the unified error taxonomy table.
    pub fn status(&self) -> u16 {
        match self {
            ProviderError::Authentication { .. } => 401,
            ProviderError::RateLimit { .. } => 429,
            ProviderError::Timeout { .. } => 504,
            ProviderError::InvalidRequest { .. } => 400,
            ProviderError::ModelNotFound { .. } => 404,
            ProviderError::ServerError { status, .. } => *status,
            ProviderError::ApiError { status, .. } => *status,
            ProviderError::Network { .. } | ProviderError::Streaming { .. } => 502,
            ProviderError::Serialization { .. } | ProviderError::Configuration { .. } => 500,
        }
    }

    /// Provider/timeout/server-class errors abort an engine outright; they
    /// are never retried internally (the adapter owns retry policy).
    pub fn is_fatal(&self) -> bool {
        true
    }

    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication { provider: provider.into(), message: message.into() }
    }

    pub fn rate_limit(provider: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            provider: provider.into(),
            message: "rate limited by upstream".to_string(),
            retry_after,
        }
    }

    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout { provider: provider.into(), message: message.into() }
    }

    pub fn invalid_request(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRequest { provider: provider.into(), message: message.into() }
    }

    pub fn model_not_found(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelNotFound { provider: provider.into(), message: message.into() }
    }

    pub fn server_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ServerError { provider: provider.into(), status, message: message.into() }
    }

    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError { provider: provider.into(), status, message: message.into() }
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network { provider: provider.into(), message: message.into() }
    }

    pub fn serialization(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization { provider: provider.into(), message: message.into() }
    }

    pub fn configuration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration { provider: provider.into(), message: message.into() }
    }

    pub fn streaming(
        provider: impl Into<String>,
        stage: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Streaming { provider: provider.into(), stage, message: message.into() }
    }

    /// Maps a plain HTTP status code into the unified taxonomy. Used by
    /// adapters whose backend gives no richer error payload to parse.
    pub fn from_http_status(provider: &str, status: u16, body: &str) -> Self {
        match status {
            400 => Self::invalid_request(provider, format!("bad request: {body}")),
            401 | 403 => Self::authentication(provider, "invalid or missing credentials"),
            404 => Self::model_not_found(provider, "model or endpoint not found"),
            429 => Self::rate_limit(provider, None),
            500..=599 => Self::server_error(provider, status, format!("upstream server error: {body}")),
            _ => Self::api_error(provider, status, body),
        }
    }
}
