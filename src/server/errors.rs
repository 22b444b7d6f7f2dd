//! Translates a core [`GatewayError`] into the wire error envelope from §7:
//! `{status, error:{message, type, code, provider?}}`, logged at `warn`
//! (client-class, 4xx) or `error` (server-class, 5xx) via `tracing`.

use crate::core::errors::GatewayError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    status: u16,
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: String,
    #[serde(rename = "type")]
    kind: &'a str,
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'a str>,
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(GatewayError::status_code(self)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = ResponseError::status_code(self);
        let provider = match self {
            GatewayError::Provider(e) => Some(e.provider()),
            _ => None,
        };
        let body = ErrorEnvelope {
            status: status.as_u16(),
            error: ErrorBody {
                message: self.to_string(),
                kind: self.error_type(),
                code: status.as_u16(),
                provider,
            },
        };
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_maps_to_400() {
        let err = GatewayError::InvalidRequest("bad model id".to_string());
        assert_eq!(ResponseError::status_code(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rate_limit_exceeded_maps_to_429() {
        let err = GatewayError::RateLimitExceeded("bucket exhausted".to_string());
        assert_eq!(ResponseError::status_code(&err), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn server_error_maps_to_500() {
        let err = GatewayError::Server("boom".to_string());
        assert_eq!(ResponseError::status_code(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
