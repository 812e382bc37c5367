//! Gateway error type and its HTTP rendering.
//!
//! A missing upstream base is reported as 500 before any network I/O, and an
//! inbound body over the size limit as 413. Everything else that goes wrong
//! while proxying is a 502 with the underlying message. Messages must be
//! redacted against the upstream credential before they reach a client
//! (see `GatewayError::redacted`).

use std::any::Any;
use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::config::UpstreamConfig;

/// Label carried by every 502 body.
pub const UPSTREAM_ERROR_LABEL: &str = "Upstream proxy error";

/// Body of the 500 returned when no upstream base address is configured.
pub const MISSING_BASE_URL_MESSAGE: &str = "Missing env var LLM_BASE_URL (or OPENAI_BASE_URL)";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Required configuration is missing.
    #[error("{0}")]
    Configuration(String),

    /// Contacting or reading from the upstream failed.
    #[error("{0}")]
    Upstream(String),

    /// The inbound body exceeded `security.max_body_size`.
    #[error("{0}")]
    PayloadTooLarge(String),
}

impl GatewayError {
    pub fn missing_base_url() -> Self {
        Self::Configuration(MISSING_BASE_URL_MESSAGE.to_string())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Build an upstream error from an error and its whole source chain, so
    /// that e.g. "error sending request" carries the DNS or connect cause.
    pub fn from_source(err: &(dyn StdError + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        Self::Upstream(message)
    }

    /// Metric label for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Upstream(_) => "upstream",
            Self::PayloadTooLarge(_) => "payload_too_large",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Strip the upstream credential from the message.
    pub fn redacted(self, upstream: &UpstreamConfig) -> Self {
        match self {
            Self::Configuration(message) => Self::Configuration(upstream.redact(&message)),
            Self::Upstream(message) => Self::Upstream(upstream.redact(&message)),
            Self::PayloadTooLarge(message) => Self::PayloadTooLarge(upstream.redact(&message)),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Configuration(message) | Self::PayloadTooLarge(message) => {
                json!({ "error": message })
            }
            Self::Upstream(message) => json!({
                "error": UPSTREAM_ERROR_LABEL,
                "message": message,
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// Render a handler panic in the same shape as an upstream failure.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "request handler panicked".to_string()
    };
    tracing::error!(panic = %message, "Handler panicked");
    GatewayError::upstream("internal gateway failure").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;
    use std::fmt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[derive(Debug)]
    struct Layered(&'static str, Option<Box<Layered>>);

    impl fmt::Display for Layered {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Layered {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|e| e as &(dyn StdError + 'static))
        }
    }

    #[tokio::test]
    async fn missing_base_url_is_500() {
        let response = GatewayError::missing_base_url().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Missing env var LLM_BASE_URL (or OPENAI_BASE_URL)" })
        );
    }

    #[tokio::test]
    async fn upstream_error_is_502_with_label() {
        let response = GatewayError::upstream("connection refused").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Upstream proxy error", "message": "connection refused" })
        );
    }

    #[test]
    fn source_chain_is_flattened() {
        let err = Layered(
            "error sending request",
            Some(Box::new(Layered(
                "dns error",
                Some(Box::new(Layered("no such host", None))),
            ))),
        );
        let GatewayError::Upstream(message) = GatewayError::from_source(&err) else {
            panic!("expected upstream error");
        };
        assert_eq!(message, "error sending request: dns error: no such host");
    }

    #[test]
    fn redaction_applies_to_both_kinds() {
        let upstream = UpstreamConfig::new(None, Some(ApiKey::new("sk-123")));
        let err = GatewayError::upstream("rejected sk-123").redacted(&upstream);
        assert_eq!(err.to_string(), "rejected [redacted]");
    }

    #[tokio::test]
    async fn payload_too_large_is_413() {
        let err = GatewayError::PayloadTooLarge("request body exceeds 8 bytes".into());
        assert_eq!(err.kind(), "payload_too_large");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "request body exceeds 8 bytes" })
        );
    }

    #[tokio::test]
    async fn panic_renders_as_upstream_error() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Upstream proxy error");
    }
}
