//! Request identification and inbound body reading.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) for requests that arrive without one
//! - Read the inbound body for methods that forward one
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing; it travels upstream
//!   with the rest of the client headers
//! - Body size is bounded by the body limit layer before the handler reads it

use std::error::Error as StdError;

use axum::{
    body::{Body, Bytes},
    http::{HeaderName, HeaderValue, Request},
};
use http_body_util::LengthLimitError;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::error::GatewayError;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Request ID of an inbound request, or `"unknown"` before the ID layer ran.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Read the whole inbound body, up to `limit` bytes.
///
/// Bodies without a declared length pass the limit layer and are cut off
/// here; those are reported as 413 like the declared ones.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, GatewayError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        if exceeds_limit(&e) {
            GatewayError::PayloadTooLarge(format!("request body exceeds {} bytes", limit))
        } else {
            GatewayError::upstream(format!("failed to read request body: {}", e))
        }
    })
}

fn exceeds_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
