//! Upstream response relay.
//!
//! # Responsibilities
//! - Copy the upstream status verbatim
//! - Copy upstream headers minus transport framing
//! - Relay event streams chunk by chunk as they arrive
//! - Buffer every other body and send it in one piece
//!
//! # Design Decisions
//! - One chunk in flight: the next upstream chunk is only polled after the
//!   previous one was handed to the client connection
//! - Dropping the client body drops the upstream response, which releases
//!   the upstream connection on every exit path
//! - A stream that fails midway aborts the client body; the status line has
//!   already been sent

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, Response},
};
use futures_util::{stream, Stream, StreamExt};

use crate::http::error::GatewayError;
use crate::observability::metrics;
use crate::security::headers::relay_response_headers;

const EVENT_STREAM: &str = "text/event-stream";

/// How the upstream body will be relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    Streaming,
    Buffered,
}

impl RelayMode {
    /// Pick the mode from the upstream `content-type`.
    pub fn for_content_type(content_type: Option<&HeaderValue>) -> Self {
        let is_event_stream = content_type
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase().contains(EVENT_STREAM))
            .unwrap_or(false);
        if is_event_stream {
            Self::Streaming
        } else {
            Self::Buffered
        }
    }
}

/// Turn an upstream response into the client response.
///
/// `body_timeout` bounds reading a buffered body; `idle_timeout` bounds the
/// gap between two streamed chunks.
pub async fn relay(
    upstream: reqwest::Response,
    body_timeout: Duration,
    idle_timeout: Duration,
) -> Result<Response<Body>, GatewayError> {
    let status = upstream.status();
    let mut headers = relay_response_headers(upstream.headers());
    let mode = RelayMode::for_content_type(upstream.headers().get(header::CONTENT_TYPE));

    let body = match mode {
        RelayMode::Streaming => {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
            Body::from_stream(relay_chunks(upstream.bytes_stream(), idle_timeout))
        }
        RelayMode::Buffered => {
            let bytes = tokio::time::timeout(body_timeout, upstream.bytes())
                .await
                .map_err(|_| {
                    GatewayError::upstream(format!(
                        "upstream body not received within {}s",
                        body_timeout.as_secs()
                    ))
                })?
                .map_err(|e| GatewayError::from_source(&e))?;
            Body::from(bytes)
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Forward upstream chunks in order, failing if the upstream stays silent for
/// longer than `idle_timeout`. The stream ends after the first error.
pub fn relay_chunks<S, E>(
    chunks: S,
    idle_timeout: Duration,
) -> impl Stream<Item = Result<Bytes, GatewayError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + 'static,
{
    stream::unfold(Some(Box::pin(chunks)), move |state| async move {
        let mut chunks = state?;
        match tokio::time::timeout(idle_timeout, chunks.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(chunks))),
            Ok(Some(Err(e))) => {
                let err = GatewayError::from_source(&e);
                tracing::warn!(error = %err, "Upstream stream failed");
                metrics::record_upstream_error(err.kind());
                Some((Err(err), None))
            }
            Ok(None) => None,
            Err(_) => {
                tracing::warn!(idle_secs = idle_timeout.as_secs(), "Upstream stream went idle");
                metrics::record_upstream_error("upstream");
                Some((
                    Err(GatewayError::upstream("upstream stream idle timeout")),
                    None,
                ))
            }
        }
    })
}
