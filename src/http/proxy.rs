//! The proxy handler.
//!
//! Every request under the mount prefix goes through `proxy_handler`:
//! preflight short-circuit, target resolution, header sanitation, body
//! materialization, upstream dispatch, response relay. Any failure is
//! redacted and rendered by `GatewayError`.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, Response},
    response::IntoResponse,
};

use crate::http::body::{method_carries_body, InboundBody};
use crate::http::cors::{is_preflight, preflight_response};
use crate::http::error::GatewayError;
use crate::http::request::{read_body, request_id};
use crate::http::response::relay;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::TargetPath;
use crate::security::headers::forward_request_headers;

/// Main proxy handler.
pub async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Response<Body> {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if is_preflight(&method) {
        tracing::debug!(request_id = %request_id, path = %path, "Answering CORS preflight");
        let response = preflight_response();
        metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
        return response;
    }

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    let response = match forward(&state, request).await {
        Ok(response) => response,
        Err(err) => {
            let err = err.redacted(&state.upstream);
            match &err {
                GatewayError::Configuration(_) => {
                    tracing::error!(request_id = %request_id, error = %err, "Gateway misconfigured");
                    metrics::record_upstream_error(err.kind());
                }
                GatewayError::Upstream(_) => {
                    tracing::warn!(request_id = %request_id, path = %path, error = %err, "Upstream error");
                    metrics::record_upstream_error(err.kind());
                }
                GatewayError::PayloadTooLarge(_) => {
                    tracing::debug!(request_id = %request_id, path = %path, error = %err, "Request body rejected")
                }
            }
            err.into_response()
        }
    };

    tracing::debug!(
        request_id = %request_id,
        status = %response.status(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Response headers relayed"
    );
    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn forward(state: &AppState, request: Request<Body>) -> Result<Response<Body>, GatewayError> {
    let (parts, body) = request.into_parts();

    // Only mounted under the prefix, so the `None` branch is a guard.
    let target = TargetPath::from_request_path(
        parts.uri.path(),
        &state.mount_prefix,
        parts.uri.query(),
    )
    .ok_or_else(|| GatewayError::upstream("request path is outside the gateway mount"))?;
    let url = target.resolve(state.upstream.base_url.as_deref())?;

    let mut headers = forward_request_headers(&parts.headers, &state.upstream)?;

    let body = if method_carries_body(&parts.method) {
        let bytes = read_body(body, state.max_body_size).await?;
        InboundBody::classify(bytes, parts.headers.get(header::CONTENT_TYPE))
            .into_forwarded(&mut headers)?
    } else {
        None
    };

    tracing::debug!(method = %parts.method, target = %url, "Dispatching upstream");

    let mut upstream_request = state
        .client
        .request(parts.method.clone(), url)
        .headers(headers);
    if let Some(bytes) = body {
        upstream_request = upstream_request.body(bytes);
    }

    let response_timeout = Duration::from_secs(state.timeouts.response_secs);
    let upstream = tokio::time::timeout(response_timeout, upstream_request.send())
        .await
        .map_err(|_| {
            GatewayError::upstream(format!(
                "upstream did not respond within {}s",
                response_timeout.as_secs()
            ))
        })?
        .map_err(|e| GatewayError::from_source(&e))?;

    relay(
        upstream,
        response_timeout,
        Duration::from_secs(state.timeouts.idle_secs),
    )
    .await
}
