//! Header sanitation and credential injection.
//!
//! # Responsibilities
//! - Strip hop-by-hop and framing headers from forwarded requests
//! - Flatten repeated request headers into one comma-joined value
//! - Replace any client `authorization` with the server-held credential
//! - Strip framing headers from relayed responses
//!
//! # Design Decisions
//! - The client's credentials never reach the upstream
//! - `accept-encoding` is dropped so the upstream answers uncompressed; the
//!   relay strips `content-encoding` and does not decode bodies

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::config::UpstreamConfig;
use crate::http::error::GatewayError;

/// Request headers never forwarded upstream.
pub const REQUEST_EXCLUDED: [HeaderName; 10] = [
    header::HOST,
    header::CONNECTION,
    header::CONTENT_LENGTH,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::ACCEPT_ENCODING,
];

/// Upstream response headers never relayed to the client.
pub const RESPONSE_EXCLUDED: [HeaderName; 2] = [header::TRANSFER_ENCODING, header::CONTENT_ENCODING];

/// Build the header set for the forwarded request.
pub fn forward_request_headers(
    inbound: &HeaderMap,
    upstream: &UpstreamConfig,
) -> Result<HeaderMap, GatewayError> {
    let mut forwarded = HeaderMap::with_capacity(inbound.keys_len());

    for name in inbound.keys() {
        if REQUEST_EXCLUDED.contains(name) {
            continue;
        }
        if let Some(value) = flatten(inbound, name) {
            forwarded.insert(name.clone(), value);
        }
    }

    if let Some(key) = &upstream.api_key {
        let bearer = key
            .bearer_header()
            .map_err(|_| GatewayError::upstream("configured upstream API key is not a valid header value"))?;
        forwarded.insert(header::AUTHORIZATION, bearer);
    }

    Ok(forwarded)
}

/// Copy upstream response headers for the client, keeping repeated values.
pub fn relay_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::with_capacity(upstream.keys_len());
    for (name, value) in upstream {
        if RESPONSE_EXCLUDED.contains(name) {
            continue;
        }
        relayed.append(name.clone(), value.clone());
    }
    relayed
}

/// Join every value of `name` with `,`. Empty values are skipped.
fn flatten(headers: &HeaderMap, name: &HeaderName) -> Option<HeaderValue> {
    let mut values = headers
        .get_all(name)
        .iter()
        .filter(|v| !v.is_empty());

    let first = values.next()?;
    let mut joined = first.as_bytes().to_vec();
    let mut sensitive = first.is_sensitive();
    for value in values {
        joined.push(b',');
        joined.extend_from_slice(value.as_bytes());
        sensitive |= value.is_sensitive();
    }

    let mut value = HeaderValue::from_bytes(&joined).ok()?;
    value.set_sensitive(sensitive);
    Some(value)
}
