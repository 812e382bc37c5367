//! CORS preflight short-circuit.
//!
//! Preflight is answered locally with a fixed permissive policy. It runs
//! ahead of configuration checks so browsers can still probe the gateway when
//! the upstream is not configured.

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Response, StatusCode},
};

pub const ALLOW_METHODS: &str = "GET,DELETE,PATCH,POST,PUT,OPTIONS";

pub const ALLOW_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, \
Content-Length, Content-MD5, Content-Type, Date, X-Api-Version, Authorization, X-User-ID";

pub fn is_preflight(method: &Method) -> bool {
    method == Method::OPTIONS
}

/// 200 with the fixed CORS policy and no body.
pub fn preflight_response() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}
