//! Upstream settings read from the process environment.
//!
//! The base address and credential are looked up exactly once, when the
//! process starts, and shared read-only afterwards. `from_lookup` takes any
//! lookup function so callers can build a config without touching the real
//! environment.

use std::fmt;

use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;

/// Primary and fallback variables for the upstream base address.
pub const BASE_URL_VARS: [&str; 2] = ["LLM_BASE_URL", "OPENAI_BASE_URL"];

/// Primary and fallback variables for the upstream bearer credential.
pub const API_KEY_VARS: [&str; 2] = ["LLM_API_KEY", "OPENAI_API_KEY"];

/// Server-held upstream credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `Bearer <key>` header value, flagged sensitive so it is never indexed
    /// by HPACK or shown in debug output.
    pub fn bearer_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Upstream base address and optional credential.
#[derive(Debug, Clone, Default)]
pub struct UpstreamConfig {
    /// Base address requests are forwarded to. `None` makes every proxied
    /// request fail with a configuration error.
    pub base_url: Option<String>,

    /// Bearer credential injected into every forwarded request.
    pub api_key: Option<ApiKey>,
}

impl UpstreamConfig {
    pub fn new(base_url: Option<String>, api_key: Option<ApiKey>) -> Self {
        Self { base_url, api_key }
    }

    /// Read the upstream settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the settings from an arbitrary variable lookup. Empty values
    /// count as unset, so the fallback variable is consulted.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.is_empty())
        };

        Self {
            base_url: first_set(&BASE_URL_VARS),
            api_key: first_set(&API_KEY_VARS).map(ApiKey::new),
        }
    }

    /// Remove every occurrence of the credential from a message bound for a
    /// client or a log line.
    pub fn redact(&self, message: &str) -> String {
        match &self.api_key {
            Some(key) if !key.expose().is_empty() => message.replace(key.expose(), "[redacted]"),
            _ => message.to_string(),
        }
    }
}
