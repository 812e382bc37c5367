//! Upstream target resolution.
//!
//! # Responsibilities
//! - Split the inbound path after the mount prefix into segments
//! - Join the segments onto the configured upstream base
//! - Keep the resolved URL under the base
//!
//! # Design Decisions
//! - Segments are appended textually, never resolved as a relative
//!   reference, so a segment like `https:` cannot swap the host
//! - Dot segments that climb above the base path are rejected: the
//!   credential is only ever sent beneath the configured base

use url::Url;

use crate::http::error::GatewayError;

/// Path segments following the mount prefix, in order and still
/// percent-encoded as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    segments: Vec<String>,
    query: Option<String>,
}

impl TargetPath {
    pub fn new(segments: Vec<String>, query: Option<String>) -> Self {
        Self { segments, query }
    }

    /// Extract the segments after `prefix` from a request path. Returns
    /// `None` when the path is not under the prefix.
    pub fn from_request_path(path: &str, prefix: &str, query: Option<&str>) -> Option<Self> {
        let prefix = prefix.trim_end_matches('/');
        let rest = path.strip_prefix(prefix)?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }

        let rest = rest.trim_start_matches('/');
        let segments = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').map(str::to_string).collect()
        };

        Some(Self::new(segments, query.map(str::to_string)))
    }

    /// Segments re-joined with `/`.
    pub fn joined(&self) -> String {
        self.segments.join("/")
    }

    /// Resolve against the upstream base address.
    pub fn resolve(&self, base_url: Option<&str>) -> Result<Url, GatewayError> {
        let base_url = base_url.ok_or_else(GatewayError::missing_base_url)?;
        resolve_target(base_url, self)
    }
}

fn resolve_target(base_url: &str, path: &TargetPath) -> Result<Url, GatewayError> {
    let base_text = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };

    let base = Url::parse(&base_text).map_err(|e| {
        GatewayError::upstream(format!("invalid upstream base URL: {}", e))
    })?;
    if base.cannot_be_a_base() {
        return Err(GatewayError::upstream(
            "invalid upstream base URL: not a hierarchical URL",
        ));
    }

    let mut target_text = format!("{}{}", base.as_str(), path.joined());
    if let Some(query) = path.query.as_deref().filter(|q| !q.is_empty()) {
        target_text.push('?');
        target_text.push_str(query);
    }

    let target = Url::parse(&target_text)
        .map_err(|e| GatewayError::upstream(format!("invalid upstream target: {}", e)))?;

    if target.origin() != base.origin() || !target.path().starts_with(base.path()) {
        return Err(GatewayError::upstream(
            "target path escapes the upstream base",
        ));
    }

    Ok(target)
}
