//! Inbound body classification and forwarding.
//!
//! The inbound body is modelled as a three-way variant. Raw bodies are
//! forwarded byte for byte; JSON bodies are re-serialized and get a default
//! content type when the client declared none.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method};

use crate::http::error::GatewayError;

#[derive(Debug, Clone, PartialEq)]
pub enum InboundBody {
    Absent,
    Raw(Bytes),
    Structured(serde_json::Value),
}

impl InboundBody {
    /// Classify a fully-read inbound body.
    ///
    /// A declared non-JSON content type keeps the bytes raw. Without a
    /// declaration, or with a JSON one, the bytes are parsed and fall back to
    /// raw if they are not valid JSON.
    pub fn classify(bytes: Bytes, content_type: Option<&HeaderValue>) -> Self {
        if bytes.is_empty() {
            return Self::Absent;
        }

        let declared = content_type.map(|v| v.to_str().unwrap_or_default());
        if let Some(content_type) = declared {
            if !is_json_media_type(content_type) {
                return Self::Raw(bytes);
            }
        }

        match serde_json::from_slice(&bytes) {
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Raw(bytes),
        }
    }

    /// Bytes to send upstream. Sets `content-type: application/json` on the
    /// forwarded headers for structured bodies when none is present.
    pub fn into_forwarded(self, headers: &mut HeaderMap) -> Result<Option<Bytes>, GatewayError> {
        match self {
            Self::Absent => Ok(None),
            Self::Raw(bytes) => Ok(Some(bytes)),
            Self::Structured(value) => {
                let encoded = serde_json::to_vec(&value).map_err(|e| GatewayError::from_source(&e))?;
                if !headers.contains_key(header::CONTENT_TYPE) {
                    headers.insert(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    );
                }
                Ok(Some(Bytes::from(encoded)))
            }
        }
    }
}

/// GET and HEAD never forward a body.
pub fn method_carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}
