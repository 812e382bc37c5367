//! LLM gateway library.
//!
//! A single-endpoint reverse proxy in front of an OpenAI-compatible API.
//! The upstream credential stays on the server; event streams are relayed
//! as they arrive.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::{ProxyConfig, UpstreamConfig};
pub use http::{GatewayError, HttpServer};
pub use lifecycle::Shutdown;
