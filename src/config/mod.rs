//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!
//! process environment
//!     → upstream.rs (LLM_BASE_URL / LLM_API_KEY and fallbacks)
//!     → UpstreamConfig (read once, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults so the gateway runs without a file
//! - A missing upstream base is not a startup error; each proxied request
//!   reports it instead, so CORS preflight keeps working

pub mod loader;
pub mod schema;
pub mod upstream;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    GatewayConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, SecurityConfig, TimeoutConfig,
};
pub use upstream::{ApiKey, UpstreamConfig};
