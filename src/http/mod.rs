//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → proxy.rs
//!         → cors.rs (OPTIONS answered here, nothing else runs)
//!         → routing::target (path after the mount prefix → upstream URL)
//!         → security::headers (strip hop-by-hop, inject credential)
//!         → request.rs + body.rs (read and classify the body)
//!         → upstream dispatch (reqwest)
//!         → response.rs (buffered or streamed relay)
//!     → error.rs on any failure
//!     → Send to client
//! ```

pub mod body;
pub mod cors;
pub mod error;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use error::GatewayError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, ServerError};
