//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → Hand off to HTTP layer (axum::serve)
//! ```
//!
//! # Design Decisions
//! - Bounded accept prevents resource exhaustion
//! - The connection slot lives inside the accepted stream, so it is released
//!   whenever hyper drops the connection

pub mod listener;

pub use listener::{BoundedListener, ListenerError, PermittedStream};
