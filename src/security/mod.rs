//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request headers:
//!     → headers.rs (strip hop-by-hop, replace authorization)
//!     → Forwarded upstream
//!
//! Upstream response headers:
//!     → headers.rs (strip transfer framing)
//!     → Relayed to client
//! ```
//!
//! # Design Decisions
//! - No trust in client credentials: only the server-held key goes upstream
//! - Body size limits are enforced by the HTTP layer before the handler runs

pub mod headers;
