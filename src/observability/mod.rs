//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy handler produces:
//!     → logging.rs (structured log events, request ID on each)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The upstream credential never appears in a log field
//! - Request ID flows from the client (or the ID layer) to the upstream

pub mod logging;
pub mod metrics;
