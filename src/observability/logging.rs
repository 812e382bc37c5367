//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level when set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(log_level: &str) -> String {
    format!("llm_gateway={},tower_http={}", log_level, log_level)
}

/// Install the global tracing subscriber.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
