//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is
//! collected so an operator sees the whole list in one run.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("gateway.mount_prefix '{0}' must start with '/'")]
    RelativePrefix(String),
}

/// Check a configuration, returning every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        &mut errors,
        "listener.bind_address",
        &config.listener.bind_address,
    );
    check_positive(
        &mut errors,
        "listener.max_connections",
        config.listener.max_connections as u64,
    );

    let prefix = &config.gateway.mount_prefix;
    if !prefix.is_empty() && !prefix.starts_with('/') {
        errors.push(ValidationError::RelativePrefix(prefix.clone()));
    }

    let timeouts = &config.timeouts;
    check_positive(&mut errors, "timeouts.connect_secs", timeouts.connect_secs);
    check_positive(&mut errors, "timeouts.response_secs", timeouts.response_secs);
    check_positive(&mut errors, "timeouts.idle_secs", timeouts.idle_secs);
    check_positive(
        &mut errors,
        "timeouts.request_body_secs",
        timeouts.request_body_secs,
    );

    check_positive(
        &mut errors,
        "security.max_body_size",
        config.security.max_body_size as u64,
    );

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::Zero { field });
    }
}
