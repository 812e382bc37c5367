//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:3000"
            max_connections = 64

            [gateway]
            mount_prefix = "/llm-proxy"

            [timeouts]
            connect_secs = 2
            response_secs = 60
            idle_secs = 90
            request_body_secs = 5

            [security]
            max_body_size = 1024

            [observability]
            log_level = "debug"
            metrics_enabled = true
            metrics_address = "127.0.0.1:9100"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.max_connections, 64);
        assert_eq!(config.gateway.mount_prefix, "/llm-proxy");
        assert_eq!(config.timeouts.idle_secs, 90);
        assert_eq!(config.security.max_body_size, 1024);
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = parse_config("[listener\nbind_address = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn reports_validation_failures() {
        let err = parse_config(
            r#"
            [timeouts]
            connect_secs = 0
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/llm-gateway.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("llm-gateway.toml");
        let shipped = load_config(&path).unwrap();
        let defaults = ProxyConfig::default();
        assert_eq!(shipped.listener.bind_address, defaults.listener.bind_address);
        assert_eq!(shipped.gateway.mount_prefix, defaults.gateway.mount_prefix);
        assert_eq!(shipped.timeouts.idle_secs, defaults.timeouts.idle_secs);
        assert_eq!(shipped.security.max_body_size, defaults.security.max_body_size);
    }
}
