//! LLM gateway binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                   LLM GATEWAY                     │
//!                     │                                                   │
//!  Client Request     │  ┌──────────┐   ┌────────┐   ┌───────────────┐   │
//!  ───────────────────┼─▶│ bounded  │──▶│ axum + │──▶│ proxy handler │   │
//!                     │  │ listener │   │ layers │   │ cors / target │   │
//!                     │  └──────────┘   └────────┘   │ headers / body│   │
//!                     │                              └───────┬───────┘   │
//!                     │                                      │ reqwest    │
//!  Client Response    │  ┌─────────────────────────┐         ▼            │
//!  ◀──────────────────┼──│ relay: buffered or SSE  │◀── upstream LLM API ◀┼──
//!                     │  └─────────────────────────┘                      │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use llm_gateway::config::{load_config, validation::validate_config, ConfigError};
use llm_gateway::lifecycle::signals::wait_for_signal;
use llm_gateway::net::BoundedListener;
use llm_gateway::observability::{logging, metrics};
use llm_gateway::{HttpServer, ProxyConfig, Shutdown, UpstreamConfig};

#[derive(Parser)]
#[command(name = "llm-gateway")]
#[command(about = "Reverse proxy for OpenAI-compatible LLM APIs", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("llm-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let upstream = UpstreamConfig::from_env();
    match upstream.base_url.as_deref() {
        Some(base) => {
            if url::Url::parse(base).is_err() {
                tracing::warn!(base_url = %base, "Upstream base URL does not parse; requests will fail");
            } else {
                tracing::info!(base_url = %base, "Upstream configured");
            }
        }
        None => tracing::warn!(
            "LLM_BASE_URL (or OPENAI_BASE_URL) is not set; proxied requests will return 500"
        ),
    }
    if upstream.api_key.is_some() {
        tracing::warn!(
            "Callers are not authenticated; any client that reaches this listener can use the upstream API key"
        );
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        response_timeout_secs = config.timeouts.response_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = BoundedListener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, upstream)?;
    let server_shutdown = shutdown.subscribe();
    let mut server_task = tokio::spawn(server.run(listener, server_shutdown));

    tokio::select! {
        _ = wait_for_signal() => {
            shutdown.trigger();
            server_task.await??;
        }
        result = &mut server_task => result??,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
