//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the proxy handler under the mount prefix
//! - Wire up middleware (request ID, tracing, panic catching, body limits)
//! - Build the shared upstream HTTP client
//! - Serve on a bounded listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use thiserror::Error;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::RequestBodyTimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ProxyConfig, TimeoutConfig, UpstreamConfig};
use crate::http::error::panic_response;
use crate::http::proxy::proxy_handler;
use crate::http::request::MakeRequestUuid;
use crate::net::BoundedListener;

/// Error type for server construction.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamConfig>,
    pub client: reqwest::Client,
    pub mount_prefix: Arc<str>,
    pub timeouts: TimeoutConfig,
    pub max_body_size: usize,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig, upstream: UpstreamConfig) -> Result<Self, ServerError> {
        let mut client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .redirect(reqwest::redirect::Policy::none());
        if !config.gateway.use_system_proxy {
            client = client.no_proxy();
        }

        let state = AppState {
            upstream: Arc::new(upstream),
            client: client.build()?,
            mount_prefix: Arc::from(config.gateway.normalized_prefix()),
            timeouts: config.timeouts.clone(),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let prefix = config.gateway.normalized_prefix();
        let routes = if prefix.is_empty() {
            Router::new()
                .route("/", any(proxy_handler))
                .route("/{*path}", any(proxy_handler))
        } else {
            Router::new()
                .route(prefix, any(proxy_handler))
                .route(&format!("{}/", prefix), any(proxy_handler))
                .route(&format!("{}/{{*path}}", prefix), any(proxy_handler))
        };

        routes
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(RequestBodyTimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_body_secs,
            )))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving the gateway without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: BoundedListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_prefix = %self.config.gateway.mount_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
