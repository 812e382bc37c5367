//! TCP listener implementation with backpressure.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections for `axum::serve`
//! - Enforce max_connections limit via semaphore
//! - Graceful handling of accept errors

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    Bind(#[source] io::Error),
}

/// A bounded TCP listener that limits concurrent connections.
///
/// Uses a semaphore to enforce `max_connections`. When the limit is reached,
/// new connections wait in the kernel backlog until a slot becomes available.
pub struct BoundedListener {
    /// The underlying TCP listener.
    inner: TcpListener,
    /// Semaphore to limit concurrent connections.
    connection_limit: Arc<Semaphore>,
    /// Configured maximum connections.
    max_connections: usize,
}

impl BoundedListener {
    /// Bind to the configured address with connection limits.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let addr: SocketAddr = config
            .bind_address
            .parse()
            .map_err(|e| ListenerError::Bind(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

        let listener = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;

        let bounded = Self::new(listener, config.max_connections);
        tracing::info!(
            address = %bounded.local_addr().map_err(ListenerError::Bind)?,
            max_connections = config.max_connections,
            "Listener bound"
        );
        Ok(bounded)
    }

    /// Wrap an already bound listener.
    pub fn new(inner: TcpListener, max_connections: usize) -> Self {
        Self {
            inner,
            connection_limit: Arc::new(Semaphore::new(max_connections)),
            max_connections,
        }
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Get current available connection slots.
    pub fn available_permits(&self) -> usize {
        self.connection_limit.available_permits()
    }

    /// Get configured maximum connections.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

impl axum::serve::Listener for BoundedListener {
    type Io = PermittedStream;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        // Acquire permit first (backpressure)
        let permit = self
            .connection_limit
            .clone()
            .acquire_owned()
            .await
            .expect("Semaphore closed unexpectedly");

        loop {
            match self.inner.accept().await {
                Ok((stream, addr)) => {
                    tracing::trace!(
                        peer_addr = %addr,
                        available_permits = self.connection_limit.available_permits(),
                        "Connection accepted"
                    );
                    return (
                        PermittedStream {
                            stream,
                            _permit: permit,
                        },
                        addr,
                    );
                }
                Err(e) if is_connection_error(&e) => continue,
                Err(e) => {
                    // Usually fd exhaustion; back off instead of spinning.
                    tracing::error!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    fn local_addr(&self) -> io::Result<Self::Addr> {
        self.inner.local_addr()
    }
}

fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}

/// An accepted connection holding its connection slot.
///
/// When dropped, the slot is released back to the listener.
#[derive(Debug)]
pub struct PermittedStream {
    stream: TcpStream,
    _permit: OwnedSemaphorePermit,
}

impl AsyncRead for PermittedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for PermittedStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.stream.is_write_vectored()
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }
}
