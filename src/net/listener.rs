//! TCP listener wrapper enforcing connection liveness policy.
//!
//! # Responsibilities
//! - Enable TCP keep-alive on every accepted connection
//! - Stamp the idle deadline on every accepted connection
//! - Pass accept errors through unchanged (classification happens in the
//!   accept loop)
//!
//! # Design Decisions
//! - Close is RAII: the serve loop owns the listener, so every loop exit
//!   drops (closes) it exactly once
//! - Keep-alive is best-effort; a setsockopt failure is logged, not fatal

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use socket2::SockRef;
use tokio::net::TcpListener;

use crate::net::conn::AcceptedConn;

/// Source of accepted connections for the serve loop.
///
/// Implemented by [`KeepAliveListener`] and by test doubles that inject
/// accept failures.
#[async_trait]
pub trait Accept: Send {
    /// Accept the next connection.
    async fn accept(&mut self) -> io::Result<AcceptedConn>;
}

/// Wraps a [`TcpListener`] so every accepted connection comes back with
/// keep-alive enabled and an idle deadline already set.
#[derive(Debug)]
pub struct KeepAliveListener {
    inner: TcpListener,
    idle_timeout: Duration,
}

impl KeepAliveListener {
    pub fn new(inner: TcpListener, idle_timeout: Duration) -> Self {
        Self {
            inner,
            idle_timeout,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

#[async_trait]
impl Accept for KeepAliveListener {
    async fn accept(&mut self) -> io::Result<AcceptedConn> {
        let (stream, peer_addr) = self.inner.accept().await?;

        if let Err(e) = SockRef::from(&stream).set_keepalive(true) {
            tracing::warn!(peer = %peer_addr, error = %e, "could not enable keep-alive");
        }

        Ok(AcceptedConn::new(stream, peer_addr, self.idle_timeout))
    }
}
