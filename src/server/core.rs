//! Server bootstrap and accept loop.
//!
//! # Responsibilities
//! - Apply configuration defaults at init (no sockets opened)
//! - Resolve locations to handlers and populate the Mux, in order
//! - Bind the listening socket and run the accept loop
//! - Absorb transient accept failures with exponential backoff; stop and
//!   propagate on anything else
//!
//! # Design Decisions
//! - Dispatch is fire-and-forget: one spawned task per connection, no
//!   JoinHandles retained, no concurrency cap at this layer (admission
//!   control would live in an `Accept` wrapper)
//! - The serve loop owns the listener, so it is closed by drop on every
//!   exit path

use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::net::{Accept, AcceptedConn, KeepAliveListener};
use crate::routing::{HandlerFactory, Mux};
use crate::server::backoff::AcceptBackoff;

/// Error type for server startup and serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Could not bind the listening socket.
    #[error("failed to bind port {port}: {source}")]
    Bind { port: u16, source: io::Error },

    /// The listener became unusable while serving.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),
}

/// Immutable server state shared with every connection task.
#[derive(Debug)]
pub struct ServerContext {
    pub config: ServerConfig,
    pub mux: Mux,
}

/// The RTMP front-end server: configuration plus the handler registry.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    mux: Mux,
}

impl Server {
    /// Build a server from `config`, applying defaults for unset fields.
    /// Purely in-memory; no socket is opened here.
    pub fn new(mut config: ServerConfig) -> Self {
        config.apply_defaults();
        Self {
            config,
            mux: Mux::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn mux(&self) -> &Mux {
        &self.mux
    }

    /// Resolve every configured location and register it in the Mux, in
    /// configuration order.
    ///
    /// A location whose handler name the factory does not know is logged
    /// and skipped; later locations still register. A duplicate pattern
    /// overwrites the earlier registration (see [`Mux::register`]).
    pub fn register_locations(&mut self, factory: &HandlerFactory) {
        for location in &self.config.locations {
            let pattern = location.effective_pattern();
            let name = location.effective_handler();

            match factory.resolve(name, location) {
                Some(handler) => self.mux.register(pattern, handler),
                None => {
                    tracing::warn!(handler = name, pattern, "handler not registered, skipping location");
                }
            }
        }
    }

    /// Bind the configured port and serve until a fatal accept error.
    ///
    /// Registers locations, binds `0.0.0.0:{port}`, wraps the listener with
    /// the keep-alive/idle policy, and blocks in the accept loop. Bind
    /// failure is fatal and returned immediately.
    pub async fn listen_and_serve(mut self, factory: &HandlerFactory) -> Result<(), ServerError> {
        self.register_locations(factory);

        if self.mux.is_empty() {
            tracing::warn!("no locations registered; connections will be dropped");
        }

        let port = self.config.port;
        let listener = TcpListener::bind(("0.0.0.0", port)).await.map_err(|source| {
            tracing::error!(port, error = %source, "failed to listen");
            ServerError::Bind { port, source }
        })?;

        tracing::info!(port, "listening for connections");

        let idle_timeout = Duration::from_secs(self.config.max_idle_secs);
        self.serve(KeepAliveListener::new(listener, idle_timeout))
            .await
    }

    /// Accept connections from `listener`, spawning one task per connection.
    ///
    /// Transient failures are retried with exponential backoff (5ms floor,
    /// 1s cap, reset after any success) and never surfaced beyond a warn
    /// log. Any other failure stops the loop and is returned; the listener
    /// is dropped (closed) on every exit.
    pub async fn serve<L: Accept>(self, mut listener: L) -> Result<(), ServerError> {
        let ctx = Arc::new(ServerContext {
            config: self.config,
            mux: self.mux,
        });
        let mut backoff = AcceptBackoff::new();

        loop {
            match listener.accept().await {
                Ok(conn) => {
                    backoff.reset();
                    tokio::spawn(connection_task(conn, Arc::clone(&ctx)));
                }
                Err(e) if is_transient_accept_error(&e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "accept error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(ServerError::Accept(e)),
            }
        }
    }
}

/// Entry point for a dispatched connection.
///
/// RTMP learns the application path only during the handshake, so dispatch
/// resolves the root pattern; the protocol engine re-consults the Mux once
/// it has parsed the connect command.
async fn connection_task(conn: AcceptedConn, ctx: Arc<ServerContext>) {
    match ctx.mux.lookup("/") {
        Some(handler) => handler.handle(conn, Arc::clone(&ctx)).await,
        None => {
            tracing::warn!(
                id = %conn.id(),
                peer = %conn.peer_addr(),
                "no handler registered, closing connection"
            );
        }
    }
}

/// Whether an accept error is a momentary condition worth retrying.
///
/// Connection-level failures and resource exhaustion are transient; anything
/// else (notably a closed listener) is fatal to the loop.
fn is_transient_accept_error(e: &io::Error) -> bool {
    if matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    ) {
        return true;
    }

    // EMFILE / ENFILE / ENOMEM / ENOBUFS have no stable ErrorKind.
    #[cfg(unix)]
    if matches!(
        e.raw_os_error(),
        Some(libc::EMFILE | libc::ENFILE | libc::ENOMEM | libc::ENOBUFS)
    ) {
        return true;
    }

    false
}
