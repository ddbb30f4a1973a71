//! Built-in `rtmp-live` handler.
//!
//! Implements connection lifecycle only: it keeps the session alive under
//! the idle deadline and logs its start and end. The chunk-stream protocol
//! engine replaces it through [`HandlerFactory`](super::HandlerFactory).

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::LocationConfig;
use crate::net::AcceptedConn;
use crate::routing::handler::Handler;
use crate::server::ServerContext;

/// Default handler for live sessions.
#[derive(Debug)]
pub struct LiveHandler {
    pattern: String,
}

impl LiveHandler {
    pub fn new(location: &LocationConfig) -> Self {
        Self {
            pattern: location.effective_pattern().to_string(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[async_trait]
impl Handler for LiveHandler {
    async fn handle(&self, mut conn: AcceptedConn, ctx: Arc<ServerContext>) {
        let id = conn.id();
        let peer = conn.peer_addr();
        tracing::info!(%id, %peer, pattern = %self.pattern, "session started");

        let mut buf = vec![0u8; ctx.config.read_buffer_size];
        let mut received: u64 = 0;

        loop {
            match conn.read_until_idle(&mut buf).await {
                Ok(0) => {
                    tracing::info!(%id, %peer, received, "peer closed session");
                    break;
                }
                Ok(n) => {
                    received += n as u64;
                    tracing::trace!(%id, bytes = n, "session data");
                }
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    tracing::info!(%id, %peer, received, "session idle timeout");
                    break;
                }
                Err(e) => {
                    tracing::warn!(%id, %peer, error = %e, "session read error");
                    break;
                }
            }
        }
    }
}
