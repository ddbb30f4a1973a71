//! Accepted-connection handle and lifecycle identity.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::Instant;

/// Global atomic counter for connection IDs.
/// Relaxed ordering is sufficient: we only need uniqueness.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection, used in log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// An accepted connection with its liveness policy attached.
///
/// Carries the idle deadline stamped at accept time. The deadline moves
/// forward on activity via [`refresh_deadline`](Self::refresh_deadline);
/// the owning task is responsible for honoring it.
#[derive(Debug)]
pub struct AcceptedConn {
    stream: TcpStream,
    peer_addr: SocketAddr,
    id: ConnectionId,
    idle_timeout: Duration,
    deadline: Instant,
}

impl AcceptedConn {
    /// Wrap a freshly accepted stream, stamping the idle deadline now.
    pub fn new(stream: TcpStream, peer_addr: SocketAddr, idle_timeout: Duration) -> Self {
        Self {
            stream,
            peer_addr,
            id: ConnectionId::new(),
            idle_timeout,
            deadline: Instant::now() + idle_timeout,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// The instant after which this connection counts as idle.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Push the idle deadline forward from now.
    pub fn refresh_deadline(&mut self) {
        self.deadline = Instant::now() + self.idle_timeout;
    }

    /// Whether the idle deadline has already passed.
    pub fn idle_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Read into `buf`, failing with `ErrorKind::TimedOut` once the idle
    /// deadline passes. A successful read of at least one byte refreshes
    /// the deadline.
    pub async fn read_until_idle(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match tokio::time::timeout_at(self.deadline, self.stream.read(buf)).await {
            Ok(result) => {
                let n = result?;
                if n > 0 {
                    self.refresh_deadline();
                }
                Ok(n)
            }
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "connection idle timeout",
            )),
        }
    }

    /// Access the underlying stream, e.g. for protocol I/O.
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Unwrap into the raw stream, discarding the liveness policy.
    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}
