//! Shared test doubles for accept-loop and server tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::Instant;

use rtmp_edge::net::{Accept, AcceptedConn, ConnectionId};
use rtmp_edge::server::ServerContext;
use rtmp_edge::Handler;

/// Create a connected loopback pair and wrap the server side as an
/// [`AcceptedConn`]. The client half is returned so the test can keep the
/// connection alive (or drive it).
pub async fn loopback_conn(idle_timeout: Duration) -> (AcceptedConn, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).await.unwrap();
    let (stream, peer) = listener.accept().await.unwrap();
    (AcceptedConn::new(stream, peer, idle_timeout), client)
}

/// Scripted accept source: yields a fixed sequence of connections and
/// errors, then reports itself closed. Records the instant of every accept
/// call and counts drops so tests can assert close-exactly-once.
pub struct ScriptedListener {
    script: VecDeque<io::Result<AcceptedConn>>,
    accept_times: Arc<Mutex<Vec<Instant>>>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedListener {
    pub fn new(script: Vec<io::Result<AcceptedConn>>) -> Self {
        Self {
            script: script.into(),
            accept_times: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Instants at which the serve loop called accept.
    pub fn accept_times(&self) -> Arc<Mutex<Vec<Instant>>> {
        Arc::clone(&self.accept_times)
    }

    /// Number of times the listener has been dropped (closed).
    pub fn close_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closed)
    }
}

#[async_trait]
impl Accept for ScriptedListener {
    async fn accept(&mut self) -> io::Result<AcceptedConn> {
        self.accept_times.lock().unwrap().push(Instant::now());
        self.script.pop_front().unwrap_or_else(|| {
            Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "listener closed",
            ))
        })
    }
}

impl Drop for ScriptedListener {
    fn drop(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shorthand for a transient accept error.
pub fn transient_error() -> io::Result<AcceptedConn> {
    Err(io::Error::new(
        io::ErrorKind::ConnectionAborted,
        "connection aborted",
    ))
}

/// Shorthand for a fatal accept error.
pub fn fatal_error() -> io::Result<AcceptedConn> {
    Err(io::Error::new(io::ErrorKind::InvalidInput, "broken listener"))
}

/// Handler that reports every dispatched connection over a channel and
/// returns immediately.
pub struct CountingHandler {
    events: mpsc::UnboundedSender<(ConnectionId, SocketAddr)>,
}

impl CountingHandler {
    pub fn channel() -> (
        Arc<Self>,
        mpsc::UnboundedReceiver<(ConnectionId, SocketAddr)>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { events: tx }), rx)
    }
}

#[async_trait]
impl Handler for CountingHandler {
    async fn handle(&self, conn: AcceptedConn, _ctx: Arc<ServerContext>) {
        let _ = self.events.send((conn.id(), conn.peer_addr()));
    }
}

/// Handler that signals dispatch and then never returns, for asserting the
/// accept loop does not wait on its tasks.
pub struct BlockingHandler {
    started: mpsc::UnboundedSender<ConnectionId>,
}

impl BlockingHandler {
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<ConnectionId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { started: tx }), rx)
    }
}

#[async_trait]
impl Handler for BlockingHandler {
    async fn handle(&self, conn: AcceptedConn, _ctx: Arc<ServerContext>) {
        let _ = self.started.send(conn.id());
        std::future::pending::<()>().await;
    }
}
