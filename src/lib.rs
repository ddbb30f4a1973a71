//! RTMP ingest front-end library.
//!
//! Binds a listening socket, accepts connections with resilient retry
//! behavior, enforces keep-alive and idle-timeout policy at accept, and
//! dispatches every connection to its own task. The chunk-stream protocol
//! engine plugs in through [`routing::Handler`].

pub mod config;
pub mod net;
pub mod routing;
pub mod server;

pub use config::{LocationConfig, ServerConfig};
pub use net::{Accept, AcceptedConn, KeepAliveListener};
pub use routing::{Handler, HandlerFactory, Mux};
pub use server::{Server, ServerContext, ServerError};
