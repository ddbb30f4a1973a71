//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (keep-alive + idle deadline at accept)
//!     → conn.rs (AcceptedConn: owned stream, id, deadline)
//!     → handed off to a connection task by the serve loop
//! ```
//!
//! # Design Decisions
//! - The liveness policy is applied once, at accept, before any other code
//!   sees the connection
//! - The serve loop is the only accessor of the listener; each connection
//!   is exclusively owned by its task after dispatch

pub mod conn;
pub mod listener;

pub use conn::{AcceptedConn, ConnectionId};
pub use listener::{Accept, KeepAliveListener};
