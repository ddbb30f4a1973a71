//! Server subsystem: bootstrap, accept loop, retry policy.
//!
//! # Data Flow
//! ```text
//! ServerConfig
//!     → core.rs Server::new (defaults applied)
//!     → register_locations (factory → Mux)
//!     → listen_and_serve (bind, wrap with liveness policy)
//!     → serve (accept loop, backoff.rs on transient errors)
//!     → one spawned task per connection
//! ```

pub mod backoff;
pub mod core;

pub use backoff::AcceptBackoff;
pub use core::{Server, ServerContext, ServerError};
