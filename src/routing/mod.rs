//! Routing subsystem: handler resolution and the pattern registry.
//!
//! # Data Flow
//! ```text
//! LocationConfig (ordered, from config)
//!     → handler.rs (factory resolves name → instance, once at startup)
//!     → mux.rs (pattern → handler, read-only after startup)
//!     → consulted by connection tasks / the protocol engine
//! ```

pub mod handler;
pub mod live;
pub mod mux;

pub use handler::{Handler, HandlerBuilder, HandlerFactory};
pub use live::LiveHandler;
pub use mux::Mux;
