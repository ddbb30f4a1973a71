//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → ServerConfig (schema.rs)
//!     → Server::new applies defaults / policy corrections
//!     → shared via Arc to connection tasks
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server starts
//! - Every field has a documented default so a minimal (or empty) config
//!   is valid
//! - Bad values are corrected, not rejected: an out-of-range chunk size is
//!   silently reset to the default

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{LocationConfig, ServerConfig};
