//! Configuration schema definitions.
//!
//! # Responsibilities
//! - Define the server configuration structure (serde-deserializable)
//! - Carry the documented default for every field
//! - Clamp chunk size into its protocol-legal range
//!
//! # Design Decisions
//! - Zero/empty means "unset"; [`ServerConfig::apply_defaults`] substitutes
//!   the default in place rather than rejecting the config
//! - Out-of-range chunk size is a policy correction, not an error

use serde::{Deserialize, Serialize};

/// Default RTMP listening port.
pub const DEFAULT_PORT: u16 = 1935;
/// Default accept/read/write timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default maximum idle time for a connection in seconds.
pub const DEFAULT_MAX_IDLE_SECS: u64 = 3600;
/// Default socket send buffer size in bytes.
pub const DEFAULT_SEND_BUFFER_SIZE: usize = 65536;
/// Default socket read buffer size in bytes.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 65536;
/// Default application root directory.
pub const DEFAULT_ROOT: &str = "applications";
/// Default cross-origin policy file.
pub const DEFAULT_CORS: &str = "webroot/crossdomain.xml";
/// Default target descriptor file.
pub const DEFAULT_TARGET: &str = "conf/target.xml";
/// Default RTMP chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;
/// Smallest chunk size the protocol allows.
pub const CHUNK_SIZE_MIN: usize = 128;
/// Largest chunk size the protocol allows.
pub const CHUNK_SIZE_MAX: usize = 65536;
/// Default acknowledgement window size in bytes.
pub const DEFAULT_ACK_WINDOW_SIZE: u32 = 2_500_000;
/// Default peer bandwidth in bytes.
pub const DEFAULT_PEER_BANDWIDTH: u32 = 2_500_000;
/// Handler name used when a location does not name one.
pub const DEFAULT_HANDLER: &str = "rtmp-live";

/// Root configuration for the RTMP front-end.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,

    /// Accept/read/write timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum idle time before a connection is eligible for closure.
    pub max_idle_secs: u64,

    /// Socket send buffer size in bytes.
    pub send_buffer_size: usize,

    /// Socket read buffer size in bytes.
    pub read_buffer_size: usize,

    /// Application root directory.
    pub root: String,

    /// Cross-origin policy file path.
    pub cors: String,

    /// Target descriptor file path.
    pub target: String,

    /// RTMP chunk size; legal range is [128, 65536].
    pub chunk_size: usize,

    /// Acknowledgement window size advertised to peers.
    pub ack_window_size: u32,

    /// Peer bandwidth advertised to peers.
    pub peer_bandwidth: u32,

    /// Ordered handler mount points.
    pub locations: Vec<LocationConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_idle_secs: DEFAULT_MAX_IDLE_SECS,
            send_buffer_size: DEFAULT_SEND_BUFFER_SIZE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            root: DEFAULT_ROOT.to_string(),
            cors: DEFAULT_CORS.to_string(),
            target: DEFAULT_TARGET.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            ack_window_size: DEFAULT_ACK_WINDOW_SIZE,
            peer_bandwidth: DEFAULT_PEER_BANDWIDTH,
            locations: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Substitute the documented default for every unset (zero/empty) field.
    ///
    /// Idempotent: applying to an already-defaulted config changes nothing.
    /// A chunk size outside [128, 65536] is reset to 4096 rather than
    /// rejected.
    pub fn apply_defaults(&mut self) {
        if self.port == 0 {
            self.port = DEFAULT_PORT;
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        if self.max_idle_secs == 0 {
            self.max_idle_secs = DEFAULT_MAX_IDLE_SECS;
        }
        if self.send_buffer_size == 0 {
            self.send_buffer_size = DEFAULT_SEND_BUFFER_SIZE;
        }
        if self.read_buffer_size == 0 {
            self.read_buffer_size = DEFAULT_READ_BUFFER_SIZE;
        }
        if self.root.is_empty() {
            self.root = DEFAULT_ROOT.to_string();
        }
        if self.cors.is_empty() {
            self.cors = DEFAULT_CORS.to_string();
        }
        if self.target.is_empty() {
            self.target = DEFAULT_TARGET.to_string();
        }
        if self.chunk_size < CHUNK_SIZE_MIN || self.chunk_size > CHUNK_SIZE_MAX {
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        if self.ack_window_size == 0 {
            self.ack_window_size = DEFAULT_ACK_WINDOW_SIZE;
        }
        if self.peer_bandwidth == 0 {
            self.peer_bandwidth = DEFAULT_PEER_BANDWIDTH;
        }
    }
}

/// A handler mount point: pattern prefix plus the handler name serving it.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LocationConfig {
    /// URL-like path prefix; empty means "/".
    pub pattern: String,

    /// Registered handler name; empty means the built-in default.
    pub handler: String,
}

impl LocationConfig {
    /// The pattern this location registers under ("" normalizes to "/").
    pub fn effective_pattern(&self) -> &str {
        if self.pattern.is_empty() {
            "/"
        } else {
            &self.pattern
        }
    }

    /// The handler name this location resolves ("" normalizes to
    /// [`DEFAULT_HANDLER`]).
    pub fn effective_handler(&self) -> &str {
        if self.handler.is_empty() {
            DEFAULT_HANDLER
        } else {
            &self.handler
        }
    }
}
