//! Handler capability and name-keyed factory.
//!
//! # Responsibilities
//! - Define the seam the protocol engine plugs into
//! - Resolve configured handler names to concrete instances at startup
//!
//! # Design Decisions
//! - Resolution happens once per location at startup, never at connection
//!   time
//! - Unknown names yield an explicit `None` so the caller can skip the
//!   location and keep going

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::LocationConfig;
use crate::net::AcceptedConn;
use crate::server::ServerContext;

/// A protocol handler bound to a registered pattern.
///
/// Takes ownership of the accepted connection and runs to completion on its
/// own task. Implementations are shared across connections and must be
/// internally synchronized if they keep state.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, conn: AcceptedConn, ctx: Arc<ServerContext>);
}

/// Builds a handler instance for the location it will serve.
pub type HandlerBuilder = Box<dyn Fn(&LocationConfig) -> Arc<dyn Handler> + Send + Sync>;

/// Registry of handler constructors keyed by name.
///
/// Queried once per location during server startup.
#[derive(Default)]
pub struct HandlerFactory {
    builders: HashMap<String, HandlerBuilder>,
}

impl HandlerFactory {
    /// An empty factory; the embedding application registers its handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory pre-populated with the built-in handlers
    /// (currently `"rtmp-live"`).
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register(crate::config::schema::DEFAULT_HANDLER, |loc| {
            Arc::new(crate::routing::live::LiveHandler::new(loc))
        });
        factory
    }

    /// Register a handler constructor under `name`, replacing any previous
    /// registration.
    pub fn register<F>(&mut self, name: impl Into<String>, builder: F)
    where
        F: Fn(&LocationConfig) -> Arc<dyn Handler> + Send + Sync + 'static,
    {
        self.builders.insert(name.into(), Box::new(builder));
    }

    /// Build the handler registered under `name` for `location`, or `None`
    /// if the name is unknown.
    pub fn resolve(&self, name: &str, location: &LocationConfig) -> Option<Arc<dyn Handler>> {
        self.builders.get(name).map(|build| build(location))
    }
}

impl std::fmt::Debug for HandlerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerFactory")
            .field("names", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}
