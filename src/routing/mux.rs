//! Pattern-to-handler registry.
//!
//! # Design Decisions
//! - Populated once during startup, read-only afterward: shared via `Arc`
//!   with no locks
//! - Exact-pattern lookup; prefix semantics belong to the protocol engine
//! - Registering the same pattern twice keeps the later handler (last
//!   registration wins)

use std::collections::HashMap;
use std::sync::Arc;

use crate::routing::handler::Handler;

/// Registry mapping patterns to handler instances.
#[derive(Default)]
pub struct Mux {
    routes: HashMap<String, Arc<dyn Handler>>,
}

impl Mux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `pattern`. A duplicate pattern overwrites
    /// the earlier registration.
    pub fn register(&mut self, pattern: impl Into<String>, handler: Arc<dyn Handler>) {
        self.routes.insert(pattern.into(), handler);
    }

    /// Look up the handler registered under `pattern`, if any.
    pub fn lookup(&self, pattern: &str) -> Option<Arc<dyn Handler>> {
        self.routes.get(pattern).cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Mux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mux")
            .field("patterns", &self.routes.keys().collect::<Vec<_>>())
            .finish()
    }
}
