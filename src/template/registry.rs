//! The handler registry: which node kinds the compiler understands.
//!
//! Each handler is keyed by the discriminant it claims (`tag`, `expr`,
//! ...). Dispatch scans in first-registration order and the first
//! handler whose key is present on a node gets it; re-registering a
//! name swaps the behavior without moving it in that order.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::definition::Definition;
use crate::error::CompileError;
use crate::template::compiler::CompileEnv;
use crate::template::fragment::Fragment;
use crate::template::handlers;

/// A node handler. Returns `Ok(None)` to decline the node, in which
/// case dispatch keeps scanning.
pub type Handler = Arc<
    dyn Fn(&IndexMap<String, Definition>, &mut CompileEnv<'_>) -> Result<Option<Fragment>, CompileError>
        + Send
        + Sync,
>;

/// Ordered, name-keyed handler table.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    entries: IndexMap<String, Handler>,
}

impl HandlerRegistry {
    /// An empty registry, for callers building a dialect from scratch.
    pub fn new() -> HandlerRegistry {
        HandlerRegistry::default()
    }

    /// The six built-in node kinds, in their canonical dispatch order.
    pub fn with_builtins() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.register_all([
            ("tag", Arc::new(handlers::element::element) as Handler),
            ("expr", Arc::new(handlers::expression::expression) as Handler),
            ("test", Arc::new(handlers::conditional::conditional) as Handler),
            ("each", Arc::new(handlers::iteration::iteration) as Handler),
            ("slot", Arc::new(handlers::composition::slot) as Handler),
            ("use", Arc::new(handlers::composition::compose) as Handler),
        ]);
        registry
    }

    /// Register a handler under a discriminant key. A known key keeps
    /// its position in dispatch order; only its behavior changes.
    pub fn register(&mut self, name: impl Into<String>, handler: Handler) {
        self.entries.insert(name.into(), handler);
    }

    /// Register several handlers, preserving their relative order.
    pub fn register_all<N>(&mut self, pairs: impl IntoIterator<Item = (N, Handler)>)
    where
        N: Into<String>,
    {
        for (name, handler) in pairs {
            self.register(name, handler);
        }
    }

    /// Registered keys in dispatch order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entry_at(&self, index: usize) -> Option<(&str, &Handler)> {
        self.entries
            .get_index(index)
            .map(|(name, handler)| (name.as_str(), handler))
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}
