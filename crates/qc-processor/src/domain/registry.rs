//! Handler registry keyed by `(family_name, version)`.

use super::errors::ProcessorError;
use crate::ports::handler::TransactionHandler;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    pub family_name: String,
    pub version: String,
}

impl HandlerKey {
    /// Key for `family_name` at `version`.
    pub fn new(family_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            family_name: family_name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family_name, self.version)
    }
}

/// Registered handlers, iterated in registration order.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerKey, Arc<dyn TransactionHandler>>,
    order: Vec<HandlerKey>,
}

impl HandlerRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. A second handler for the same key is rejected.
    pub fn register(&mut self, handler: Arc<dyn TransactionHandler>) -> Result<(), ProcessorError> {
        let key = HandlerKey::new(handler.family_name(), handler.version());
        if self.handlers.contains_key(&key) {
            return Err(ProcessorError::DuplicateHandler {
                family: key.family_name,
                version: key.version,
            });
        }
        self.order.push(key.clone());
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Handler whose family and version match exactly.
    #[must_use]
    pub fn find(&self, family_name: &str, version: &str) -> Option<Arc<dyn TransactionHandler>> {
        self.handlers
            .get(&HandlerKey::new(family_name, version))
            .cloned()
    }

    /// Handlers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TransactionHandler>> {
        self.order.iter().filter_map(|key| self.handlers.get(key))
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.order.iter().map(ToString::to_string)).finish()
    }
}
