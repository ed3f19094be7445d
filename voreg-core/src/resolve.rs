//! Key-to-handler resolution.
//!
//! One generic table serves three dispatch points: resource kinds,
//! capability mechanisms and interface mechanisms. Tables are populated once
//! at startup and never mutated afterwards; specialization between handlers
//! is expressed by the handlers themselves chaining to a named parent, not by
//! this resolver.

use crate::error::BuildError;
use std::collections::HashMap;

pub struct KindResolver<H> {
    handlers: HashMap<&'static str, H>,
    default: Option<H>,
}

impl<H> KindResolver<H> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            default: None,
        }
    }

    pub fn register(&mut self, key: &'static str, handler: H) {
        self.handlers.insert(key, handler);
    }

    /// Handler used when no key matches. Without one, resolution of an
    /// unregistered key is an error.
    pub fn set_default(&mut self, handler: H) {
        self.default = Some(handler);
    }

    pub fn resolve(&self, key: &str) -> Result<&H, BuildError> {
        self.handlers
            .get(key)
            .or(self.default.as_ref())
            .ok_or_else(|| BuildError::UnknownKind(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }
}

impl<H> Default for KindResolver<H> {
    fn default() -> Self {
        Self::new()
    }
}
