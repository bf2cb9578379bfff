//! Named post-insert transforms.
//!
//! A route may name one transform that rewrites the row map of an insert
//! before it is translated. Transforms are registered by the embedding
//! application; a route naming an unregistered transform fails at setup.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use datarest_configuration::ConfigurationError;

/// The row map of one pending insert, in value order.
pub type RowValues = IndexMap<String, String>;

/// A transform applied once to the row map before translation.
pub type PostTransform = Arc<dyn Fn(&mut RowValues) + Send + Sync>;

#[derive(Default)]
pub struct TransformRegistry {
    entries: HashMap<String, PostTransform>,
}

impl TransformRegistry {
    pub fn new() -> TransformRegistry {
        TransformRegistry::default()
    }

    /// A registry with the generally useful built-ins.
    pub fn with_builtins() -> TransformRegistry {
        let mut registry = TransformRegistry::new();
        registry.register("trim", |row: &mut RowValues| {
            for value in row.values_mut() {
                *value = value.trim().to_string();
            }
        });
        registry.register("lowercase-keys", |row: &mut RowValues| {
            *row = row
                .drain(..)
                .map(|(key, value)| (key.to_lowercase(), value))
                .collect();
        });
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        transform: impl Fn(&mut RowValues) + Send + Sync + 'static,
    ) {
        self.entries.insert(name.into(), Arc::new(transform));
    }

    pub fn resolve(&self, name: &str) -> Result<PostTransform, ConfigurationError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownPostTransform(name.to_string()))
    }
}
