//! Type-keyed factory storage
//!
//! [`FactoryTable`] is the map primitive shared by all three engines. It has
//! no locking of its own: the injection engine keeps its table inside the
//! resolution mutex, the model registries wrap theirs in a registry mutex.

use crate::key::TypeKey;
use ahash::RandomState;
use std::collections::HashMap;

/// Mapping from [`TypeKey`] to a registered factory.
///
/// Insertion order is irrelevant and the last registration for a key wins;
/// re-registering is never an error.
pub(crate) struct FactoryTable<F> {
    entries: HashMap<TypeKey, F, RandomState>,
}

impl<F> FactoryTable<F> {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Create with pre-allocated capacity for bulk registration.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Install or replace the factory for `key`. Always succeeds.
    #[inline]
    pub fn insert(&mut self, key: TypeKey, factory: F) {
        self.entries.insert(key, factory);
    }

    /// The currently registered factory for `key`, if any.
    #[inline]
    pub fn lookup(&self, key: &TypeKey) -> Option<&F> {
        self.entries.get(key)
    }

    #[inline]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every registration.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F> Default for FactoryTable<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> std::fmt::Debug for FactoryTable<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryTable")
            .field("count", &self.len())
            .finish()
    }
}
