//! Type keys for capability lookup
//!
//! Every registry in this crate is keyed by [`TypeKey`]: a stable,
//! process-lifetime identifier for a capability type.

use std::any::TypeId;
use std::hash::{Hash, Hasher};

/// Stable identifier for a capability type.
///
/// Wraps the type's [`TypeId`] (used for equality and hashing) together with
/// its [`type_name`](std::any::type_name), which is carried only so that
/// errors and log lines can name the type involved. Keys have no ordering
/// semantics.
///
/// # Examples
///
/// ```rust
/// use inject::TypeKey;
///
/// struct Database;
///
/// let key = TypeKey::of::<Database>();
/// assert_eq!(key, TypeKey::of::<Database>());
/// assert!(key.type_name().contains("Database"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Derive the key for a type.
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying [`TypeId`].
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Human-readable name of the keyed type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.name
    }
}

// Identity is the TypeId alone; the name is diagnostic payload.
impl PartialEq for TypeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ServiceA;
    struct ServiceB;

    #[test]
    fn test_same_type_same_key() {
        assert_eq!(TypeKey::of::<ServiceA>(), TypeKey::of::<ServiceA>());
    }

    #[test]
    fn test_distinct_types_distinct_keys() {
        assert_ne!(TypeKey::of::<ServiceA>(), TypeKey::of::<ServiceB>());
    }

    #[test]
    fn test_name_is_carried() {
        let key = TypeKey::of::<ServiceB>();
        assert!(key.type_name().ends_with("ServiceB"));
        assert_eq!(format!("{key}"), key.type_name());
    }

    #[test]
    fn test_hash_ignores_name() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(TypeKey::of::<ServiceA>());
        assert!(set.contains(&TypeKey::of::<ServiceA>()));
        assert!(!set.contains(&TypeKey::of::<ServiceB>()));
    }
}
