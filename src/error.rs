//! Error types for dependency injection
//!
//! Only the injection engine has a structured error path; the model
//! registries fail fast by design (see [`BuilderRegistry`](crate::BuilderRegistry)).

use crate::key::TypeKey;
use std::any::TypeId;
use thiserror::Error;

/// Errors that can occur during singleton resolution
#[derive(Error, Debug, Clone)]
pub enum InjectError {
    /// A dependency chain revisited a type already being constructed
    #[error("resolution cycle detected: {}", render_cycle(.chain, .type_name))]
    CycleDetected {
        /// Types in flight on the call chain, outermost first
        chain: Vec<&'static str>,
        /// The type whose second entry triggered detection
        type_name: &'static str,
    },

    /// No factory was registered for the requested type
    #[error("no factory registered for type: {type_name}")]
    NotRegistered {
        type_name: &'static str,
        type_id: TypeId,
    },

    /// A factory produced a value that is not the registered type
    #[error("factory for {type_name} produced a value of a different type")]
    WrongType { type_name: &'static str },

    /// Anything else
    #[error("injection error: {0}")]
    Unknown(String),
}

impl InjectError {
    /// Create a CycleDetected error from the in-flight chain
    #[inline]
    pub(crate) fn cycle(chain: Vec<&'static str>, key: TypeKey) -> Self {
        Self::CycleDetected {
            chain,
            type_name: key.type_name(),
        }
    }

    /// Create a NotRegistered error for a key
    #[inline]
    pub(crate) fn not_registered(key: TypeKey) -> Self {
        Self::NotRegistered {
            type_name: key.type_name(),
            type_id: key.type_id(),
        }
    }

    /// Create a WrongType error for a key
    #[inline]
    pub(crate) fn wrong_type(key: TypeKey) -> Self {
        Self::WrongType {
            type_name: key.type_name(),
        }
    }
}

fn render_cycle(chain: &[&'static str], offender: &str) -> String {
    let mut rendered = String::new();
    for name in chain {
        rendered.push_str(name);
        rendered.push_str(" -> ");
    }
    rendered.push_str(offender);
    rendered
}

/// Result type alias for injection operations
pub type Result<T> = std::result::Result<T, InjectError>;

#[cfg(test)]
mod tests {
    use super::*;

    struct ServiceA;

    #[test]
    fn test_not_registered_names_type() {
        let err = InjectError::not_registered(TypeKey::of::<ServiceA>());
        assert!(err.to_string().contains("ServiceA"));
    }

    #[test]
    fn test_cycle_renders_full_chain() {
        let err = InjectError::cycle(vec!["A", "B"], TypeKey::of::<ServiceA>());
        let message = err.to_string();
        assert!(message.contains("A -> B -> "));
        assert!(message.contains("ServiceA"));
    }

    #[test]
    fn test_wrong_type_names_type() {
        let err = InjectError::wrong_type(TypeKey::of::<ServiceA>());
        assert!(err.to_string().contains("different type"));
        assert!(err.to_string().contains("ServiceA"));
    }
}
