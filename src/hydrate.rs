//! One-shot hydration from parameter models
//!
//! Hydration is the sibling of [`build`](crate::BuilderRegistry): a caller
//! constructs a small model value and asks the registry to hydrate it into
//! the model's declared result type. The two registries exist so that a
//! codebase can keep its view-construction surface and its data-hydration
//! surface in separately owned tables with independent lifecycles; the
//! engine semantics are identical: lock the table read, release, invoke,
//! return, cache nothing.

use crate::factory::ModelFactory;
use crate::key::TypeKey;
use crate::table::FactoryTable;
use std::sync::{Arc, Mutex};

#[cfg(feature = "logging")]
use tracing::debug;

/// A parameter model that can be hydrated into [`Self::Output`].
///
/// Keyed by the model's type; several models may hydrate into the same
/// result type.
pub trait HydrationModel: Send + 'static {
    /// The result type produced from this model.
    type Output: 'static;
}

/// Ergonomic `model.hydrate(&registry)` sugar.
pub trait Hydrate: HydrationModel + Sized {
    /// Hydrate this model through the given registry.
    fn hydrate(self, registry: &HydrationRegistry) -> Self::Output {
        registry.hydrate(self)
    }
}

impl<M: HydrationModel> Hydrate for M {}

/// Registry of model→result hydration factories.
///
/// Cheap to clone; clones share the table. Registration and the table read
/// both take the registry lock; the lock is released before the factory
/// runs, so hydration factories may hydrate other models recursively.
/// A missing factory is fatal to the calling thread; hydration has no
/// structured-error path.
#[derive(Clone)]
pub struct HydrationRegistry {
    table: Arc<Mutex<FactoryTable<ModelFactory>>>,
}

impl HydrationRegistry {
    /// Create an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(FactoryTable::new())),
        }
    }

    /// Create with pre-allocated capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: Arc::new(Mutex::new(FactoryTable::with_capacity(capacity))),
        }
    }

    /// Register the hydration factory for model type `M`, replacing any
    /// previous one.
    pub fn register<M, F>(&self, factory: F)
    where
        M: HydrationModel,
        F: Fn(M) -> M::Output + Send + Sync + 'static,
    {
        #[cfg(feature = "logging")]
        debug!(
            target: "inject",
            model = std::any::type_name::<M>(),
            "Registering hydration factory"
        );

        let mut table = self.table.lock().unwrap();
        table.insert(TypeKey::of::<M>(), ModelFactory::new(factory));
    }

    /// Register without taking the registry lock.
    ///
    /// For bulk registration at process start while the registry is still
    /// exclusively owned; falls back to the locked path once it has been
    /// shared.
    pub fn register_unsynced<M, F>(&mut self, factory: F)
    where
        M: HydrationModel,
        F: Fn(M) -> M::Output + Send + Sync + 'static,
    {
        match Arc::get_mut(&mut self.table) {
            Some(mutex) => {
                let table = mutex.get_mut().unwrap();
                table.insert(TypeKey::of::<M>(), ModelFactory::new(factory));
            }
            None => self.register(factory),
        }
    }

    /// Install an already-erased factory under an explicit model key.
    pub fn register_erased(&self, key: TypeKey, factory: ModelFactory) {
        let mut table = self.table.lock().unwrap();
        table.insert(key, factory);
    }

    /// Hydrate the declared result for `model`.
    ///
    /// Invokes the registered factory exactly once per call; nothing is
    /// cached.
    ///
    /// # Panics
    ///
    /// Panics if no factory is registered for the model's type, or if the
    /// registered factory produced a value that is not `M::Output`.
    pub fn hydrate<M: HydrationModel>(&self, model: M) -> M::Output {
        let key = TypeKey::of::<M>();

        // Lock only across the table read.
        let factory = {
            let table = self.table.lock().unwrap();
            table.lookup(&key).cloned()
        };

        let Some(factory) = factory else {
            panic!(
                "attempted to hydrate unregistered model: {}",
                key.type_name()
            );
        };

        match factory.invoke(Box::new(model)).downcast::<M::Output>() {
            Ok(output) => *output,
            Err(_) => panic!(
                "hydration factory for model {} produced a value of a different type",
                factory.model_name()
            ),
        }
    }

    /// Check whether a factory is registered for model type `M`.
    #[inline]
    pub fn is_registered<M: 'static>(&self) -> bool {
        self.table.lock().unwrap().contains(&TypeKey::of::<M>())
    }

    /// Number of registered hydration factories.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.lock().unwrap().len()
    }

    /// True when no factory is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.lock().unwrap().is_empty()
    }

    /// Drop every registration (test isolation).
    pub fn clear(&self) {
        self.table.lock().unwrap().clear();

        #[cfg(feature = "logging")]
        debug!(target: "inject", "Hydration registry cleared");
    }
}

impl Default for HydrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HydrationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydrationRegistry")
            .field("registered", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Session: Send {
        fn user(&self) -> &str;
    }

    struct SessionModel {
        user: String,
    }

    impl HydrationModel for SessionModel {
        type Output = Box<dyn Session>;
    }

    struct SessionImpl {
        user: String,
    }

    impl Session for SessionImpl {
        fn user(&self) -> &str {
            &self.user
        }
    }

    #[test]
    fn test_hydrate_opaque_instance() {
        let registry = HydrationRegistry::new();
        registry.register(|model: SessionModel| {
            Box::new(SessionImpl { user: model.user }) as Box<dyn Session>
        });

        let session = registry.hydrate(SessionModel {
            user: "alice".into(),
        });
        assert_eq!(session.user(), "alice");
    }

    #[test]
    fn test_hydrate_via_extension_trait() {
        let registry = HydrationRegistry::new();
        registry.register(|model: SessionModel| {
            Box::new(SessionImpl { user: model.user }) as Box<dyn Session>
        });

        let session = SessionModel { user: "bob".into() }.hydrate(&registry);
        assert_eq!(session.user(), "bob");
    }

    #[test]
    #[should_panic(expected = "attempted to hydrate unregistered model")]
    fn test_unregistered_model_is_fatal() {
        let registry = HydrationRegistry::new();
        let _ = registry.hydrate(SessionModel { user: "x".into() });
    }

    #[test]
    fn test_parameters_flow_into_result() {
        struct Scaled(i64);
        impl HydrationModel for Scaled {
            type Output = i64;
        }

        let registry = HydrationRegistry::new();
        registry.register(|model: Scaled| model.0 * 10);

        assert_eq!(registry.hydrate(Scaled(4)), 40);
        assert_eq!(registry.hydrate(Scaled(-1)), -10);
    }

    #[test]
    fn test_concurrent_hydration() {
        struct Id(u64);
        impl HydrationModel for Id {
            type Output = u64;
        }

        let registry = HydrationRegistry::new();
        registry.register(|model: Id| model.0);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.hydrate(Id(i)))
            })
            .collect();

        let mut results: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.sort_unstable();
        assert_eq!(results, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_models_sharing_a_result_type() {
        struct FromCount(usize);
        impl HydrationModel for FromCount {
            type Output = String;
        }

        struct FromFlag(bool);
        impl HydrationModel for FromFlag {
            type Output = String;
        }

        let registry = HydrationRegistry::new();
        registry.register(|model: FromCount| format!("count={}", model.0));
        registry.register(|model: FromFlag| format!("flag={}", model.0));

        // Lookup is keyed by the model type, so both coexist.
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.hydrate(FromCount(2)), "count=2");
        assert_eq!(registry.hydrate(FromFlag(true)), "flag=true");
    }
}
