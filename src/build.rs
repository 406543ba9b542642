//! One-shot construction from builder models
//!
//! Where the [`Injector`](crate::Injector) produces cached singletons, the
//! [`BuilderRegistry`] turns a small parameter model into a fresh instance of
//! its declared result type on every call. The caller never names the
//! concrete constructor:
//!
//! ```rust
//! use inject::{Build, BuildModel, BuilderRegistry};
//!
//! // Public API crate: a capability plus the model that builds it.
//! trait Widget: Send {
//!     fn label(&self) -> String;
//! }
//!
//! struct WidgetModel {
//!     count: usize,
//! }
//!
//! impl BuildModel for WidgetModel {
//!     type Output = Box<dyn Widget>;
//! }
//!
//! // Implementation crate: the concrete type, registered at startup.
//! struct WidgetImpl {
//!     count: usize,
//! }
//!
//! impl Widget for WidgetImpl {
//!     fn label(&self) -> String {
//!         format!("{} items", self.count)
//!     }
//! }
//!
//! let registry = BuilderRegistry::new();
//! registry.register(|model: WidgetModel| {
//!     Box::new(WidgetImpl { count: model.count }) as Box<dyn Widget>
//! });
//!
//! // Caller crate: build opaquely from the model.
//! let widget = WidgetModel { count: 3 }.build(&registry);
//! assert_eq!(widget.label(), "3 items");
//! ```

use crate::factory::ModelFactory;
use crate::key::TypeKey;
use crate::table::FactoryTable;
use std::sync::{Arc, Mutex};

#[cfg(feature = "logging")]
use tracing::debug;

/// A parameter model that can be built into [`Self::Output`].
///
/// The registry is keyed by the model's type, not the output's: several
/// models may produce the same result type.
pub trait BuildModel: Send + 'static {
    /// The result type produced from this model.
    type Output: 'static;
}

/// Ergonomic `model.build(&registry)` sugar.
pub trait Build: BuildModel + Sized {
    /// Build this model through the given registry.
    fn build(self, registry: &BuilderRegistry) -> Self::Output {
        registry.build(self)
    }
}

impl<M: BuildModel> Build for M {}

/// Registry of model→result build factories.
///
/// Cheap to clone; clones share the table. The internal lock covers both
/// registration and the table read in [`build`](Self::build), but is always
/// released before a factory runs, so factories are free to build other
/// models recursively.
///
/// # Failure policy
///
/// Building an unregistered model panics. Unlike the injection engine there
/// is no structured-error variant: a missing construction factory is a
/// composition bug that should surface loudly during development, not a
/// condition to branch on.
#[derive(Clone)]
pub struct BuilderRegistry {
    table: Arc<Mutex<FactoryTable<ModelFactory>>>,
}

impl BuilderRegistry {
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

    /// Register the build factory for model type `M`, replacing any previous
    /// one.
    pub fn register<M, F>(&self, factory: F)
    where
        M: BuildModel,
        F: Fn(M) -> M::Output + Send + Sync + 'static,
    {
        #[cfg(feature = "logging")]
        debug!(
            target: "inject",
            model = std::any::type_name::<M>(),
            "Registering build factory"
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
        M: BuildModel,
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
    ///
    /// Raw entry point for generated registration code; a factory whose
    /// output disagrees with the model's declared result type panics at
    /// build time.
    pub fn register_erased(&self, key: TypeKey, factory: ModelFactory) {
        let mut table = self.table.lock().unwrap();
        table.insert(key, factory);
    }

    /// Build the declared result for `model`.
    ///
    /// Invokes the registered factory exactly once; nothing is cached, every
    /// call constructs anew.
    ///
    /// # Panics
    ///
    /// Panics if no factory is registered for the model's type, or if the
    /// registered factory produced a value that is not `M::Output`.
    pub fn build<M: BuildModel>(&self, model: M) -> M::Output {
        let key = TypeKey::of::<M>();

        // Lock only across the table read; the factory may build other
        // models while it runs.
        let factory = {
            let table = self.table.lock().unwrap();
            table.lookup(&key).cloned()
        };

        let Some(factory) = factory else {
            panic!("attempted to build unregistered model: {}", key.type_name());
        };

        match factory.invoke(Box::new(model)).downcast::<M::Output>() {
            Ok(output) => *output,
            Err(_) => panic!(
                "build factory for model {} produced a value of a different type",
                factory.model_name()
            ),
        }
    }

    /// Check whether a factory is registered for model type `M`.
    #[inline]
    pub fn is_registered<M: 'static>(&self) -> bool {
        self.table.lock().unwrap().contains(&TypeKey::of::<M>())
    }

    /// Number of registered build factories.
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
        debug!(target: "inject", "Build registry cleared");
    }
}

impl Default for BuilderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderRegistry")
            .field("registered", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    trait Report: Send {
        fn rows(&self) -> usize;
    }

    struct ReportModel {
        rows: usize,
    }

    impl BuildModel for ReportModel {
        type Output = Box<dyn Report>;
    }

    struct ReportImpl {
        rows: usize,
    }

    impl Report for ReportImpl {
        fn rows(&self) -> usize {
            self.rows
        }
    }

    #[test]
    fn test_build_opaque_instance() {
        let registry = BuilderRegistry::new();
        registry.register(|model: ReportModel| {
            Box::new(ReportImpl { rows: model.rows }) as Box<dyn Report>
        });

        let report = registry.build(ReportModel { rows: 12 });
        assert_eq!(report.rows(), 12);
    }

    #[test]
    fn test_build_never_caches() {
        static INVOKED: AtomicU32 = AtomicU32::new(0);

        struct Once;
        impl BuildModel for Once {
            type Output = u32;
        }

        let registry = BuilderRegistry::new();
        registry.register(|_: Once| INVOKED.fetch_add(1, Ordering::SeqCst));

        assert_eq!(registry.build(Once), 0);
        assert_eq!(registry.build(Once), 1);
        assert_eq!(INVOKED.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[should_panic(expected = "attempted to build unregistered model")]
    fn test_unregistered_model_is_fatal() {
        let registry = BuilderRegistry::new();
        let _ = registry.build(ReportModel { rows: 1 });
    }

    #[test]
    fn test_nested_builds_do_not_deadlock() {
        struct Inner(usize);
        impl BuildModel for Inner {
            type Output = usize;
        }

        struct Outer(usize);
        impl BuildModel for Outer {
            type Output = usize;
        }

        let registry = BuilderRegistry::new();
        let nested = registry.clone();
        registry.register(move |model: Outer| nested.build(Inner(model.0)) * 2);
        registry.register(|model: Inner| model.0 + 1);

        assert_eq!(registry.build(Outer(20)), 42);
    }

    #[test]
    fn test_build_via_extension_trait() {
        let registry = BuilderRegistry::new();
        registry.register(|model: ReportModel| {
            Box::new(ReportImpl { rows: model.rows }) as Box<dyn Report>
        });

        let report = ReportModel { rows: 3 }.build(&registry);
        assert_eq!(report.rows(), 3);
    }

    #[test]
    fn test_last_registration_wins() {
        struct Fixed;
        impl BuildModel for Fixed {
            type Output = u32;
        }

        let registry = BuilderRegistry::new();
        registry.register(|_: Fixed| 1u32);
        registry.register(|_: Fixed| 2u32);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.build(Fixed), 2);
    }

    #[test]
    fn test_register_unsynced() {
        struct Fixed;
        impl BuildModel for Fixed {
            type Output = u32;
        }

        let mut registry = BuilderRegistry::new();
        registry.register_unsynced(|_: Fixed| 7u32);
        assert_eq!(registry.build(Fixed), 7);
    }

    #[test]
    #[should_panic(expected = "produced a value of a different type")]
    fn test_erased_factory_with_wrong_output_is_fatal() {
        struct Fixed;
        impl BuildModel for Fixed {
            type Output = u32;
        }

        let registry = BuilderRegistry::new();
        registry.register_erased(
            TypeKey::of::<Fixed>(),
            ModelFactory::new(|_: Fixed| "not a u32"),
        );

        let _ = registry.build(Fixed);
    }

    #[test]
    fn test_clear_for_test_isolation() {
        struct Fixed;
        impl BuildModel for Fixed {
            type Output = u32;
        }

        let registry = BuilderRegistry::new();
        registry.register(|_: Fixed| 1u32);
        assert!(registry.is_registered::<Fixed>());

        registry.clear();
        assert!(registry.is_empty());
    }
}
