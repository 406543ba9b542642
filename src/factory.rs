//! Type-erased factory callables
//!
//! Factories are erased at registration time: the generic closure is wrapped
//! once into an `Arc<dyn Fn(..)>` so the registries store a single concrete
//! type. Two invocation contracts exist:
//!
//! - [`SingletonFactory`]: no payload, receives a [`Resolver`] for nested
//!   resolution, invoked at most once per container generation;
//! - [`ModelFactory`]: consumes a boxed model value, invoked exactly once per
//!   build/hydrate call, never cached.

use crate::error::Result;
use crate::injector::Resolver;
use std::any::Any;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::trace;

// =============================================================================
// Singleton Factory
// =============================================================================

/// Type-erased singleton factory function
type SingletonFn =
    Arc<dyn Fn(&mut Resolver<'_>) -> Result<Arc<dyn Any + Send + Sync>> + Send + Sync>;

/// A registered singleton factory.
///
/// The factory receives the call chain's [`Resolver`] so it can resolve its
/// own dependencies; most singletons are constructed from other injected
/// singletons.
#[derive(Clone)]
pub struct SingletonFactory {
    produce: SingletonFn,
    /// Type name for logging
    #[cfg(feature = "logging")]
    type_name: &'static str,
}

impl SingletonFactory {
    /// Erase a typed factory closure.
    #[inline]
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            produce: Arc::new(move |resolver: &mut Resolver<'_>| {
                factory(resolver).map(|value| Arc::new(value) as Arc<dyn Any + Send + Sync>)
            }),
            #[cfg(feature = "logging")]
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wrap an already-erased factory function.
    ///
    /// This is the raw entry point used by generated registration code; the
    /// caller is responsible for pairing it with the right [`TypeKey`]
    /// (a mismatch surfaces as [`InjectError::WrongType`] at resolve time).
    ///
    /// [`TypeKey`]: crate::TypeKey
    /// [`InjectError::WrongType`]: crate::InjectError::WrongType
    #[inline]
    pub fn from_erased(
        produce: impl Fn(&mut Resolver<'_>) -> Result<Arc<dyn Any + Send + Sync>>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            produce: Arc::new(produce),
            #[cfg(feature = "logging")]
            type_name: "<erased>",
        }
    }

    /// Invoke the factory on the current call chain.
    #[inline]
    pub(crate) fn invoke(&self, resolver: &mut Resolver<'_>) -> Result<Arc<dyn Any + Send + Sync>> {
        #[cfg(feature = "logging")]
        trace!(
            target: "inject",
            service = self.type_name,
            "Invoking singleton factory"
        );

        (self.produce)(resolver)
    }
}

impl std::fmt::Debug for SingletonFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        #[cfg(feature = "logging")]
        {
            f.debug_struct("SingletonFactory")
                .field("type_name", &self.type_name)
                .finish()
        }
        #[cfg(not(feature = "logging"))]
        {
            f.debug_struct("SingletonFactory").finish()
        }
    }
}

// =============================================================================
// Model Factory
// =============================================================================

/// Type-erased model factory function
type ModelFn = Arc<dyn Fn(Box<dyn Any + Send>) -> Box<dyn Any> + Send + Sync>;

/// A registered model→result factory.
///
/// Consumes the model by value and produces the declared result. The payload
/// travels boxed; both downcasts are keyed off the model's [`TypeKey`]
/// registration, so a mismatch means a miswired registration and the engines
/// treat it as fatal.
///
/// [`TypeKey`]: crate::TypeKey
#[derive(Clone)]
pub struct ModelFactory {
    produce: ModelFn,
    /// Model type name for diagnostics
    model_name: &'static str,
}

impl ModelFactory {
    /// Erase a typed model factory closure.
    #[inline]
    pub fn new<M, R, F>(factory: F) -> Self
    where
        M: Send + 'static,
        R: 'static,
        F: Fn(M) -> R + Send + Sync + 'static,
    {
        let model_name = std::any::type_name::<M>();
        Self {
            produce: Arc::new(move |boxed: Box<dyn Any + Send>| {
                let model = boxed
                    .downcast::<M>()
                    .unwrap_or_else(|_| panic!("model passed to factory for {model_name} does not match its registration"));
                Box::new(factory(*model))
            }),
            model_name,
        }
    }

    /// Invoke the factory with a boxed model.
    #[inline]
    pub(crate) fn invoke(&self, model: Box<dyn Any + Send>) -> Box<dyn Any> {
        #[cfg(feature = "logging")]
        trace!(
            target: "inject",
            model = self.model_name,
            "Invoking model factory"
        );

        (self.produce)(model)
    }

    /// Name of the model type this factory was registered for.
    #[inline]
    pub(crate) fn model_name(&self) -> &'static str {
        self.model_name
    }
}

impl std::fmt::Debug for ModelFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelFactory")
            .field("model", &self.model_name)
            .finish()
    }
}
