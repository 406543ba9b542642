//! Singleton resolution engine
//!
//! The [`Injector`] owns two pieces of state behind one mutex: the factory
//! table and the instance cache for the current container generation. A
//! resolution locks the mutex once and keeps it for the entire dependency
//! chain; nested resolution happens through the [`Resolver`] handed to each
//! factory, never by re-entering the public API.
//!
//! That shape replaces the recursive lock + shared resolution stack an
//! implementation with re-entrant locks would use: the in-flight key set
//! lives in the per-chain [`Resolver`], so it cannot leak between chains and
//! stays balanced even when a frame fails.

use crate::error::{InjectError, Result};
use crate::factory::SingletonFactory;
use crate::key::TypeKey;
use crate::table::FactoryTable;
use ahash::RandomState;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

// =============================================================================
// Instance cache
// =============================================================================

/// Singletons constructed during the current container generation.
///
/// An entry, once created, is reused until the next [`Injector::reset_container`].
struct InstanceCache {
    entries: HashMap<TypeKey, Arc<dyn Any + Send + Sync>, RandomState>,
}

impl InstanceCache {
    #[inline]
    fn new() -> Self {
        Self {
            entries: HashMap::with_hasher(RandomState::new()),
        }
    }

    #[inline]
    fn get(&self, key: &TypeKey) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.entries.get(key)
    }

    #[inline]
    fn insert(&mut self, key: TypeKey, instance: Arc<dyn Any + Send + Sync>) {
        self.entries.insert(key, instance);
    }

    #[inline]
    fn contains(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Everything the resolution lock protects.
struct InjectorState {
    factories: FactoryTable<SingletonFactory>,
    cache: InstanceCache,
}

// =============================================================================
// Resolver - per-call-chain context
// =============================================================================

/// Resolution context for one dependency chain.
///
/// Created by the [`Injector`] after taking the resolution lock and handed to
/// every singleton factory on the chain. Factories resolve their own
/// dependencies through it:
///
/// ```rust
/// use inject::Injector;
/// use std::sync::Arc;
///
/// #[derive(Clone)]
/// struct Config { url: String }
///
/// struct Database { config: Arc<Config> }
///
/// let injector = Injector::new();
/// injector.register(|_| Ok(Config { url: "postgres://localhost".into() }));
/// injector.register(|resolver| {
///     Ok(Database { config: resolver.resolve::<Config>()? })
/// });
///
/// let db = injector.resolve::<Database>();
/// assert_eq!(db.config.url, "postgres://localhost");
/// ```
///
/// The resolution lock is already held for the whole chain, so a factory must
/// NOT call back into [`Injector::resolve`], which deadlocks. Nested lookups
/// always go through the `Resolver` it was given.
pub struct Resolver<'a> {
    state: &'a mut InjectorState,
    /// In-flight keys on this chain, outermost first
    stack: Vec<TypeKey>,
    /// Set mirror of `stack` for O(1) membership tests
    in_flight: HashSet<TypeKey, RandomState>,
    detect_cycles: bool,
}

impl<'a> Resolver<'a> {
    fn new(state: &'a mut InjectorState, detect_cycles: bool) -> Self {
        Self {
            state,
            stack: Vec::new(),
            in_flight: HashSet::with_hasher(RandomState::new()),
            detect_cycles,
        }
    }

    /// Resolve the singleton for `T` on the current chain.
    ///
    /// Returns the cached instance when one exists, otherwise invokes the
    /// registered factory and caches the result. Errors from nested frames
    /// (missing factory, cycle) propagate out structurally.
    pub fn resolve<T: Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        let key = TypeKey::of::<T>();

        if !self.detect_cycles {
            return self.resolve_frame(key);
        }

        if self.in_flight.contains(&key) {
            let chain: Vec<&'static str> = self.stack.iter().map(|k| k.type_name()).collect();
            return Err(InjectError::cycle(chain, key));
        }

        self.stack.push(key);
        self.in_flight.insert(key);

        let result = self.resolve_frame(key);

        // Balanced on success and failure; an inner error must not leave the
        // outer frames unable to retry.
        self.stack.pop();
        self.in_flight.remove(&key);

        result
    }

    /// Whether cycle detection is active on this chain.
    #[inline]
    pub fn detects_cycles(&self) -> bool {
        self.detect_cycles
    }

    fn resolve_frame<T: Send + Sync + 'static>(&mut self, key: TypeKey) -> Result<Arc<T>> {
        if let Some(cached) = self.state.cache.get(&key) {
            #[cfg(feature = "logging")]
            trace!(
                target: "inject",
                service = key.type_name(),
                "Resolved from instance cache"
            );

            return Arc::clone(cached)
                .downcast::<T>()
                .map_err(|_| InjectError::wrong_type(key));
        }

        // Clone the handle out of the table so the factory can re-borrow the
        // state through this resolver.
        let factory = match self.state.factories.lookup(&key) {
            Some(factory) => factory.clone(),
            None => return Err(InjectError::not_registered(key)),
        };

        #[cfg(feature = "logging")]
        debug!(
            target: "inject",
            service = key.type_name(),
            "Constructing singleton on first resolve"
        );

        let produced = factory.invoke(self)?;

        // Checked downcast at the resolve boundary: a factory registered
        // through the erased path may disagree with its key.
        let typed = produced
            .downcast::<T>()
            .map_err(|_| InjectError::wrong_type(key))?;

        self.state
            .cache
            .insert(key, Arc::clone(&typed) as Arc<dyn Any + Send + Sync>);

        Ok(typed)
    }
}

// =============================================================================
// Injector
// =============================================================================

/// Singleton resolution engine.
///
/// Capability types are registered with factories and resolved into
/// process-wide singletons, constructed lazily on first resolve and shared as
/// `Arc<T>` afterwards. The engine is cheap to clone; clones share state.
///
/// # Examples
///
/// ```rust
/// use inject::Injector;
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// let injector = Injector::new();
/// injector.register(|_| Ok(Arc::new(EnglishGreeter) as Arc<dyn Greeter>));
///
/// let greeter = injector.resolve::<Arc<dyn Greeter>>();
/// assert_eq!(greeter.greet(), "hello");
/// ```
///
/// # Failure policy
///
/// [`resolve`](Self::resolve) treats a misconfigured dependency graph as a
/// programming error and panics with a diagnostic naming the offending type.
/// [`try_resolve`](Self::try_resolve) returns the same failures as
/// [`InjectError`] values so tests can assert on the failure kind.
#[derive(Clone)]
pub struct Injector {
    /// Factory table + instance cache, guarded for entire resolution chains
    state: Arc<Mutex<InjectorState>>,
    /// Cycle detection flag; one tracker push/pop + membership check per
    /// resolution frame when enabled
    detect_cycles: Arc<AtomicBool>,
}

impl Injector {
    /// Create a new engine with cycle detection disabled.
    #[inline]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create with pre-allocated factory-table capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::builder().capacity(capacity).build()
    }

    /// Start configuring an engine.
    ///
    /// ```rust
    /// use inject::Injector;
    ///
    /// let injector = Injector::builder()
    ///     .detect_cycles(true)
    ///     .capacity(32)
    ///     .build();
    /// assert!(injector.detect_cycles());
    /// ```
    #[inline]
    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register the singleton factory for `T`, replacing any previous one.
    ///
    /// Registration may happen at any time, but a factory registered after
    /// `T` has already been resolved has no effect until the next
    /// [`reset_container`](Self::reset_container).
    pub fn register<T, F>(&self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        #[cfg(feature = "logging")]
        debug!(
            target: "inject",
            service = std::any::type_name::<T>(),
            "Registering singleton factory"
        );

        let mut state = self.state.lock().unwrap();
        state
            .factories
            .insert(TypeKey::of::<T>(), SingletonFactory::new(factory));
    }

    /// Register without taking the resolution lock.
    ///
    /// Intended for bulk registration at process start, before the engine is
    /// shared. The exclusive borrow makes the lock bypass sound; if the
    /// engine has already been cloned, this quietly falls back to the locked
    /// path.
    pub fn register_unsynced<T, F>(&mut self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        match Arc::get_mut(&mut self.state) {
            Some(mutex) => {
                let state = mutex.get_mut().unwrap();
                state
                    .factories
                    .insert(TypeKey::of::<T>(), SingletonFactory::new(factory));
            }
            None => self.register(factory),
        }
    }

    /// Install an already-erased factory under an explicit key.
    ///
    /// Raw entry point for generated registration code. The produced value is
    /// still checked against the requested type at resolve time, so a factory
    /// that disagrees with its key fails with
    /// [`InjectError::WrongType`] rather than corrupting the cache.
    pub fn register_erased(&self, key: TypeKey, factory: SingletonFactory) {
        #[cfg(feature = "logging")]
        debug!(
            target: "inject",
            service = key.type_name(),
            "Registering erased singleton factory"
        );

        let mut state = self.state.lock().unwrap();
        state.factories.insert(key, factory);
    }

    /// Plant an already-constructed instance into the current container.
    ///
    /// The instance behaves exactly like a resolved singleton: shared until
    /// [`reset_container`](Self::reset_container) clears it. No factory is
    /// registered, so after a reset the type resolves only if one was
    /// registered separately. Useful for handing mocks to code under test.
    pub fn seed<T: Send + Sync + 'static>(&self, instance: T) {
        #[cfg(feature = "logging")]
        debug!(
            target: "inject",
            service = std::any::type_name::<T>(),
            "Seeding pre-built instance"
        );

        let mut state = self.state.lock().unwrap();
        state.cache.insert(TypeKey::of::<T>(), Arc::new(instance));
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve the singleton for `T`.
    ///
    /// # Panics
    ///
    /// Panics if no factory is registered for `T`, if a resolution cycle is
    /// detected, or if a factory produced a value of the wrong type. At a
    /// composition root these are programming errors, not recoverable
    /// conditions; use [`try_resolve`](Self::try_resolve) to observe them as
    /// values instead.
    #[inline]
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Arc<T> {
        self.try_resolve::<T>().unwrap_or_else(|err| panic!("{err}"))
    }

    /// Resolve the singleton for `T`, returning failures as [`InjectError`].
    pub fn try_resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let detect = self.detect_cycles.load(Ordering::Relaxed);
        let mut state = self.state.lock().unwrap();
        Resolver::new(&mut state, detect).resolve::<T>()
    }

    /// Run a closure with a [`Resolver`] for one call chain.
    ///
    /// Takes the resolution lock once for the whole closure; useful for
    /// resolving several types without re-locking between them.
    pub fn with_resolver<R>(&self, f: impl FnOnce(&mut Resolver<'_>) -> R) -> R {
        let detect = self.detect_cycles.load(Ordering::Relaxed);
        let mut state = self.state.lock().unwrap();
        f(&mut Resolver::new(&mut state, detect))
    }

    // =========================================================================
    // Cycle detection
    // =========================================================================

    /// Enable or disable resolution-cycle detection.
    ///
    /// With detection off, a cyclic graph recurses until the stack overflows
    /// instead of failing with a diagnostic; the flag exists because the
    /// check costs one push/pop and membership test per resolution frame.
    #[inline]
    pub fn set_detect_cycles(&self, enabled: bool) {
        self.detect_cycles.store(enabled, Ordering::Relaxed);
    }

    /// Whether cycle detection is currently enabled.
    #[inline]
    pub fn detect_cycles(&self) -> bool {
        self.detect_cycles.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Resets (test isolation)
    // =========================================================================

    /// Drop every cached singleton, starting a new container generation.
    ///
    /// Atomic with respect to concurrent resolutions: the swap happens under
    /// the same lock resolution holds. The next resolve of each type invokes
    /// its factory again.
    pub fn reset_container(&self) {
        let mut state = self.state.lock().unwrap();

        #[cfg(feature = "logging")]
        let dropped = state.cache.len();

        state.cache.clear();

        #[cfg(feature = "logging")]
        debug!(
            target: "inject",
            instances_dropped = dropped,
            "Container reset - cached singletons cleared"
        );
    }

    /// Drop every registered factory.
    ///
    /// Intended for test isolation between cases, not for production use;
    /// cached instances are untouched.
    pub fn reset_factories(&self) {
        let mut state = self.state.lock().unwrap();
        state.factories.clear();

        #[cfg(feature = "logging")]
        debug!(target: "inject", "Factory table reset");
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Check whether a factory is registered for `T`.
    #[inline]
    pub fn is_registered<T: 'static>(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.factories.contains(&TypeKey::of::<T>())
    }

    /// Check whether `T` has a cached instance in the current generation.
    #[inline]
    pub fn is_cached<T: 'static>(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.cache.contains(&TypeKey::of::<T>())
    }

    /// Number of registered factories.
    #[inline]
    pub fn registered_len(&self) -> usize {
        self.state.lock().unwrap().factories.len()
    }

    /// Number of cached singletons in the current generation.
    #[inline]
    pub fn cached_len(&self) -> usize {
        self.state.lock().unwrap().cache.len()
    }

    /// True when nothing is registered and nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.factories.is_empty() && state.cache.len() == 0
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("Injector")
            .field("registered", &state.factories.len())
            .field("cached", &state.cache.len())
            .field("detect_cycles", &self.detect_cycles())
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Configuration builder for [`Injector`].
#[derive(Debug, Clone, Default)]
pub struct InjectorBuilder {
    capacity: Option<usize>,
    detect_cycles: bool,
}

impl InjectorBuilder {
    /// Create a builder with defaults (no preallocation, detection off).
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate the factory table for roughly `capacity` registrations.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Enable resolution-cycle detection from the start.
    #[inline]
    pub fn detect_cycles(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    /// Build the engine.
    pub fn build(self) -> Injector {
        #[cfg(feature = "logging")]
        debug!(
            target: "inject",
            detect_cycles = self.detect_cycles,
            "Creating injection engine"
        );

        let factories = match self.capacity {
            Some(capacity) => FactoryTable::with_capacity(capacity),
            None => FactoryTable::new(),
        };

        Injector {
            state: Arc::new(Mutex::new(InjectorState {
                factories,
                cache: InstanceCache::new(),
            })),
            detect_cycles: Arc::new(AtomicBool::new(self.detect_cycles)),
        }
    }
}
