//! # Inject - Runtime Dependency Resolution for Rust
//!
//! Resolve an abstract capability into a concrete instance without the
//! caller naming, or linking against, the implementation. Two shapes are
//! supported:
//!
//! - 🏭 **Lazy singletons** - [`Injector`] resolves a capability type into a
//!   process-wide singleton, constructed on first resolve and shared as
//!   `Arc<T>` afterwards
//! - 📦 **Opaque construction** - [`BuilderRegistry`] / [`HydrationRegistry`]
//!   turn a small typed parameter model into a fresh instance of its declared
//!   result type, without the caller touching the concrete constructor
//! - 🔄 **Cycle detection** - optional tracking of in-flight resolutions
//!   turns `A → B → A` graphs into an immediate diagnostic instead of stack
//!   exhaustion
//! - 🧪 **Test-friendly** - structured errors via `try_resolve`, instance
//!   seeding, and full-state resets for isolation between cases
//! - 📊 **Observable** - optional tracing integration with JSON or pretty
//!   output
//!
//! ## Quick Start
//!
//! ```rust
//! use inject::Injector;
//! use std::sync::Arc;
//!
//! // The capability, visible to everyone.
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! // The implementation, known only to the composition root.
//! struct FixedClock(u64);
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 { self.0 }
//! }
//!
//! let injector = Injector::new();
//! injector.register(|_| Ok(Arc::new(FixedClock(7)) as Arc<dyn Clock>));
//!
//! // Resolve by capability type - same instance every time.
//! let clock = injector.resolve::<Arc<dyn Clock>>();
//! assert_eq!(clock.now(), 7);
//! ```
//!
//! ## Singletons built from other singletons
//!
//! Factories receive a [`Resolver`] for the current call chain and resolve
//! their own dependencies through it; this is the common case.
//!
//! ```rust
//! use inject::Injector;
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! struct Config { url: String }
//!
//! struct Database { config: Arc<Config> }
//!
//! struct UserService { db: Arc<Database> }
//!
//! let injector = Injector::new();
//! injector.register(|_| Ok(Config { url: "postgres://localhost".into() }));
//! injector.register(|r| Ok(Database { config: r.resolve()? }));
//! injector.register(|r| Ok(UserService { db: r.resolve()? }));
//!
//! let users = injector.resolve::<UserService>();
//! assert_eq!(users.db.config.url, "postgres://localhost");
//! ```
//!
//! ## Opaque construction from models
//!
//! ```rust
//! use inject::{Build, BuildModel, BuilderRegistry};
//!
//! struct GreetingModel { name: String }
//!
//! impl BuildModel for GreetingModel {
//!     type Output = String;
//! }
//!
//! let registry = BuilderRegistry::new();
//! registry.register(|model: GreetingModel| format!("hello, {}", model.name));
//!
//! let greeting = GreetingModel { name: "world".into() }.build(&registry);
//! assert_eq!(greeting, "hello, world");
//! ```
//!
//! ## Failure policy
//!
//! A missing or miswired dependency is a composition bug: the ergonomic entry
//! points ([`Injector::resolve`], [`BuilderRegistry::build`],
//! [`HydrationRegistry::hydrate`]) fail fast with a panic naming the
//! offending type. [`Injector::try_resolve`] returns the same failures as
//! [`InjectError`] values so tests can assert on the kind without crashing
//! the test process. The construction registries deliberately have no
//! structured path.

mod build;
mod error;
mod factory;
mod hydrate;
mod injector;
mod key;
#[cfg(feature = "logging")]
pub mod logging;
mod table;

pub use build::{Build, BuildModel, BuilderRegistry};
pub use error::{InjectError, Result};
pub use factory::{ModelFactory, SingletonFactory};
pub use hydrate::{Hydrate, HydrationModel, HydrationRegistry};
pub use injector::{Injector, InjectorBuilder, Resolver};
pub use key::TypeKey;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Build, BuildModel, BuilderRegistry, Hydrate, HydrationModel, HydrationRegistry,
        InjectError, Injector, Resolver, Result, TypeKey,
    };
    pub use std::sync::Arc;
}
