#![no_main]

//! Fuzz target for the singleton resolution engine
//!
//! Drives arbitrary interleavings of registration, resolution, seeding and
//! resets, checking that the engine never panics through the structured path
//! and that cached identity holds between resets.

use arbitrary::Arbitrary;
use inject::{InjectError, Injector};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

/// Service types for fuzzing
#[derive(Clone, Debug, Arbitrary)]
struct SmallService {
    id: u32,
    name: String,
}

#[derive(Clone, Debug, Arbitrary)]
struct MediumService {
    id: u64,
    data: Vec<u8>,
}

/// Operations to perform on the injector
#[derive(Debug, Arbitrary)]
enum InjectorOp {
    RegisterSmall(SmallService),
    RegisterMedium(MediumService),
    RegisterDependent,
    SeedSmall(SmallService),
    ResolveSmall,
    ResolveMedium,
    ResolveDependent,
    ResetContainer,
    ResetFactories,
    ToggleCycleDetection(bool),
    QuerySmall,
    Counts,
}

#[derive(Clone, Debug)]
struct DependentService {
    small: Arc<SmallService>,
}

fuzz_target!(|ops: Vec<InjectorOp>| {
    let injector = Injector::new();

    for op in ops {
        match op {
            InjectorOp::RegisterSmall(svc) => {
                injector.register(move |_| Ok(svc.clone()));
            }
            InjectorOp::RegisterMedium(svc) => {
                injector.register(move |_| Ok(svc.clone()));
            }
            InjectorOp::RegisterDependent => {
                injector.register(|r| {
                    Ok(DependentService {
                        small: r.resolve::<SmallService>()?,
                    })
                });
            }
            InjectorOp::SeedSmall(svc) => {
                injector.seed(svc);
            }
            InjectorOp::ResolveSmall => {
                match injector.try_resolve::<SmallService>() {
                    Ok(first) => {
                        // A second resolve before any reset returns the
                        // identical cached instance.
                        let second = injector.try_resolve::<SmallService>().unwrap();
                        assert!(Arc::ptr_eq(&first, &second));
                        assert_eq!(first.id, second.id);
                        assert_eq!(first.name, second.name);
                    }
                    Err(InjectError::NotRegistered { .. }) => {}
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }
            InjectorOp::ResolveMedium => {
                let _ = injector.try_resolve::<MediumService>();
            }
            InjectorOp::ResolveDependent => {
                match injector.try_resolve::<DependentService>() {
                    Ok(dep) => {
                        // Transitive construction succeeded; the nested Arc
                        // is alive regardless of later seeds/resets.
                        let _ = dep.small.id;
                    }
                    Err(InjectError::NotRegistered { .. }) => {}
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }
            InjectorOp::ResetContainer => {
                injector.reset_container();
                assert_eq!(injector.cached_len(), 0);
            }
            InjectorOp::ResetFactories => {
                injector.reset_factories();
                assert_eq!(injector.registered_len(), 0);
            }
            InjectorOp::ToggleCycleDetection(enabled) => {
                injector.set_detect_cycles(enabled);
                assert_eq!(injector.detect_cycles(), enabled);
            }
            InjectorOp::QuerySmall => {
                let registered = injector.is_registered::<SmallService>();
                let cached = injector.is_cached::<SmallService>();
                let _ = (registered, cached);
            }
            InjectorOp::Counts => {
                let _ = injector.registered_len();
                let _ = injector.cached_len();
                let _ = injector.is_empty();
            }
        }
    }
});
