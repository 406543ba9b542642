//! Benchmarks for the resolution engines

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use inject::{BuildModel, BuilderRegistry, Injector};
use std::hint::black_box;

#[allow(dead_code)]
#[derive(Clone)]
struct SmallService {
    value: i32,
}

#[allow(dead_code)]
#[derive(Clone)]
struct MediumService {
    name: String,
    values: Vec<i32>,
}

#[allow(dead_code)]
#[derive(Clone)]
struct DependentService {
    small: std::sync::Arc<SmallService>,
}

struct SmallModel {
    value: i32,
}

impl BuildModel for SmallModel {
    type Output = SmallService;
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    group.bench_function("register_singleton", |b| {
        b.iter(|| {
            let injector = Injector::new();
            injector.register(|_| Ok(SmallService { value: 42 }));
            black_box(injector)
        })
    });

    group.bench_function("register_unsynced_singleton", |b| {
        b.iter(|| {
            let mut injector = Injector::new();
            injector.register_unsynced(|_| Ok(SmallService { value: 42 }));
            black_box(injector)
        })
    });

    group.bench_function("register_model", |b| {
        b.iter(|| {
            let registry = BuilderRegistry::new();
            registry.register(|model: SmallModel| SmallService { value: model.value });
            black_box(registry)
        })
    });

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.throughput(Throughput::Elements(1));

    // Pre-registered, pre-resolved injector: the hot path hits the cache
    let injector = Injector::new();
    injector.register(|_| Ok(SmallService { value: 42 }));
    injector.register(|_| {
        Ok(MediumService {
            name: "test".to_string(),
            values: vec![1, 2, 3, 4, 5],
        })
    });
    injector.register(|r| {
        Ok(DependentService {
            small: r.resolve()?,
        })
    });
    let _ = injector.resolve::<SmallService>();
    let _ = injector.resolve::<MediumService>();
    let _ = injector.resolve::<DependentService>();

    group.bench_function("resolve_cached", |b| {
        b.iter(|| {
            let service = injector.resolve::<SmallService>();
            black_box(service)
        })
    });

    group.bench_function("resolve_cached_medium", |b| {
        b.iter(|| {
            let service = injector.resolve::<MediumService>();
            black_box(service)
        })
    });

    group.bench_function("try_resolve_not_registered", |b| {
        struct Unregistered;
        b.iter(|| {
            let result = injector.try_resolve::<Unregistered>();
            black_box(result.is_err())
        })
    });

    group.bench_function("is_registered", |b| {
        b.iter(|| {
            let exists = injector.is_registered::<SmallService>();
            black_box(exists)
        })
    });

    group.finish();
}

fn bench_first_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_resolution");
    group.throughput(Throughput::Elements(1));

    // Each iteration pays the factory invocation: reset between resolves
    group.bench_function("construct_leaf", |b| {
        let injector = Injector::new();
        injector.register(|_| Ok(SmallService { value: 42 }));

        b.iter(|| {
            injector.reset_container();
            let service = injector.resolve::<SmallService>();
            black_box(service)
        })
    });

    group.bench_function("construct_chain_of_two", |b| {
        let injector = Injector::new();
        injector.register(|_| Ok(SmallService { value: 42 }));
        injector.register(|r| {
            Ok(DependentService {
                small: r.resolve()?,
            })
        });

        b.iter(|| {
            injector.reset_container();
            let service = injector.resolve::<DependentService>();
            black_box(service)
        })
    });

    group.bench_function("construct_with_cycle_detection", |b| {
        let injector = Injector::builder().detect_cycles(true).build();
        injector.register(|_| Ok(SmallService { value: 42 }));
        injector.register(|r| {
            Ok(DependentService {
                small: r.resolve()?,
            })
        });

        b.iter(|| {
            injector.reset_container();
            let service = injector.resolve::<DependentService>();
            black_box(service)
        })
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.throughput(Throughput::Elements(1));

    let registry = BuilderRegistry::new();
    registry.register(|model: SmallModel| SmallService { value: model.value });

    group.bench_function("build_small_model", |b| {
        b.iter(|| {
            let service = registry.build(SmallModel { value: 42 });
            black_box(service)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_registration,
    bench_resolution,
    bench_first_resolution,
    bench_build
);
criterion_main!(benches);
