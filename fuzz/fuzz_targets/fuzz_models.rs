#![no_main]

//! Fuzz target for the model construction registries
//!
//! Pushes arbitrary payloads through build/hydrate and checks the
//! invoke-exactly-once, cache-nothing contract.

use arbitrary::Arbitrary;
use inject::{BuildModel, BuilderRegistry, HydrationModel, HydrationRegistry};
use libfuzzer_sys::fuzz_target;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Debug, Arbitrary)]
struct WidgetModel {
    id: u32,
    label: String,
    tags: Vec<String>,
}

impl BuildModel for WidgetModel {
    type Output = Widget;
}

#[derive(Clone, Debug)]
struct Widget {
    id: u32,
    label: String,
    tag_count: usize,
}

#[derive(Clone, Debug, Arbitrary)]
struct RecordModel {
    payload: Vec<u8>,
}

impl HydrationModel for RecordModel {
    type Output = usize;
}

static BUILDS: AtomicU64 = AtomicU64::new(0);
static HYDRATIONS: AtomicU64 = AtomicU64::new(0);

fuzz_target!(|models: Vec<(WidgetModel, RecordModel)>| {
    let builders = BuilderRegistry::new();
    let hydrators = HydrationRegistry::new();

    builders.register(|model: WidgetModel| {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        Widget {
            id: model.id,
            label: model.label,
            tag_count: model.tags.len(),
        }
    });

    hydrators.register(|model: RecordModel| {
        HYDRATIONS.fetch_add(1, Ordering::SeqCst);
        model.payload.len()
    });

    let builds_before = BUILDS.load(Ordering::SeqCst);
    let hydrations_before = HYDRATIONS.load(Ordering::SeqCst);
    let count = models.len() as u64;

    for (widget_model, record_model) in models {
        let expected_id = widget_model.id;
        let expected_label = widget_model.label.clone();
        let expected_tags = widget_model.tags.len();

        let widget = builders.build(widget_model);
        assert_eq!(widget.id, expected_id);
        assert_eq!(widget.label, expected_label);
        assert_eq!(widget.tag_count, expected_tags);

        let expected_len = record_model.payload.len();
        assert_eq!(hydrators.hydrate(record_model), expected_len);
    }

    // One factory invocation per call - nothing was cached or skipped.
    assert_eq!(BUILDS.load(Ordering::SeqCst) - builds_before, count);
    assert_eq!(HYDRATIONS.load(Ordering::SeqCst) - hydrations_before, count);
});
