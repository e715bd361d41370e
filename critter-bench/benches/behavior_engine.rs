//! Critter Benchmark Suite
//!
//! Selection runs on every activity tick and the decay sweep once a day, so
//! both should stay far below a frame:
//!   select_next_empty_memory ........ < 20μs
//!   select_next_300_memories ........ < 200μs
//!   decay_sweep_300_memories ........ < 50μs
//!   driver_trigger .................. < 250μs

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use critter_core::behavior::BaseType;
use critter_core::config::{CritterConfig, MemoryConfig, SelectorConfig};
use critter_core::decay;
use critter_core::types::{ClockTime, Point};
use critter_core::{
    BehaviorSelector, MemoryHandle, MemoryStore, Observation, PersonalityModel, PersonalityTraits,
    SelectionContext,
};
use critter_runtime::{BehaviorDriver, Creature};

/// A store with `n` memories spread over every kind.
fn populated_store(n: usize) -> MemoryStore {
    let mut rng = StdRng::seed_from_u64(42);
    let mut store = MemoryStore::ephemeral();
    for i in 0..n {
        let base = BaseType::ALL[i % BaseType::ALL.len()];
        let obs = match i % 6 {
            0 => Observation::interaction("click", Some(Point::new(rng.gen_range(0.0..1920.0), 10.0))),
            1 => Observation::location(
                0,
                Point::new(rng.gen_range(0.0..1920.0), rng.gen_range(0.0..1080.0)),
            ),
            2 => Observation::time_pattern(
                ClockTime::new(rng.gen_range(0..24), rng.gen_range(0..60)),
                base,
            ),
            3 => Observation::app_preference(format!("app-{}", i % 20), rng.gen_range(-1.0..1.0)),
            4 => Observation::activity_preference(base, rng.gen_range(0.0..1.0)),
            _ => Observation::health_pattern(rng.gen_range(0..24), 0.8, 0.6),
        };
        store.record(obs);
    }
    store
}

fn context() -> SelectionContext {
    let traits = PersonalityTraits::new(0.8, 0.7, 0.3, 0.6, 0.9);
    SelectionContext::new(ClockTime::new(14, 30), PersonalityModel::new(traits))
        .with_vitals(0.7, 0.6)
}

fn bench_select_empty(c: &mut Criterion) {
    let memory = MemoryHandle::new(MemoryStore::ephemeral());
    let mut selector = BehaviorSelector::seeded(memory, SelectorConfig::default(), 1);
    let ctx = context();

    c.bench_function("select_next_empty_memory", |b| {
        b.iter(|| black_box(selector.select_next(black_box(&ctx))));
    });
}

fn bench_select_with_memories(c: &mut Criterion) {
    let memory = MemoryHandle::new(populated_store(300));
    let mut selector = BehaviorSelector::seeded(memory, SelectorConfig::default(), 1);
    let ctx = context();

    c.bench_function("select_next_300_memories", |b| {
        b.iter(|| black_box(selector.select_next(black_box(&ctx))));
    });
}

fn bench_decay_sweep(c: &mut Criterion) {
    let records = populated_store(300).all();
    let config = MemoryConfig::default();

    c.bench_function("decay_sweep_300_memories", |b| {
        b.iter_batched(
            || records.clone(),
            |mut records| black_box(decay::decay_records(&mut records, black_box(&config))),
            BatchSize::SmallInput,
        );
    });
}

fn bench_driver_trigger(c: &mut Criterion) {
    let config = CritterConfig::default();
    let memory = MemoryHandle::new(populated_store(300));
    let traits = PersonalityTraits::new(0.8, 0.7, 0.3, 0.6, 0.9);
    let creature = Creature::seeded(PersonalityModel::new(traits), memory.clone(), 1);
    let selector = BehaviorSelector::seeded(memory, config.selector.clone(), 1);
    let driver = BehaviorDriver::new(creature, selector, &config);

    c.bench_function("driver_trigger", |b| {
        b.iter(|| black_box(driver.trigger()));
    });
}

criterion_group!(
    benches,
    bench_select_empty,
    bench_select_with_memories,
    bench_decay_sweep,
    bench_driver_trigger,
);
criterion_main!(benches);
