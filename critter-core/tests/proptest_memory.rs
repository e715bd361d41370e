//! Property-Based Tests for Critter Core
//!
//! Uses `proptest` to check the engine's invariants under random inputs:
//! clamped probabilities, bounded memory strength, upsert idempotence and a
//! selector that always answers.

use proptest::prelude::*;

use critter_core::behavior::{BaseType, Behavior};
use critter_core::config::{MemoryConfig, SelectorConfig};
use critter_core::observation::Observation;
use critter_core::persistence::InMemoryBackend;
use critter_core::selector::{weighted_pick, BehaviorSelector, SelectionContext};
use critter_core::store::{MemoryHandle, MemoryStore};
use critter_core::types::{ClockTime, Point};
use critter_core::{PersonalityModel, PersonalityTraits};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_traits() -> impl Strategy<Value = PersonalityTraits> {
    (
        -1.0..2.0f64, // playfulness
        -1.0..2.0f64, // curiosity
        -1.0..2.0f64, // sleepiness
        -1.0..2.0f64, // sociability
        -1.0..2.0f64, // energy
    )
        .prop_map(|(p, c, s, so, e)| PersonalityTraits {
            playfulness: p,
            curiosity: c,
            sleepiness: s,
            sociability: so,
            energy: e,
        })
}

fn arb_base() -> impl Strategy<Value = BaseType> {
    prop::sample::select(BaseType::ALL.to_vec())
}

fn arb_observation() -> impl Strategy<Value = Observation> {
    prop_oneof![
        ("[a-z]{1,6}", prop::option::of((0.0..500.0f64, 0.0..500.0f64))).prop_map(|(t, loc)| {
            Observation::interaction(t, loc.map(|(x, y)| Point::new(x, y)))
        }),
        (0..3u32, 0.0..500.0f64, 0.0..500.0f64)
            .prop_map(|(s, x, y)| Observation::location(s, Point::new(x, y))),
        (0..24u32, 0..60u32, arb_base())
            .prop_map(|(h, m, b)| Observation::time_pattern(ClockTime::new(h, m), b)),
        ("[A-C]", -2.0..2.0f64).prop_map(|(a, p)| Observation::app_preference(a, p)),
        (arb_base(), 0.0..1.0f64).prop_map(|(b, e)| Observation::activity_preference(b, e)),
        (0..24u32, 0.0..1.0f64, 0.0..1.0f64)
            .prop_map(|(h, he, ha)| Observation::health_pattern(h, he, ha)),
    ]
}

// ---------------------------------------------------------------------------
// Property: derived probabilities stay in [0, 1] without explicit validation
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn probabilities_always_clamped(traits in arb_traits(), tod in 0.0..=1.0f64) {
        let model = PersonalityModel::new(traits);
        for p in [
            model.playfulness_probability(),
            model.curiosity_probability(),
            model.social_interaction_probability(),
            model.sleep_probability(tod),
        ] {
            prop_assert!((0.0..=1.0).contains(&p));
        }
        let f = model.activity_frequency_multiplier();
        prop_assert!((0.5..=1.5).contains(&f));
        for base in BaseType::ALL {
            prop_assert!(model.preference_for_activity(base) >= 0.0);
        }
    }

    #[test]
    fn night_is_sleepier_than_day(traits in arb_traits()) {
        let model = PersonalityModel::new(traits);
        prop_assert!(model.sleep_probability(0.9) >= model.sleep_probability(0.5));
    }
}

// ---------------------------------------------------------------------------
// Property: strength stays in (floor, 1] and decay is monotone
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn strength_bounded_under_any_sequence(
        observations in prop::collection::vec(arb_observation(), 1..60),
        sweeps in 0..5usize,
    ) {
        let config = MemoryConfig { decay_rate: 0.05, ..MemoryConfig::default() };
        let mut store = MemoryStore::open(InMemoryBackend::new(), config, "k");
        for (i, obs) in observations.into_iter().enumerate() {
            store.record(obs);
            if sweeps > 0 && i % (sweeps + 1) == 0 {
                store.decay_sweep();
            }
        }
        for record in store.all() {
            prop_assert!(record.strength() > 0.1);
            prop_assert!(record.strength() <= 1.0);
        }
        for pref in store.app_preferences() {
            prop_assert!((-1.0..=1.0).contains(&pref.preference));
        }
    }

    #[test]
    fn decay_never_increases_strength(
        observations in prop::collection::vec(arb_observation(), 1..30),
    ) {
        let mut store = MemoryStore::ephemeral();
        for obs in observations {
            store.record(obs);
        }
        let before = store.all();
        store.decay_sweep();
        let after = store.all();
        for record in &after {
            let prior = before.iter().find(|r| r.id() == record.id());
            prop_assert!(prior.is_some());
            if let Some(prior) = prior {
                prop_assert!(record.strength() < prior.strength());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property: natural keys deduplicate
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn activity_preference_is_a_running_mean(
        base in arb_base(),
        samples in prop::collection::vec(0.0..1.0f64, 1..20),
    ) {
        let mut store = MemoryStore::ephemeral();
        for s in &samples {
            store.record(Observation::activity_preference(base, *s));
        }
        let prefs = store.activity_preferences();
        prop_assert_eq!(prefs.len(), 1);
        prop_assert_eq!(prefs[0].occurrence_count as usize, samples.len());
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        prop_assert!((prefs[0].enjoyment - mean).abs() < 1e-9);
    }

    #[test]
    fn one_health_pattern_per_hour(hours in prop::collection::vec(0..24u32, 1..50)) {
        let mut store = MemoryStore::ephemeral();
        for h in &hours {
            store.record(Observation::health_pattern(*h, 0.5, 0.5));
        }
        let mut distinct = hours.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(store.len(), distinct.len());
    }
}

// ---------------------------------------------------------------------------
// Property: selection always answers, and seeded runs replay exactly
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn weighted_pick_lands_inside(weights in prop::collection::vec(0.0..10.0f64, 1..20), frac in 0.0..=1.0f64) {
        let total: f64 = weights.iter().sum();
        prop_assume!(total > 0.0);
        let picked = weighted_pick(&weights, frac * total);
        prop_assert!(picked.is_some());
        if let Some(i) = picked {
            prop_assert!(weights[i] > 0.0);
        }
    }

    #[test]
    fn selector_always_returns_a_behavior(
        traits in arb_traits(),
        hour in 0..24u32,
        minute in 0..60u32,
        age in 0.0..=1.0f64,
        health in 0.0..=1.0f64,
        happiness in 0.0..=1.0f64,
        seed in any::<u64>(),
    ) {
        let memory = MemoryHandle::new(MemoryStore::ephemeral());
        let mut selector = BehaviorSelector::seeded(memory, SelectorConfig::default(), seed);
        let ctx = SelectionContext::new(ClockTime::new(hour, minute), PersonalityModel::new(traits))
            .with_age(age)
            .with_vitals(health, happiness);
        for _ in 0..10 {
            let chosen = selector.select_next(&ctx);
            prop_assert!(Behavior::CANDIDATES.iter().any(|c| c.tag() == chosen.tag()));
        }
    }

    #[test]
    fn seeded_selection_is_reproducible(seed in any::<u64>(), hour in 0..24u32) {
        let ctx = SelectionContext::new(ClockTime::new(hour, 0), PersonalityModel::default());
        let run = |seed| {
            let memory = MemoryHandle::new(MemoryStore::ephemeral());
            let mut selector = BehaviorSelector::seeded(memory, SelectorConfig::default(), seed);
            (0..20).map(|_| selector.select_next(&ctx)).collect::<Vec<_>>()
        };
        prop_assert_eq!(run(seed), run(seed));
    }
}
