//! The creature: owner of state, vitals and the day cycle.
//!
//! [`Creature`] is the host-side [`VitalsSink`]. Every accepted state change
//! is remembered: a time pattern and an activity preference, keyed by the
//! base type of the behavior being executed (or the state label when the
//! change did not come from a behavior).

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use critter_core::behavior::Behavior;
use critter_core::observation::Observation;
use critter_core::selector::SelectionContext;
use critter_core::store::MemoryHandle;
use critter_core::types::ClockTime;
use critter_core::vitals::{self, BehaviorEffect, CreatureState, VitalsSink};
use critter_core::{PersonalityModel, PersonalityTraits};

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAILY_VITALS_DECAY: f64 = 0.95;
const DAILY_VITALS_FLOOR: f64 = 0.5;

/// The desktop pet's mutable state.
pub struct Creature {
    state: CreatureState,
    health: f64,
    happiness: f64,
    age: f64,
    clock: ClockTime,
    day: Option<NaiveDate>,
    personality: PersonalityModel,
    memory: MemoryHandle,
    executing: Option<Behavior>,
    rng: StdRng,
}

impl std::fmt::Debug for Creature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Creature")
            .field("state", &self.state)
            .field("health", &self.health)
            .field("happiness", &self.happiness)
            .field("age", &self.age)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Creature {
    /// A fresh, healthy, idle creature.
    #[must_use]
    pub fn new(personality: PersonalityModel, memory: MemoryHandle) -> Self {
        Self::with_rng(personality, memory, StdRng::from_entropy())
    }

    /// Deterministic creature for tests.
    #[must_use]
    pub fn seeded(personality: PersonalityModel, memory: MemoryHandle, seed: u64) -> Self {
        Self::with_rng(personality, memory, StdRng::seed_from_u64(seed))
    }

    fn with_rng(personality: PersonalityModel, memory: MemoryHandle, rng: StdRng) -> Self {
        Self {
            state: CreatureState::Idle,
            health: 1.0,
            happiness: 1.0,
            age: 0.0,
            clock: ClockTime::new(0, 0),
            day: None,
            personality,
            memory,
            executing: None,
            rng,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CreatureState {
        self.state
    }

    /// Health, 0.0 to 1.0.
    #[must_use]
    pub fn health(&self) -> f64 {
        self.health
    }

    /// Happiness, 0.0 to 1.0.
    #[must_use]
    pub fn happiness(&self) -> f64 {
        self.happiness
    }

    /// Position in the current day, 0.0 at midnight.
    #[must_use]
    pub fn age(&self) -> f64 {
        self.age
    }

    /// Last wall-clock reading.
    #[must_use]
    pub fn clock(&self) -> ClockTime {
        self.clock
    }

    /// The creature's personality.
    #[must_use]
    pub fn personality(&self) -> &PersonalityModel {
        &self.personality
    }

    /// The memory the creature writes to.
    #[must_use]
    pub fn memory(&self) -> &MemoryHandle {
        &self.memory
    }

    /// Replace the personality wholesale.
    pub fn update_personality(&mut self, traits: PersonalityTraits) {
        self.personality = PersonalityModel::new(traits.validated());
        info!(traits = ?self.personality.traits(), "Personality updated");
    }

    /// Feed a wall-clock reading. Crossing midnight resets the day.
    pub fn update_clock(&mut self, now: NaiveDateTime) {
        self.clock = ClockTime::from_datetime(&now);
        let today = now.date();
        match self.day {
            Some(day) if day != today => {
                self.day = Some(today);
                self.reset_for_new_day();
            }
            None => self.day = Some(today),
            Some(_) => {}
        }
        let seconds = f64::from(now.num_seconds_from_midnight());
        self.age = (seconds / SECONDS_PER_DAY).clamp(0.0, 1.0);
    }

    /// Start a new day: remember how the creature felt at this hour, fade the
    /// vitals slightly and go idle unless asleep.
    pub fn reset_for_new_day(&mut self) {
        self.memory.record(Observation::health_pattern(
            self.clock.hour,
            self.health,
            self.happiness,
        ));

        self.health = (self.health * DAILY_VITALS_DECAY).max(DAILY_VITALS_FLOOR);
        self.happiness = (self.happiness * DAILY_VITALS_DECAY).max(DAILY_VITALS_FLOOR);
        self.age = 0.0;
        if self.state != CreatureState::Sleeping {
            self.state = CreatureState::Idle;
        }
        info!(health = self.health, happiness = self.happiness, "New day");
    }

    /// Whether the current state may be interrupted right away.
    #[must_use]
    pub fn allows_interrupt(&self) -> bool {
        !self.state.is_absorbing()
    }

    /// Selection context for this moment.
    #[must_use]
    pub fn selection_context(&self, allows_interrupt: bool) -> SelectionContext {
        let mut ctx = SelectionContext::new(self.clock, self.personality)
            .with_age(self.age)
            .with_vitals(self.health, self.happiness);
        ctx.allows_interrupt = allows_interrupt;
        ctx
    }

    /// Carry out `behavior`: state change first, then its vitals nudges.
    pub fn execute(&mut self, behavior: &Behavior) -> BehaviorEffect {
        self.executing = Some(*behavior);
        let effect = vitals::apply_behavior(behavior, self);
        self.executing = None;
        debug!(
            %behavior,
            state = self.state.as_str(),
            health = self.health,
            happiness = self.happiness,
            "Behavior executed"
        );
        effect
    }

    fn remember_state(&self, state: CreatureState) {
        let activity = self
            .executing
            .map_or_else(|| state.as_str().to_string(), |b| b.base_type().as_str().to_string());
        let enjoyment = state.enjoyment();

        let mut store = self.memory.lock();
        store.record(Observation::TimePattern {
            hour: self.clock.hour,
            minute: self.clock.minute,
            activity: activity.clone(),
        });
        store.record(Observation::ActivityPreference {
            activity_type: activity,
            enjoyment,
        });
    }
}

impl VitalsSink for Creature {
    fn adjust_health(&mut self, delta: f64) {
        self.health = (self.health + delta).clamp(0.0, 1.0);
    }

    fn adjust_happiness(&mut self, delta: f64) {
        self.happiness = (self.happiness + delta).clamp(0.0, 1.0);
    }

    fn set_state(&mut self, state: CreatureState) {
        if state == self.state {
            return;
        }
        if !self.personality.should_transition(self.state, state, &mut self.rng) {
            debug!(from = self.state.as_str(), to = state.as_str(), "Transition refused");
            return;
        }

        self.remember_state(state);
        self.state = state;

        let (health, happiness) = state.entry_effect();
        self.adjust_health(health);
        self.adjust_happiness(happiness);
    }
}
