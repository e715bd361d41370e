//! Behavior driver: the activity clock.
//!
//! The driver owns the creature and the selector and asks for a new
//! behavior on a personality-modulated cadence:
//!
//! ```text
//! every check_interval:
//!     since_last += check_interval
//!     absorbing state (sleeping, dancing, watching)?  wait max_activity_interval
//!     otherwise                                      wait min_activity_interval
//!     with probability activity_probability × frequency multiplier:
//!         select → execute → notify observers
//! ```
//!
//! A second timer runs the memory decay sweep once per decay interval.
//! [`BehaviorDriver::start`] returns a [`DriverHandle`]; stopping or dropping
//! it cancels both timers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use critter_core::behavior::Behavior;
use critter_core::config::{ClockConfig, CritterConfig};
use critter_core::selector::BehaviorSelector;
use critter_core::store::MemoryHandle;

use crate::clock::{self, CancelHandle, Scheduler};
use crate::creature::Creature;
use crate::events::{self, PetEvent};

/// Callback notified of every executed behavior.
pub type BehaviorObserver = Box<dyn FnMut(&Behavior) + Send + 'static>;

/// Source of wall-clock readings.
pub type WallClock = Box<dyn Fn() -> NaiveDateTime + Send + 'static>;

struct DriverState {
    creature: Creature,
    selector: BehaviorSelector,
    config: ClockConfig,
    frequency_minutes: u32,
    since_last: Duration,
    wall_clock: WallClock,
    rng: StdRng,
}

impl DriverState {
    fn check_interval(&self) -> Duration {
        clock::check_interval(
            &self.config,
            self.frequency_minutes,
            self.creature.personality().activity_frequency_multiplier(),
        )
    }

    fn refresh_clock(&mut self) {
        let now = (self.wall_clock)();
        self.creature.update_clock(now);
    }

    /// Gate a scheduled tick. Returns whether an activity should run.
    fn gate(&mut self, elapsed: Duration) -> bool {
        self.since_last += elapsed;

        let required = if self.creature.state().is_absorbing() {
            self.config.max_activity_interval_secs
        } else {
            self.config.min_activity_interval_secs
        };
        if self.since_last < Duration::from_secs(required) {
            return false;
        }

        let multiplier = self.creature.personality().activity_frequency_multiplier();
        self.rng.r#gen::<f64>() < self.config.activity_probability * multiplier
    }

    /// Select and execute. `None` when the creature kept its current
    /// behavior.
    fn run(&mut self, allows_interrupt: bool) -> Option<Behavior> {
        let ctx = self.creature.selection_context(allows_interrupt);
        let previous = self.selector.current_activity();
        let behavior = self.selector.select_next(&ctx);
        if !allows_interrupt && previous == Some(behavior) {
            return None;
        }
        self.execute(behavior);
        Some(behavior)
    }

    fn execute(&mut self, behavior: Behavior) {
        self.creature.execute(&behavior);
        self.since_last = Duration::ZERO;
    }
}

#[derive(Default)]
struct Timers {
    scheduler: Option<Arc<dyn Scheduler>>,
    tick: Option<CancelHandle>,
    decay: Option<CancelHandle>,
}

/// Runs the creature's activity clock.
///
/// Cheap to clone; clones share one creature and selector.
#[derive(Clone)]
pub struct BehaviorDriver {
    state: Arc<Mutex<DriverState>>,
    observers: Arc<Mutex<Vec<BehaviorObserver>>>,
    timers: Arc<Mutex<Timers>>,
    memory: MemoryHandle,
    decay_interval: Duration,
}

impl std::fmt::Debug for BehaviorDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BehaviorDriver")
            .field("creature", &state.creature)
            .field("selector", &state.selector)
            .field("frequency_minutes", &state.frequency_minutes)
            .finish_non_exhaustive()
    }
}

impl BehaviorDriver {
    /// Driver over `creature` and `selector`, reading the local wall clock.
    #[must_use]
    pub fn new(creature: Creature, selector: BehaviorSelector, config: &CritterConfig) -> Self {
        Self::with_wall_clock(
            creature,
            selector,
            config,
            Box::new(|| Local::now().naive_local()),
        )
    }

    /// Driver with an explicit wall clock.
    #[must_use]
    pub fn with_wall_clock(
        mut creature: Creature,
        selector: BehaviorSelector,
        config: &CritterConfig,
        wall_clock: WallClock,
    ) -> Self {
        creature.update_clock(wall_clock());
        let memory = creature.memory().clone();
        let state = DriverState {
            creature,
            selector,
            config: config.clock.clone(),
            frequency_minutes: config.clock.activity_frequency_minutes,
            since_last: Duration::ZERO,
            wall_clock,
            rng: StdRng::from_entropy(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            observers: Arc::new(Mutex::new(Vec::new())),
            timers: Arc::new(Mutex::new(Timers::default())),
            memory,
            decay_interval: Duration::from_secs(config.memory.decay_interval_hours * 3600),
        }
    }

    /// Reseed the gating RNG.
    #[must_use]
    pub fn seeded(self, seed: u64) -> Self {
        self.state.lock().rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Register an observer for executed behaviors.
    ///
    /// Observers run after the driver's lock is released.
    pub fn on_behavior(&self, observer: impl FnMut(&Behavior) + Send + 'static) {
        self.observers.lock().push(Box::new(observer));
    }

    /// Start both timers on `scheduler`.
    pub fn start(&self, scheduler: Arc<dyn Scheduler>) -> DriverHandle {
        {
            let mut timers = self.timers.lock();
            timers.scheduler = Some(Arc::clone(&scheduler));
            timers.tick = Some(self.schedule_tick(scheduler.as_ref()));

            let memory = self.memory.clone();
            timers.decay = Some(scheduler.schedule_repeating(
                self.decay_interval,
                Box::new(move || {
                    memory.decay_sweep();
                }),
            ));
        }
        info!(
            check_interval = ?self.check_interval(),
            decay_interval = ?self.decay_interval,
            "Behavior driver started"
        );
        DriverHandle {
            driver: self.clone(),
            stopped: false,
        }
    }

    fn schedule_tick(&self, scheduler: &dyn Scheduler) -> CancelHandle {
        let interval = self.check_interval();
        let driver = self.clone();
        scheduler.schedule_repeating(
            interval,
            Box::new(move || {
                driver.tick(interval);
            }),
        )
    }

    /// Change the activity frequency setting and re-register the tick.
    pub fn set_activity_frequency(&self, minutes: u32) {
        self.state.lock().frequency_minutes = minutes;

        let mut timers = self.timers.lock();
        if let Some(mut old) = timers.tick.take() {
            old.cancel();
        }
        if let Some(scheduler) = timers.scheduler.clone() {
            timers.tick = Some(self.schedule_tick(scheduler.as_ref()));
        }
        info!(minutes, check_interval = ?self.check_interval(), "Activity frequency changed");
    }

    /// Current interval between activity checks.
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        self.state.lock().check_interval()
    }

    /// One scheduled check, `elapsed` after the previous one.
    ///
    /// Returns the executed behavior, if the gate let one through.
    pub fn tick(&self, elapsed: Duration) -> Option<Behavior> {
        let fired = {
            let mut state = self.state.lock();
            state.refresh_clock();
            if state.gate(elapsed) {
                state.run(true)
            } else {
                None
            }
        };
        if let Some(behavior) = fired {
            self.notify(&behavior);
        }
        fired
    }

    /// Select and execute now, ignoring the activity interval.
    ///
    /// An absorbing state keeps its current behavior and nothing runs.
    pub fn trigger(&self) -> Option<Behavior> {
        let fired = {
            let mut state = self.state.lock();
            state.refresh_clock();
            let allows = state.creature.allows_interrupt();
            state.run(allows)
        };
        if let Some(behavior) = fired {
            self.notify(&behavior);
        }
        fired
    }

    /// Execute `behavior` immediately, bypassing selection.
    pub fn force(&self, behavior: Behavior) -> Behavior {
        {
            let mut state = self.state.lock();
            state.refresh_clock();
            let forced = state.selector.force(behavior);
            state.execute(forced);
        }
        self.notify(&behavior);
        behavior
    }

    /// Behavior most recently executed.
    #[must_use]
    pub fn current_activity(&self) -> Option<Behavior> {
        self.state.lock().selector.current_activity()
    }

    /// Links left in the active chain.
    #[must_use]
    pub fn chain_remaining(&self) -> usize {
        self.state.lock().selector.chain_remaining().len()
    }

    /// Feed a host event to the creature.
    pub fn handle_event(&self, event: &PetEvent) {
        let mut state = self.state.lock();
        state.refresh_clock();
        events::apply(event, &mut state.creature);
    }

    /// Run `f` with the creature.
    pub fn with_creature<R>(&self, f: impl FnOnce(&mut Creature) -> R) -> R {
        f(&mut self.state.lock().creature)
    }

    /// The shared memory.
    #[must_use]
    pub fn memory(&self) -> &MemoryHandle {
        &self.memory
    }

    fn notify(&self, behavior: &Behavior) {
        for observer in self.observers.lock().iter_mut() {
            observer(behavior);
        }
    }

    fn stop(&self) {
        let mut timers = self.timers.lock();
        if let Some(mut tick) = timers.tick.take() {
            tick.cancel();
        }
        if let Some(mut decay) = timers.decay.take() {
            decay.cancel();
        }
        timers.scheduler = None;
        debug!("Behavior driver stopped");
    }
}

/// Keeps a started driver running. Stop or drop it to cancel both timers.
#[derive(Debug)]
pub struct DriverHandle {
    driver: BehaviorDriver,
    stopped: bool,
}

impl DriverHandle {
    /// The driver this handle controls.
    #[must_use]
    pub fn driver(&self) -> &BehaviorDriver {
        &self.driver
    }

    /// Cancel both timers. No callback fires afterwards.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.driver.stop();
        }
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualScheduler;
    use chrono::NaiveDate;
    use critter_core::behavior::SleepDepth;
    use critter_core::config::SelectorConfig;
    use critter_core::observation::Observation;
    use critter_core::store::MemoryStore;
    use critter_core::types::Point;
    use critter_core::vitals::CreatureState;
    use critter_core::{PersonalityModel, PersonalityTraits};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn afternoon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 4)
            .and_then(|d| d.and_hms_opt(15, 0, 0))
            .expect("valid date")
    }

    fn driver_with(config: &CritterConfig, energy: f64) -> BehaviorDriver {
        let memory = MemoryHandle::new(MemoryStore::ephemeral());
        let personality =
            PersonalityModel::new(PersonalityTraits::new(0.7, 0.5, 0.3, 0.5, energy));
        let creature = Creature::seeded(personality, memory.clone(), 7);
        let selector = BehaviorSelector::seeded(memory, config.selector.clone(), 7);
        BehaviorDriver::with_wall_clock(creature, selector, config, Box::new(afternoon)).seeded(7)
    }

    fn always_fire() -> CritterConfig {
        let mut config = CritterConfig::default();
        config.clock.activity_probability = 1.0;
        config
    }

    #[test]
    fn gate_waits_for_min_interval() {
        let driver = driver_with(&always_fire(), 0.5);
        assert_eq!(driver.tick(Duration::from_secs(5)), None);
        assert!(driver.tick(Duration::from_secs(5)).is_some());
        // Interval restarts after an activity.
        assert_eq!(driver.tick(Duration::from_secs(5)), None);
    }

    #[test]
    fn absorbing_states_wait_longer() {
        let driver = driver_with(&always_fire(), 0.5);
        driver.force(Behavior::Napping(SleepDepth::Deep));
        driver.with_creature(|c| assert_eq!(c.state(), CreatureState::Sleeping));

        assert_eq!(driver.tick(Duration::from_secs(60)), None);
        assert_eq!(driver.tick(Duration::from_secs(59)), None);
        assert!(driver.tick(Duration::from_secs(1)).is_some());
    }

    #[test]
    fn zero_probability_never_fires() {
        let mut config = CritterConfig::default();
        config.clock.activity_probability = 0.0;
        let driver = driver_with(&config, 1.0);
        for _ in 0..50 {
            assert_eq!(driver.tick(Duration::from_secs(30)), None);
        }
    }

    #[test]
    fn observers_see_every_executed_behavior() {
        let driver = driver_with(&always_fire(), 0.5);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        driver.on_behavior(move |b| log.lock().push(*b));

        let first = driver.trigger().expect("idle creature accepts a trigger");
        let forced = driver.force(Behavior::Bored);
        assert_eq!(*seen.lock(), vec![first, forced]);
        assert_eq!(driver.current_activity(), Some(Behavior::Bored));
    }

    #[test]
    fn trigger_leaves_absorbing_behavior_alone() {
        let driver = driver_with(&always_fire(), 0.5);
        driver.force(Behavior::Napping(SleepDepth::Medium));
        assert_eq!(driver.trigger(), None);
        assert_eq!(
            driver.current_activity(),
            Some(Behavior::Napping(SleepDepth::Medium))
        );
    }

    #[test]
    fn executing_behaviors_feeds_memory() {
        let driver = driver_with(&always_fire(), 0.5);
        driver.force(Behavior::Playing(None));
        let store = driver.memory().lock();
        assert!(store.find_time_pattern(15, 0, "playing").is_some());
        assert!(store.activity_preference("playing").is_some());
    }

    #[test]
    fn scheduled_ticks_run_until_stopped() {
        let config = always_fire();
        let driver = driver_with(&config, 0.5);
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        driver.on_behavior(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let scheduler = ManualScheduler::new();
        let handle = driver.start(Arc::new(scheduler.clone()));
        assert_eq!(scheduler.pending(), 2);

        // 15s × 0.3 / 1.0 = 4.5s per check, at most 120s between activities.
        scheduler.advance(Duration::from_secs(300));
        let fired = count.load(Ordering::SeqCst);
        assert!(fired >= 2, "fired {fired}");

        handle.stop();
        assert_eq!(scheduler.pending(), 0);
        scheduler.advance(Duration::from_secs(600));
        assert_eq!(count.load(Ordering::SeqCst), fired);
    }

    #[test]
    fn daily_decay_runs_on_schedule() {
        let mut config = CritterConfig::default();
        config.clock.activity_probability = 0.0;
        let driver = driver_with(&config, 0.5);
        driver
            .memory()
            .record(Observation::interaction("click", Some(Point::new(0.0, 0.0))));

        let scheduler = ManualScheduler::new();
        let _handle = driver.start(Arc::new(scheduler.clone()));
        scheduler.advance(Duration::from_secs(24 * 3600));

        let strength = driver.memory().lock().interactions()[0].strength;
        assert!((strength - 0.999).abs() < 1e-9);
    }

    #[test]
    fn frequency_change_reschedules_tick() {
        let driver = driver_with(&always_fire(), 0.5);
        let scheduler = ManualScheduler::new();
        let _handle = driver.start(Arc::new(scheduler.clone()));

        let before = driver.check_interval();
        driver.set_activity_frequency(10);
        assert!(driver.check_interval() > before);
        assert_eq!(driver.check_interval(), Duration::from_secs(15));
        assert_eq!(scheduler.pending(), 2);
    }

    #[test]
    fn events_reach_the_creature() {
        let driver = driver_with(&always_fire(), 0.5);
        driver.handle_event(&PetEvent::FocusChanged { focusing: true });
        driver.handle_event(&PetEvent::AppChanged {
            app_name: "Editor".into(),
        });
        driver.with_creature(|c| assert_eq!(c.state(), CreatureState::Sitting));
        let prefs = driver.memory().lock().app_preferences();
        assert!((prefs[0].preference - 0.3).abs() < 1e-9);
    }

    #[test]
    fn selector_config_is_honoured() {
        let mut config = always_fire();
        config.selector = SelectorConfig {
            chain_energy_threshold: 0.0,
            chain_energy_probability: 1.0,
            chain_min_length: 4,
            chain_max_length: 4,
            ..SelectorConfig::default()
        };
        let driver = driver_with(&config, 0.5);
        assert!(driver.trigger().is_some());
        assert_eq!(driver.chain_remaining(), 3);

        driver.force(Behavior::Bored);
        assert_eq!(driver.chain_remaining(), 0);
    }
}
