//! Scheduling: repeating timers behind a trait.
//!
//! The driver never touches a timer API directly. It asks a [`Scheduler`] for
//! a repeating callback and keeps the returned [`CancelHandle`]. Production
//! code uses [`TokioScheduler`]; tests use [`ManualScheduler`] and advance
//! virtual time by hand.
//!
//! A cancelled timer never fires again, even if its next tick was already due.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use critter_core::config::ClockConfig;
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Callback run on every tick of a repeating timer.
pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

/// Source of repeating timers.
pub trait Scheduler: Send + Sync {
    /// Run `callback` every `interval`, starting one interval from now.
    fn schedule_repeating(&self, interval: Duration, callback: TickCallback) -> CancelHandle;
}

/// Handle to a scheduled timer. Dropping it cancels the timer.
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancelHandle {
    /// Handle over a shared cancellation flag.
    #[must_use]
    pub fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self {
            cancelled,
            on_cancel: None,
        }
    }

    /// Run `hook` once when the handle is cancelled.
    #[must_use]
    pub fn with_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(hook));
        self
    }

    /// Stop the timer. Idempotent.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(hook) = self.on_cancel.take() {
            hook();
        }
    }

    /// Whether [`cancel`](Self::cancel) has run.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Interval between activity checks.
///
/// `base × max(min_settings_multiplier, minutes / 10) / frequency_multiplier`,
/// so a lower frequency setting and a more energetic creature both check
/// more often.
#[must_use]
pub fn check_interval(config: &ClockConfig, frequency_minutes: u32, frequency_multiplier: f64) -> Duration {
    let settings = (f64::from(frequency_minutes) / 10.0).max(config.min_settings_multiplier);
    #[allow(clippy::cast_precision_loss)]
    let base = config.base_check_interval_secs as f64;
    let secs = base * settings / frequency_multiplier.max(f64::EPSILON);
    Duration::from_secs_f64(secs)
}

/// Shortest period a repeating timer runs at. Zero intervals are raised to it.
pub const MIN_TIMER_INTERVAL: Duration = Duration::from_millis(1);

fn timer_period(interval: Duration) -> Duration {
    interval.max(MIN_TIMER_INTERVAL)
}

// ---------------------------------------------------------------------------
// Tokio
// ---------------------------------------------------------------------------

/// Scheduler backed by tokio interval tasks.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    /// Scheduler on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }

    /// Scheduler on an explicit runtime.
    #[must_use]
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, interval: Duration, mut callback: TickCallback) -> CancelHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let interval = timer_period(interval);

        let task = self.runtime.spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                callback();
            }
        });

        debug!(?interval, "Repeating timer scheduled");
        CancelHandle::new(cancelled).with_hook(move || task.abort())
    }
}

// ---------------------------------------------------------------------------
// Manual
// ---------------------------------------------------------------------------

struct ManualTimer {
    interval: Duration,
    next_due: Duration,
    callback: Option<TickCallback>,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    timers: Vec<ManualTimer>,
}

/// Scheduler driven by explicit calls to [`advance`](Self::advance).
///
/// Timers fire in due-time order; a timer due several times within one
/// advance fires once per due tick.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("timers", &state.timers.len())
            .finish()
    }
}

impl ManualScheduler {
    /// Scheduler at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed so far.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Live (uncancelled) timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .timers
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Move virtual time forward by `by`, firing every timer that falls due.
    ///
    /// Callbacks run without the scheduler lock held, so they may schedule or
    /// cancel timers themselves.
    pub fn advance(&self, by: Duration) {
        let target = self.state.lock().now + by;
        loop {
            let (key, mut callback) = {
                let mut state = self.state.lock();
                state.timers.retain(|t| !t.cancelled.load(Ordering::SeqCst));
                let due = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.next_due <= target && t.callback.is_some())
                    .min_by_key(|(_, t)| t.next_due)
                    .map(|(i, _)| i);
                let Some(index) = due else {
                    state.now = target;
                    return;
                };
                let timer = &mut state.timers[index];
                let due_at = timer.next_due;
                timer.next_due += timer.interval;
                let key = Arc::clone(&timer.cancelled);
                let callback = timer.callback.take();
                state.now = due_at;
                let Some(callback) = callback else {
                    state.now = target;
                    return;
                };
                trace!(?due_at, "Manual timer fired");
                (key, callback)
            };

            callback();

            let mut state = self.state.lock();
            if let Some(timer) = state
                .timers
                .iter_mut()
                .find(|t| Arc::ptr_eq(&t.cancelled, &key))
            {
                timer.callback = Some(callback);
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, interval: Duration, callback: TickCallback) -> CancelHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let interval = timer_period(interval);
        let mut state = self.state.lock();
        let next_due = state.now + interval;
        state.timers.push(ManualTimer {
            interval,
            next_due,
            callback: Some(callback),
            cancelled: Arc::clone(&cancelled),
        });
        CancelHandle::new(cancelled)
    }
}
