//! Vitals: the contract between the selector and whoever owns the creature.
//!
//! The selector only *chooses* a [`Behavior`]. The state owner applies it
//! through a [`VitalsSink`]: a state change plus small health/happiness
//! nudges. Clamping is the sink's job.

use serde::{Deserialize, Serialize};

use crate::behavior::{Behavior, SleepDepth, SocialReaction};

/// Visible state of the creature's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatureState {
    /// Standing still.
    #[default]
    Idle,
    /// Walking.
    Walking,
    /// Running.
    Running,
    /// Eating.
    Eating,
    /// Playing.
    Playing,
    /// Being dragged by the user.
    Dragging,
    /// Just released by the user.
    Dropped,
    /// Dancing to music.
    Dancing,
    /// Watching something.
    Watching,
    /// Sitting down.
    Sitting,
    /// Asleep.
    Sleeping,
}

impl CreatureState {
    /// Lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walking => "walking",
            Self::Running => "running",
            Self::Eating => "eating",
            Self::Playing => "playing",
            Self::Dragging => "dragging",
            Self::Dropped => "dropped",
            Self::Dancing => "dancing",
            Self::Watching => "watching",
            Self::Sitting => "sitting",
            Self::Sleeping => "sleeping",
        }
    }

    /// States that should not be interrupted until the long activity
    /// interval has passed.
    #[must_use]
    pub fn is_absorbing(self) -> bool {
        matches!(self, Self::Sleeping | Self::Dancing | Self::Watching)
    }

    /// Enjoyment recorded when the creature enters this state.
    #[must_use]
    pub fn enjoyment(self) -> f64 {
        match self {
            Self::Playing | Self::Dancing => 0.9,
            Self::Eating => 0.8,
            Self::Sleeping => 0.7,
            Self::Watching => 0.6,
            _ => 0.5,
        }
    }

    /// `(health, happiness)` change applied on entering this state.
    #[must_use]
    pub fn entry_effect(self) -> (f64, f64) {
        match self {
            Self::Running => (0.0, 0.04),
            Self::Eating => (0.04, 0.06),
            Self::Playing => (0.0, 0.08),
            Self::Dancing => (0.0, 0.1),
            Self::Watching => (0.0, 0.05),
            Self::Sitting => (0.02, 0.0),
            Self::Sleeping => (0.05, 0.0),
            Self::Idle | Self::Walking | Self::Dragging | Self::Dropped => (0.0, 0.0),
        }
    }
}

/// Sink for vitals mutations, implemented by the creature's state owner.
pub trait VitalsSink {
    /// Nudge health by `delta`. The sink clamps to [0, 1].
    fn adjust_health(&mut self, delta: f64);
    /// Nudge happiness by `delta`. The sink clamps to [0, 1].
    fn adjust_happiness(&mut self, delta: f64);
    /// Request a state change. The sink may refuse it.
    fn set_state(&mut self, state: CreatureState);
}

/// What executing a behavior does to the creature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorEffect {
    /// State to enter.
    pub state: CreatureState,
    /// Health change.
    pub health_delta: f64,
    /// Happiness change.
    pub happiness_delta: f64,
}

impl BehaviorEffect {
    const fn new(state: CreatureState, health_delta: f64, happiness_delta: f64) -> Self {
        Self {
            state,
            health_delta,
            happiness_delta,
        }
    }

    /// Effect of executing `behavior`.
    #[must_use]
    pub fn of(behavior: &Behavior) -> Self {
        use CreatureState as S;
        match behavior {
            Behavior::Exploring(_) | Behavior::Wandering => Self::new(S::Walking, 0.0, 0.0),
            Behavior::Playing(_) => Self::new(S::Playing, 0.0, 0.1),
            Behavior::Resting => Self::new(S::Sitting, 0.05, 0.0),
            Behavior::Napping(depth) => {
                let boost = match depth {
                    SleepDepth::Light => 0.03,
                    SleepDepth::Medium => 0.05,
                    SleepDepth::Deep => 0.08,
                };
                Self::new(S::Sleeping, boost, 0.0)
            }
            Behavior::Observing | Behavior::Startled | Behavior::Confused => {
                Self::new(S::Idle, 0.0, 0.0)
            }
            Behavior::Curious(_) => Self::new(S::Watching, 0.0, 0.03),
            Behavior::Social(SocialReaction::Friendly | SocialReaction::Excited) => {
                Self::new(S::Playing, 0.0, 0.12)
            }
            Behavior::Social(SocialReaction::Shy) => Self::new(S::Sitting, 0.0, 0.0),
            Behavior::Social(SocialReaction::Calm) => Self::new(S::Idle, 0.0, 0.0),
            Behavior::Excited => Self::new(S::Playing, 0.0, 0.15),
            Behavior::Bored => Self::new(S::Idle, 0.0, -0.02),
        }
    }
}

/// Apply `behavior` through `sink`: state first, then vitals.
pub fn apply_behavior<S: VitalsSink + ?Sized>(behavior: &Behavior, sink: &mut S) -> BehaviorEffect {
    let effect = BehaviorEffect::of(behavior);
    sink.set_state(effect.state);
    if effect.health_delta != 0.0 {
        sink.adjust_health(effect.health_delta);
    }
    if effect.happiness_delta != 0.0 {
        sink.adjust_happiness(effect.happiness_delta);
    }
    effect
}
