//! Observations: what callers submit to the memory store.
//!
//! Callers never build or mutate [`MemoryRecord`](crate::MemoryRecord)s
//! directly. They describe what happened, and the store decides whether that
//! appends a new record or reinforces an existing one.

use serde::{Deserialize, Serialize};

use crate::behavior::BaseType;
use crate::memory::MemoryKind;
use crate::types::{ClockTime, Point};

/// Something the creature noticed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Observation {
    /// The user interacted with the creature.
    Interaction {
        /// Kind of touch.
        interaction_type: String,
        /// Where, when known.
        location: Option<Point>,
    },
    /// The creature settled somewhere.
    Location {
        /// Display index.
        screen_index: u32,
        /// Position on that display.
        position: Point,
    },
    /// An activity happened at a time of day.
    TimePattern {
        /// Hour, 0–23.
        hour: u32,
        /// Minute, 0–59.
        minute: u32,
        /// Activity key.
        activity: String,
    },
    /// A foreground app was seen, with how the creature felt about it.
    AppPreference {
        /// Application name.
        app_name: String,
        /// -1.0 to 1.0.
        preference: f64,
    },
    /// An activity happened, with how much it was enjoyed.
    ActivityPreference {
        /// Activity key.
        activity_type: String,
        /// 0.0 to 1.0.
        enjoyment: f64,
    },
    /// Vitals sampled at an hour.
    HealthPattern {
        /// Hour, 0–23.
        hour: u32,
        /// Health, 0.0 to 1.0.
        health_level: f64,
        /// Happiness, 0.0 to 1.0.
        happiness_level: f64,
    },
}

impl Observation {
    /// An interaction with an optional location.
    #[must_use]
    pub fn interaction(interaction_type: impl Into<String>, location: Option<Point>) -> Self {
        Self::Interaction {
            interaction_type: interaction_type.into(),
            location,
        }
    }

    /// A location visit.
    #[must_use]
    pub fn location(screen_index: u32, position: Point) -> Self {
        Self::Location {
            screen_index,
            position,
        }
    }

    /// An activity bucket seen at a clock time.
    #[must_use]
    pub fn time_pattern(at: ClockTime, activity: BaseType) -> Self {
        Self::TimePattern {
            hour: at.hour,
            minute: at.minute,
            activity: activity.as_str().to_string(),
        }
    }

    /// An app preference sample.
    #[must_use]
    pub fn app_preference(app_name: impl Into<String>, preference: f64) -> Self {
        Self::AppPreference {
            app_name: app_name.into(),
            preference,
        }
    }

    /// An enjoyment sample for an activity bucket.
    #[must_use]
    pub fn activity_preference(activity: BaseType, enjoyment: f64) -> Self {
        Self::ActivityPreference {
            activity_type: activity.as_str().to_string(),
            enjoyment,
        }
    }

    /// A vitals sample at an hour.
    #[must_use]
    pub fn health_pattern(hour: u32, health_level: f64, happiness_level: f64) -> Self {
        Self::HealthPattern {
            hour,
            health_level,
            happiness_level,
        }
    }

    /// The kind of record this observation produces or reinforces.
    #[must_use]
    pub fn kind(&self) -> MemoryKind {
        match self {
            Self::Interaction { .. } => MemoryKind::Interaction,
            Self::Location { .. } => MemoryKind::Location,
            Self::TimePattern { .. } => MemoryKind::TimePattern,
            Self::AppPreference { .. } => MemoryKind::AppPreference,
            Self::ActivityPreference { .. } => MemoryKind::ActivityPreference,
            Self::HealthPattern { .. } => MemoryKind::HealthPattern,
        }
    }
}
