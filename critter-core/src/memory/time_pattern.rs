//! Time-pattern memories: "around nine I usually play".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::MemoryId;

/// An activity that recurs at roughly the same time of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePatternMemory {
    /// Unique identifier for this memory.
    pub id: MemoryId,
    /// Last occurrence.
    pub timestamp: DateTime<Utc>,
    /// Current strength.
    pub strength: f64,
    /// Hour of the first occurrence, 0–23.
    pub hour: u32,
    /// Minute of the first occurrence, 0–59.
    pub minute: u32,
    /// Activity key (a base type string).
    pub activity: String,
    /// Times this activity was seen in the window.
    pub occurrence_count: u32,
}

impl TimePatternMemory {
    /// First occurrence of `activity` at `hour:minute`.
    #[must_use]
    pub fn new(hour: u32, minute: u32, activity: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: MemoryId::new(),
            timestamp: at,
            strength: 1.0,
            hour,
            minute,
            activity: activity.into(),
            occurrence_count: 1,
        }
    }

    /// Same hour, and minute strictly inside `window` of the stored one.
    ///
    /// The window never crosses an hour boundary.
    #[must_use]
    pub fn matches_time(&self, hour: u32, minute: u32, window: u32) -> bool {
        self.hour == hour && self.minute.abs_diff(minute) < window
    }

    /// Count a recurrence.
    pub fn recur(&mut self, reinforcement: f64, at: DateTime<Utc>) {
        self.occurrence_count += 1;
        self.strength = (self.strength + reinforcement).min(1.0);
        self.timestamp = at;
    }

    /// Selection boost contributed by this pattern.
    #[must_use]
    pub fn boost(&self, occurrence_factor: f64) -> f64 {
        self.strength * (1.0 + f64::from(self.occurrence_count) * occurrence_factor)
    }
}
