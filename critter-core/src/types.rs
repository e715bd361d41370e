//! Core type definitions shared across the critter engine.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for a memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub Uuid);

impl MemoryId {
    /// Create a new random memory ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// A 2D point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether `other` lies inside the axis-aligned box of half-width `radius`
    /// centred on `self` (strict on both axes).
    #[must_use]
    pub fn within_box(&self, other: &Self, radius: f64) -> bool {
        (self.x - other.x).abs() < radius && (self.y - other.y).abs() < radius
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Wall-clock hour and minute, as read from the host clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockTime {
    /// Hour of day, 0–23.
    pub hour: u32,
    /// Minute of hour, 0–59.
    pub minute: u32,
}

impl ClockTime {
    /// Create a clock reading, wrapping out-of-range values.
    #[must_use]
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
        }
    }

    /// Read hour and minute from any chrono time value.
    #[must_use]
    pub fn from_datetime(at: &impl Timelike) -> Self {
        Self::new(at.hour(), at.minute())
    }

    /// Night: 22:00 up to (not including) 06:00.
    #[must_use]
    pub fn is_night(&self) -> bool {
        self.hour >= 22 || self.hour < 6
    }

    /// Hour expressed as a fraction of the day, in [0, 1).
    #[must_use]
    pub fn day_fraction(&self) -> f64 {
        f64::from(self.hour) / 24.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Coarse segment of the day used by the selector's time-of-day modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    /// 22:00–06:00.
    Night,
    /// 06:00–09:00.
    EarlyMorning,
    /// 12:00–14:00.
    Midday,
    /// 18:00–22:00.
    Evening,
    /// Any other hour; no modifier applies.
    Daytime,
}

impl DayPeriod {
    /// Classify an hour of day.
    #[must_use]
    pub fn of(hour: u32) -> Self {
        match hour {
            h if h >= 22 || h < 6 => Self::Night,
            6..=8 => Self::EarlyMorning,
            12..=13 => Self::Midday,
            18..=21 => Self::Evening,
            _ => Self::Daytime,
        }
    }
}
