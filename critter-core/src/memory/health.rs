//! Health-pattern memories: how the creature usually feels at an hour.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::preference::running_mean;
use crate::types::MemoryId;

/// Average vitals observed at a given hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthPatternMemory {
    /// Unique identifier for this memory.
    pub id: MemoryId,
    /// Last observation.
    pub timestamp: DateTime<Utc>,
    /// Current strength.
    pub strength: f64,
    /// Hour of day, 0–23.
    pub hour: u32,
    /// Mean health at this hour.
    pub health_level: f64,
    /// Mean happiness at this hour.
    pub happiness_level: f64,
    /// Observations folded into the means.
    pub occurrence_count: u32,
}

impl HealthPatternMemory {
    /// First observation at `hour`.
    #[must_use]
    pub fn new(hour: u32, health_level: f64, happiness_level: f64, at: DateTime<Utc>) -> Self {
        Self {
            id: MemoryId::new(),
            timestamp: at,
            strength: 1.0,
            hour,
            health_level,
            happiness_level,
            occurrence_count: 1,
        }
    }

    /// Fold in another observation.
    pub fn blend(&mut self, health_level: f64, happiness_level: f64, reinforcement: f64, at: DateTime<Utc>) {
        self.health_level = running_mean(self.health_level, self.occurrence_count, health_level);
        self.happiness_level =
            running_mean(self.happiness_level, self.occurrence_count, happiness_level);
        self.occurrence_count += 1;
        self.strength = (self.strength + reinforcement).min(1.0);
        self.timestamp = at;
    }

    /// Whether either remembered vital sits below `threshold`.
    #[must_use]
    pub fn is_low(&self, threshold: f64) -> bool {
        self.health_level < threshold || self.happiness_level < threshold
    }
}
