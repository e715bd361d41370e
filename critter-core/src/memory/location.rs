//! Location memories: favourite spots on screen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MemoryId, Point};

/// A remembered place, reinforced on every revisit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMemory {
    /// Unique identifier for this memory.
    pub id: MemoryId,
    /// Last visit.
    pub timestamp: DateTime<Utc>,
    /// Current strength.
    pub strength: f64,
    /// Which display the spot is on.
    pub screen_index: u32,
    /// Where the creature was.
    pub position: Point,
    /// Number of visits, including the first.
    pub visit_count: u32,
}

impl LocationMemory {
    /// First visit to a spot.
    #[must_use]
    pub fn new(screen_index: u32, position: Point, at: DateTime<Utc>) -> Self {
        Self {
            id: MemoryId::new(),
            timestamp: at,
            strength: 1.0,
            screen_index,
            position,
            visit_count: 1,
        }
    }

    /// Whether `position` on `screen_index` counts as a revisit of this spot.
    #[must_use]
    pub fn matches(&self, screen_index: u32, position: &Point, radius: f64) -> bool {
        self.screen_index == screen_index && self.position.within_box(position, radius)
    }

    /// Count a revisit.
    pub fn revisit(&mut self, reinforcement: f64, at: DateTime<Utc>) {
        self.visit_count += 1;
        self.strength = (self.strength + reinforcement).min(1.0);
        self.timestamp = at;
    }
}
