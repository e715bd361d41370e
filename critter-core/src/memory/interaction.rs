//! Interaction memories: "the user touched me here".
//!
//! Raw events. Every click, drag, feed or cursor chase is appended; there is
//! no natural key, so repeated interactions accumulate until decay purges
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MemoryId, Point};

/// A single remembered interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionMemory {
    /// Unique identifier for this memory.
    pub id: MemoryId,
    /// When the interaction happened.
    pub timestamp: DateTime<Utc>,
    /// Current strength (1.0 = vivid, purged at the floor).
    pub strength: f64,
    /// Kind of touch: "click", "drag", "feed", "follow", "chase", ...
    pub interaction_type: String,
    /// Where it happened, when known.
    #[serde(default)]
    pub location: Option<Point>,
}

impl InteractionMemory {
    /// Create a new interaction memory at full strength.
    #[must_use]
    pub fn new(interaction_type: impl Into<String>, location: Option<Point>, at: DateTime<Utc>) -> Self {
        Self {
            id: MemoryId::new(),
            timestamp: at,
            strength: 1.0,
            interaction_type: interaction_type.into(),
            location,
        }
    }
}
