//! Preference memories: liked apps and enjoyed activities.
//!
//! Both kinds keep a running mean weighted by how many observations
//! contributed to it, so a single outlier never swings the score far.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::MemoryId;

/// Running mean of `current` over `count` observations, with `sample` added.
#[must_use]
pub fn running_mean(current: f64, count: u32, sample: f64) -> f64 {
    let weight = f64::from(count);
    (current * weight + sample) / (weight + 1.0)
}

/// How the creature feels about a foreground application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppPreferenceMemory {
    /// Unique identifier for this memory.
    pub id: MemoryId,
    /// Last observation.
    pub timestamp: DateTime<Utc>,
    /// Current strength.
    pub strength: f64,
    /// Application name.
    pub app_name: String,
    /// -1.0 (dislike) to 1.0 (like).
    pub preference: f64,
    /// Observations folded into `preference`.
    pub interaction_count: u32,
}

impl AppPreferenceMemory {
    /// First observation of an app.
    #[must_use]
    pub fn new(app_name: impl Into<String>, preference: f64, at: DateTime<Utc>) -> Self {
        Self {
            id: MemoryId::new(),
            timestamp: at,
            strength: 1.0,
            app_name: app_name.into(),
            preference: preference.clamp(-1.0, 1.0),
            interaction_count: 1,
        }
    }

    /// Fold in another observation.
    pub fn blend(&mut self, preference: f64, reinforcement: f64, at: DateTime<Utc>) {
        self.preference =
            running_mean(self.preference, self.interaction_count, preference.clamp(-1.0, 1.0));
        self.interaction_count += 1;
        self.strength = (self.strength + reinforcement).min(1.0);
        self.timestamp = at;
    }
}

/// How much the creature enjoys an activity bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPreferenceMemory {
    /// Unique identifier for this memory.
    pub id: MemoryId,
    /// Last observation.
    pub timestamp: DateTime<Utc>,
    /// Current strength.
    pub strength: f64,
    /// Activity key.
    pub activity_type: String,
    /// 0.0 (disliked) to 1.0 (loved).
    pub enjoyment: f64,
    /// Observations folded into `enjoyment`.
    pub occurrence_count: u32,
}

impl ActivityPreferenceMemory {
    /// First observation of an activity.
    #[must_use]
    pub fn new(activity_type: impl Into<String>, enjoyment: f64, at: DateTime<Utc>) -> Self {
        Self {
            id: MemoryId::new(),
            timestamp: at,
            strength: 1.0,
            activity_type: activity_type.into(),
            enjoyment: enjoyment.clamp(0.0, 1.0),
            occurrence_count: 1,
        }
    }

    /// Fold in another observation.
    pub fn blend(&mut self, enjoyment: f64, reinforcement: f64, at: DateTime<Utc>) {
        self.enjoyment =
            running_mean(self.enjoyment, self.occurrence_count, enjoyment.clamp(0.0, 1.0));
        self.occurrence_count += 1;
        self.strength = (self.strength + reinforcement).min(1.0);
        self.timestamp = at;
    }

    /// Signed selection modifier: enjoyment mapped to [-1, 1], scaled by
    /// strength and `factor`.
    #[must_use]
    pub fn modifier(&self, factor: f64) -> f64 {
        (self.enjoyment - 0.5) * 2.0 * self.strength * factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_mean_weights_by_count() {
        assert!((running_mean(0.8, 1, 0.4) - 0.6).abs() < 1e-9);
        assert!((running_mean(0.6, 2, 0.0) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn enjoyment_modifier_is_signed() {
        let now = Utc::now();
        let loved = ActivityPreferenceMemory::new("playing", 1.0, now);
        let hated = ActivityPreferenceMemory::new("resting", 0.0, now);
        assert!((loved.modifier(0.3) - 0.3).abs() < 1e-9);
        assert!((hated.modifier(0.3) + 0.3).abs() < 1e-9);
    }
}
