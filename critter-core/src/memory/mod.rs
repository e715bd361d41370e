//! Memory record kinds and the [`MemoryRecord`] sum type.
//!
//! Six kinds of memory, each carrying a strength in `[min_strength, 1.0]`
//! and a timestamp:
//!
//! - **Interaction**: raw touches, appended
//! - **Location**: favourite spots, upserted by screen + 50-unit box
//! - **Time pattern**: activity at an hour, upserted by activity + 15-minute window
//! - **App preference**: liked apps, upserted by app name
//! - **Activity preference**: enjoyed activities, upserted by activity key
//! - **Health pattern**: vitals at an hour, upserted by hour
//!
//! Records serialize as flat JSON objects with a `kind` discriminator, so a
//! stored collection stays readable when new kinds are added.

pub mod health;
pub mod interaction;
pub mod location;
pub mod preference;
pub mod time_pattern;

pub use health::HealthPatternMemory;
pub use interaction::InteractionMemory;
pub use location::LocationMemory;
pub use preference::{ActivityPreferenceMemory, AppPreferenceMemory};
pub use time_pattern::TimePatternMemory;

use serde::{Deserialize, Serialize};

use crate::types::MemoryId;

/// Discriminator for the six memory kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// [`InteractionMemory`].
    Interaction,
    /// [`LocationMemory`].
    Location,
    /// [`TimePatternMemory`].
    TimePattern,
    /// [`AppPreferenceMemory`].
    AppPreference,
    /// [`ActivityPreferenceMemory`].
    ActivityPreference,
    /// [`HealthPatternMemory`].
    HealthPattern,
}

/// A stored memory of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemoryRecord {
    /// A user interaction.
    Interaction(InteractionMemory),
    /// A favourite location.
    Location(LocationMemory),
    /// A recurring activity time.
    TimePattern(TimePatternMemory),
    /// An app preference.
    AppPreference(AppPreferenceMemory),
    /// An activity preference.
    ActivityPreference(ActivityPreferenceMemory),
    /// A health pattern.
    HealthPattern(HealthPatternMemory),
}

impl MemoryRecord {
    /// Which kind this record is.
    #[must_use]
    pub fn kind(&self) -> MemoryKind {
        match self {
            Self::Interaction(_) => MemoryKind::Interaction,
            Self::Location(_) => MemoryKind::Location,
            Self::TimePattern(_) => MemoryKind::TimePattern,
            Self::AppPreference(_) => MemoryKind::AppPreference,
            Self::ActivityPreference(_) => MemoryKind::ActivityPreference,
            Self::HealthPattern(_) => MemoryKind::HealthPattern,
        }
    }

    /// Record identifier.
    #[must_use]
    pub fn id(&self) -> MemoryId {
        match self {
            Self::Interaction(m) => m.id,
            Self::Location(m) => m.id,
            Self::TimePattern(m) => m.id,
            Self::AppPreference(m) => m.id,
            Self::ActivityPreference(m) => m.id,
            Self::HealthPattern(m) => m.id,
        }
    }

    /// Current strength.
    #[must_use]
    pub fn strength(&self) -> f64 {
        match self {
            Self::Interaction(m) => m.strength,
            Self::Location(m) => m.strength,
            Self::TimePattern(m) => m.strength,
            Self::AppPreference(m) => m.strength,
            Self::ActivityPreference(m) => m.strength,
            Self::HealthPattern(m) => m.strength,
        }
    }

    pub(crate) fn strength_mut(&mut self) -> &mut f64 {
        match self {
            Self::Interaction(m) => &mut m.strength,
            Self::Location(m) => &mut m.strength,
            Self::TimePattern(m) => &mut m.strength,
            Self::AppPreference(m) => &mut m.strength,
            Self::ActivityPreference(m) => &mut m.strength,
            Self::HealthPattern(m) => &mut m.strength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use chrono::Utc;

    #[test]
    fn records_serialize_flat_with_kind_tag() {
        let record = MemoryRecord::Location(LocationMemory::new(1, Point::new(10.0, 20.0), Utc::now()));
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["kind"], "location");
        assert_eq!(value["screen_index"], 1);
        assert_eq!(value["visit_count"], 1);

        let back: MemoryRecord = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, record);
    }

    #[test]
    fn unknown_kind_fails_alone() {
        let value = serde_json::json!({ "kind": "dream", "id": MemoryId::new(), "strength": 1.0 });
        assert!(serde_json::from_value::<MemoryRecord>(value).is_err());
    }
}
