//! Linear memory decay with a purge floor.
//!
//! Every sweep subtracts a per-kind rate from each record's strength:
//!
//! ```text
//! interaction, location          rate × 1.0
//! time pattern, health pattern   rate × pattern_decay_factor     (0.5)
//! app/activity preference        rate × preference_decay_factor  (0.3)
//! ```
//!
//! Strength never drops below `min_strength`. A record that reaches the
//! floor is removed in the same sweep, so no retained record ever sits at
//! or below it.

use tracing::debug;

use crate::config::MemoryConfig;
use crate::memory::{MemoryKind, MemoryRecord};

/// Outcome of one decay sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecayReport {
    /// Records that lost strength and were kept.
    pub retained: usize,
    /// Records removed for reaching the floor.
    pub purged: usize,
}

/// Per-sweep strength loss for a memory kind.
#[must_use]
pub fn decay_amount(kind: MemoryKind, config: &MemoryConfig) -> f64 {
    let factor = match kind {
        MemoryKind::Interaction | MemoryKind::Location => 1.0,
        MemoryKind::TimePattern | MemoryKind::HealthPattern => config.pattern_decay_factor,
        MemoryKind::AppPreference | MemoryKind::ActivityPreference => {
            config.preference_decay_factor
        }
    };
    config.decay_rate * factor
}

/// Decay one strength value.
///
/// Returns `None` when the record should be purged.
#[must_use]
pub fn decay_strength(strength: f64, amount: f64, floor: f64) -> Option<f64> {
    let next = (strength - amount).max(floor);
    (next > floor).then_some(next)
}

/// Run a decay sweep over `records`, removing those that reach the floor.
pub fn decay_records(records: &mut Vec<MemoryRecord>, config: &MemoryConfig) -> DecayReport {
    let before = records.len();
    records.retain_mut(|record| {
        let amount = decay_amount(record.kind(), config);
        let strength = record.strength_mut();
        match decay_strength(*strength, amount, config.min_strength) {
            Some(next) => {
                *strength = next;
                true
            }
            None => false,
        }
    });

    let report = DecayReport {
        retained: records.len(),
        purged: before - records.len(),
    };
    debug!(retained = report.retained, purged = report.purged, "Decay sweep applied");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ActivityPreferenceMemory, InteractionMemory, TimePatternMemory};
    use chrono::Utc;

    #[test]
    fn preferences_decay_slowest() {
        let config = MemoryConfig::default();
        let raw = decay_amount(MemoryKind::Interaction, &config);
        let pattern = decay_amount(MemoryKind::HealthPattern, &config);
        let pref = decay_amount(MemoryKind::AppPreference, &config);
        assert!(raw > pattern && pattern > pref);
        assert!((pattern - 0.0005).abs() < 1e-12);
        assert!((pref - 0.0003).abs() < 1e-12);
    }

    #[test]
    fn strength_never_goes_below_floor() {
        assert_eq!(decay_strength(0.12, 0.05, 0.1), None);
        assert_eq!(decay_strength(0.1, 0.0, 0.1), None);
        let kept = decay_strength(0.5, 0.1, 0.1).expect("kept");
        assert!((kept - 0.4).abs() < 1e-12);
    }

    #[test]
    fn sweep_purges_weak_records() {
        let config = MemoryConfig {
            decay_rate: 0.2,
            ..MemoryConfig::default()
        };
        let now = Utc::now();
        let mut weak = InteractionMemory::new("click", None, now);
        weak.strength = 0.25;
        let mut records = vec![
            MemoryRecord::Interaction(weak),
            MemoryRecord::TimePattern(TimePatternMemory::new(9, 0, "playing", now)),
            MemoryRecord::ActivityPreference(ActivityPreferenceMemory::new("playing", 0.9, now)),
        ];

        let report = decay_records(&mut records, &config);
        assert_eq!(report, DecayReport { retained: 2, purged: 1 });
        assert!((records[0].strength() - 0.9).abs() < 1e-9);
        assert!((records[1].strength() - 0.94).abs() < 1e-9);
    }
}
