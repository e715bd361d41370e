//! The memory store: sole owner of every memory record.
//!
//! Callers submit [`Observation`]s and read copies back. Raw events
//! (interactions) are appended; every other kind is upserted by its natural
//! key so repeated observations reinforce one record instead of piling up:
//!
//! | kind                | natural key                          | reinforcement |
//! |---------------------|--------------------------------------|---------------|
//! | location            | screen + position within 50×50 box   | +0.1          |
//! | time pattern        | activity + hour + minute within 15   | +0.05         |
//! | app preference      | app name                             | +0.05         |
//! | activity preference | activity key                         | +0.05         |
//! | health pattern      | hour                                 | +0.05         |
//!
//! Every mutation rewrites the whole collection to the backend. A failed
//! write is logged and otherwise ignored: the in-memory records stay
//! authoritative for the session.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::config::{CritterConfig, MemoryConfig};
use crate::decay::{self, DecayReport};
use crate::error::{CritterError, Result};
use crate::memory::{
    ActivityPreferenceMemory, AppPreferenceMemory, HealthPatternMemory, InteractionMemory,
    LocationMemory, MemoryKind, MemoryRecord, TimePatternMemory,
};
use crate::observation::Observation;
use crate::persistence::{self, InMemoryBackend, MemoryBackend};
use crate::types::MemoryId;

/// Persisted collection of memory records.
pub struct MemoryStore {
    records: Vec<MemoryRecord>,
    backend: Box<dyn MemoryBackend>,
    config: MemoryConfig,
    storage_key: String,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("records", &self.records.len())
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Open a store over `backend`, loading whatever is stored under
    /// `storage_key`. Unreadable data yields an empty store.
    pub fn open(
        backend: impl MemoryBackend + 'static,
        config: MemoryConfig,
        storage_key: impl Into<String>,
    ) -> Self {
        let storage_key = storage_key.into();
        let records = match backend.load(&storage_key) {
            Ok(Some(bytes)) => persistence::decode_records(&bytes).unwrap_or_else(|e| {
                warn!(error = %e, key = %storage_key, "Stored memories unreadable, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, key = %storage_key, "Failed to load memories, starting empty");
                Vec::new()
            }
        };

        info!(records = records.len(), key = %storage_key, "Memory store opened");

        Self {
            records,
            backend: Box::new(backend),
            config,
            storage_key,
        }
    }

    /// Open a store using the memory and persistence sections of `config`.
    pub fn from_config(backend: impl MemoryBackend + 'static, config: &CritterConfig) -> Self {
        Self::open(
            backend,
            config.memory.clone(),
            config.persistence.storage_key.clone(),
        )
    }

    /// Empty store backed by process memory.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self::open(
            InMemoryBackend::new(),
            MemoryConfig::default(),
            crate::config::PersistenceConfig::default().storage_key,
        )
    }

    /// The store's configuration.
    #[must_use]
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Record an observation now. Returns the ID of the new or reinforced
    /// record.
    pub fn record(&mut self, observation: Observation) -> MemoryId {
        self.record_at(observation, Utc::now())
    }

    /// Record an observation with an explicit timestamp.
    pub fn record_at(&mut self, observation: Observation, at: DateTime<Utc>) -> MemoryId {
        let id = self.apply(observation, at);
        self.persist();
        id
    }

    fn apply(&mut self, observation: Observation, at: DateTime<Utc>) -> MemoryId {
        let cfg = &self.config;
        match observation {
            Observation::Interaction {
                interaction_type,
                location,
            } => self.append(MemoryRecord::Interaction(InteractionMemory::new(
                interaction_type,
                location,
                at,
            ))),

            Observation::Location {
                screen_index,
                position,
            } => {
                let radius = cfg.location_radius;
                let boost = cfg.location_reinforcement;
                let existing = self.records.iter_mut().find_map(|r| match r {
                    MemoryRecord::Location(m) if m.matches(screen_index, &position, radius) => {
                        Some(m)
                    }
                    _ => None,
                });
                match existing {
                    Some(m) => {
                        m.revisit(boost, at);
                        m.id
                    }
                    None => self.append(MemoryRecord::Location(LocationMemory::new(
                        screen_index,
                        position,
                        at,
                    ))),
                }
            }

            Observation::TimePattern {
                hour,
                minute,
                activity,
            } => {
                let window = cfg.time_window_minutes;
                let boost = cfg.pattern_reinforcement;
                let existing = self.records.iter_mut().find_map(|r| match r {
                    MemoryRecord::TimePattern(m)
                        if m.activity == activity && m.matches_time(hour, minute, window) =>
                    {
                        Some(m)
                    }
                    _ => None,
                });
                match existing {
                    Some(m) => {
                        m.recur(boost, at);
                        m.id
                    }
                    None => self.append(MemoryRecord::TimePattern(TimePatternMemory::new(
                        hour, minute, activity, at,
                    ))),
                }
            }

            Observation::AppPreference {
                app_name,
                preference,
            } => {
                let boost = cfg.pattern_reinforcement;
                let existing = self.records.iter_mut().find_map(|r| match r {
                    MemoryRecord::AppPreference(m) if m.app_name == app_name => Some(m),
                    _ => None,
                });
                match existing {
                    Some(m) => {
                        m.blend(preference, boost, at);
                        m.id
                    }
                    None => self.append(MemoryRecord::AppPreference(AppPreferenceMemory::new(
                        app_name, preference, at,
                    ))),
                }
            }

            Observation::ActivityPreference {
                activity_type,
                enjoyment,
            } => {
                let boost = cfg.pattern_reinforcement;
                let existing = self.records.iter_mut().find_map(|r| match r {
                    MemoryRecord::ActivityPreference(m) if m.activity_type == activity_type => {
                        Some(m)
                    }
                    _ => None,
                });
                match existing {
                    Some(m) => {
                        m.blend(enjoyment, boost, at);
                        m.id
                    }
                    None => self.append(MemoryRecord::ActivityPreference(
                        ActivityPreferenceMemory::new(activity_type, enjoyment, at),
                    )),
                }
            }

            Observation::HealthPattern {
                hour,
                health_level,
                happiness_level,
            } => {
                let boost = cfg.pattern_reinforcement;
                let existing = self.records.iter_mut().find_map(|r| match r {
                    MemoryRecord::HealthPattern(m) if m.hour == hour => Some(m),
                    _ => None,
                });
                match existing {
                    Some(m) => {
                        m.blend(health_level, happiness_level, boost, at);
                        m.id
                    }
                    None => self.append(MemoryRecord::HealthPattern(HealthPatternMemory::new(
                        hour,
                        health_level,
                        happiness_level,
                        at,
                    ))),
                }
            }
        }
    }

    fn append(&mut self, record: MemoryRecord) -> MemoryId {
        let id = record.id();
        debug!(kind = ?record.kind(), %id, "Memory recorded");
        self.records.push(record);
        id
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Every record of `kind` matching `predicate`, in insertion order.
    pub fn query<F>(&self, kind: MemoryKind, predicate: F) -> Vec<MemoryRecord>
    where
        F: Fn(&MemoryRecord) -> bool,
    {
        self.records
            .iter()
            .filter(|r| r.kind() == kind && predicate(r))
            .cloned()
            .collect()
    }

    /// Time pattern for `activity` at `hour` whose minute is within the
    /// configured window of `minute`.
    #[must_use]
    pub fn find_time_pattern(&self, hour: u32, minute: u32, activity: &str) -> Option<TimePatternMemory> {
        let window = self.config.time_window_minutes;
        self.records.iter().find_map(|r| match r {
            MemoryRecord::TimePattern(m)
                if m.activity == activity && m.matches_time(hour, minute, window) =>
            {
                Some(m.clone())
            }
            _ => None,
        })
    }

    /// First health pattern recorded for `hour`.
    #[must_use]
    pub fn find_health_pattern(&self, hour: u32) -> Option<HealthPatternMemory> {
        self.records.iter().find_map(|r| match r {
            MemoryRecord::HealthPattern(m) if m.hour == hour => Some(m.clone()),
            _ => None,
        })
    }

    /// All interaction memories.
    #[must_use]
    pub fn interactions(&self) -> Vec<InteractionMemory> {
        self.records
            .iter()
            .filter_map(|r| match r {
                MemoryRecord::Interaction(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// Up to `limit` locations, strongest first. Ties keep insertion order.
    #[must_use]
    pub fn favorite_locations(&self, limit: usize) -> Vec<LocationMemory> {
        let mut locations: Vec<LocationMemory> = self
            .records
            .iter()
            .filter_map(|r| match r {
                MemoryRecord::Location(m) => Some(m.clone()),
                _ => None,
            })
            .collect();
        locations.sort_by_key(|m| Reverse(OrderedFloat(m.strength)));
        locations.truncate(limit);
        locations
    }

    /// Every time pattern recorded for `activity`.
    #[must_use]
    pub fn time_patterns_for(&self, activity: &str) -> Vec<TimePatternMemory> {
        self.records
            .iter()
            .filter_map(|r| match r {
                MemoryRecord::TimePattern(m) if m.activity == activity => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// All app preferences.
    #[must_use]
    pub fn app_preferences(&self) -> Vec<AppPreferenceMemory> {
        self.records
            .iter()
            .filter_map(|r| match r {
                MemoryRecord::AppPreference(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// All activity preferences.
    #[must_use]
    pub fn activity_preferences(&self) -> Vec<ActivityPreferenceMemory> {
        self.records
            .iter()
            .filter_map(|r| match r {
                MemoryRecord::ActivityPreference(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// Activity preference for one activity key.
    #[must_use]
    pub fn activity_preference(&self, activity: &str) -> Option<ActivityPreferenceMemory> {
        self.records.iter().find_map(|r| match r {
            MemoryRecord::ActivityPreference(m) if m.activity_type == activity => Some(m.clone()),
            _ => None,
        })
    }

    /// Every health pattern recorded for `hour`.
    #[must_use]
    pub fn health_patterns_for(&self, hour: u32) -> Vec<HealthPatternMemory> {
        self.records
            .iter()
            .filter_map(|r| match r {
                MemoryRecord::HealthPattern(m) if m.hour == hour => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// Activity with the highest remembered enjoyment.
    #[must_use]
    pub fn most_enjoyed_activity(&self) -> Option<ActivityPreferenceMemory> {
        self.activity_preferences()
            .into_iter()
            .max_by_key(|m| OrderedFloat(m.enjoyment))
    }

    /// Activity with the lowest remembered enjoyment.
    #[must_use]
    pub fn least_enjoyed_activity(&self) -> Option<ActivityPreferenceMemory> {
        self.activity_preferences()
            .into_iter()
            .min_by_key(|m| OrderedFloat(m.enjoyment))
    }

    /// Copy of every record, in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<MemoryRecord> {
        self.records.clone()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Decay every record and purge those that reach the floor.
    pub fn decay_sweep(&mut self) -> DecayReport {
        let report = decay::decay_records(&mut self.records, &self.config);
        info!(retained = report.retained, purged = report.purged, "Memory decay sweep");
        self.persist();
        report
    }

    /// Forget everything.
    pub fn clear_all(&mut self) {
        self.records.clear();
        self.persist();
    }

    /// Forget one record. Returns `false` if no record had that ID.
    pub fn remove(&mut self, id: MemoryId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        let removed = self.records.len() < before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Forget one record, reporting a missing ID as an error.
    ///
    /// # Errors
    ///
    /// Returns [`CritterError::MemoryNotFound`] if no record had that ID.
    pub fn try_remove(&mut self, id: MemoryId) -> Result<()> {
        if self.remove(id) {
            Ok(())
        } else {
            Err(CritterError::MemoryNotFound(id))
        }
    }

    /// Write the collection to the backend, surfacing any failure.
    ///
    /// # Errors
    ///
    /// Encoding or backend errors.
    pub fn flush(&self) -> Result<()> {
        let bytes = persistence::encode_records(&self.records)?;
        self.backend.save(&self.storage_key, &bytes)
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, records = self.records.len(), "Failed to persist memories");
        }
    }
}

/// Shared handle to a [`MemoryStore`].
///
/// All mutations go through one mutex, so record-then-persist is atomic with
/// respect to other writers (the activity tick, event hooks, the decay timer).
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    inner: Arc<Mutex<MemoryStore>>,
}

impl MemoryHandle {
    /// Wrap a store for sharing.
    #[must_use]
    pub fn new(store: MemoryStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store. Keep the guard short-lived.
    pub fn lock(&self) -> MutexGuard<'_, MemoryStore> {
        self.inner.lock()
    }

    /// Record an observation now.
    pub fn record(&self, observation: Observation) -> MemoryId {
        self.inner.lock().record(observation)
    }

    /// Run a decay sweep.
    pub fn decay_sweep(&self) -> DecayReport {
        self.inner.lock().decay_sweep()
    }
}

impl From<MemoryStore> for MemoryHandle {
    fn from(store: MemoryStore) -> Self {
        Self::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    struct FailingBackend;

    impl MemoryBackend for FailingBackend {
        fn load(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(CritterError::Io(std::io::Error::other("disk on fire")))
        }
        fn save(&self, _key: &str, _data: &[u8]) -> Result<()> {
            Err(CritterError::Io(std::io::Error::other("disk on fire")))
        }
        fn clear(&self, _key: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn interactions_always_append() {
        let mut store = MemoryStore::ephemeral();
        store.record(Observation::interaction("click", Some(Point::new(100.0, 200.0))));
        store.record(Observation::interaction("click", Some(Point::new(100.0, 200.0))));
        let interactions = store.interactions();
        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[0].interaction_type, "click");
    }

    #[test]
    fn nearby_locations_merge() {
        let mut store = MemoryStore::ephemeral();
        let first = store.record(Observation::location(0, Point::new(100.0, 200.0)));
        let again = store.record(Observation::location(0, Point::new(140.0, 160.0)));
        let other_screen = store.record(Observation::location(1, Point::new(100.0, 200.0)));
        let far = store.record(Observation::location(0, Point::new(150.0, 200.0)));

        assert_eq!(first, again);
        assert_ne!(first, other_screen);
        assert_ne!(first, far);

        let favorites = store.favorite_locations(5);
        assert_eq!(favorites.len(), 3);
        assert_eq!(favorites[0].id, first);
        assert_eq!(favorites[0].visit_count, 2);
    }

    #[test]
    fn favorites_sorted_by_strength_and_limited() {
        let mut store = MemoryStore::ephemeral();
        for i in 0..4 {
            store.record(Observation::location(0, Point::new(f64::from(i) * 200.0, 0.0)));
        }
        store.decay_sweep();
        let strong = store.record(Observation::location(0, Point::new(600.0, 0.0)));

        let top = store.favorite_locations(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, strong);
        assert!(top[0].strength >= top[1].strength);
    }

    #[test]
    fn activity_preference_upserts_with_running_mean() {
        let mut store = MemoryStore::ephemeral();
        store.record(Observation::ActivityPreference {
            activity_type: "playing".into(),
            enjoyment: 0.8,
        });
        store.record(Observation::ActivityPreference {
            activity_type: "playing".into(),
            enjoyment: 0.4,
        });

        let prefs = store.activity_preferences();
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].occurrence_count, 2);
        assert!((prefs[0].enjoyment - 0.6).abs() < 1e-9);
    }

    #[test]
    fn app_preference_blends() {
        let mut store = MemoryStore::ephemeral();
        store.record(Observation::app_preference("Editor", 0.8));
        store.record(Observation::app_preference("Editor", 0.2));
        store.record(Observation::app_preference("Browser", 0.0));
        let prefs = store.app_preferences();
        assert_eq!(prefs.len(), 2);
        assert!((prefs[0].preference - 0.5).abs() < 1e-9);
        assert_eq!(prefs[0].interaction_count, 2);
    }

    #[test]
    fn time_pattern_window() {
        let mut store = MemoryStore::ephemeral();
        store.record(Observation::TimePattern {
            hour: 9,
            minute: 5,
            activity: "playing".into(),
        });

        assert!(store.find_time_pattern(9, 15, "playing").is_some());
        assert!(store.find_time_pattern(9, 25, "playing").is_none());
        assert!(store.find_time_pattern(10, 5, "playing").is_none());
        assert!(store.find_time_pattern(9, 5, "resting").is_none());
    }

    #[test]
    fn time_pattern_recurrence_reinforces() {
        let mut store = MemoryStore::ephemeral();
        let first = store.record(Observation::TimePattern {
            hour: 9,
            minute: 0,
            activity: "playing".into(),
        });
        store.decay_sweep();
        let again = store.record(Observation::TimePattern {
            hour: 9,
            minute: 10,
            activity: "playing".into(),
        });
        assert_eq!(first, again);

        let patterns = store.time_patterns_for("playing");
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].occurrence_count, 2);
        assert!((patterns[0].strength - 1.0).abs() < 1e-9);
    }

    #[test]
    fn health_pattern_per_hour() {
        let mut store = MemoryStore::ephemeral();
        store.record(Observation::health_pattern(14, 0.4, 0.8));
        store.record(Observation::health_pattern(14, 0.6, 0.6));
        store.record(Observation::health_pattern(15, 1.0, 1.0));

        let pattern = store.find_health_pattern(14).expect("pattern");
        assert!((pattern.health_level - 0.5).abs() < 1e-9);
        assert!((pattern.happiness_level - 0.7).abs() < 1e-9);
        assert_eq!(store.health_patterns_for(15).len(), 1);
        assert!(store.find_health_pattern(3).is_none());
    }

    #[test]
    fn most_and_least_enjoyed() {
        let mut store = MemoryStore::ephemeral();
        store.record(Observation::ActivityPreference {
            activity_type: "playing".into(),
            enjoyment: 0.9,
        });
        store.record(Observation::ActivityPreference {
            activity_type: "resting".into(),
            enjoyment: 0.5,
        });
        store.record(Observation::ActivityPreference {
            activity_type: "observing".into(),
            enjoyment: 0.6,
        });
        assert_eq!(store.most_enjoyed_activity().expect("most").activity_type, "playing");
        assert_eq!(store.least_enjoyed_activity().expect("least").activity_type, "resting");
    }

    #[test]
    fn query_filters_by_kind_and_predicate() {
        let mut store = MemoryStore::ephemeral();
        store.record(Observation::interaction("click", None));
        store.record(Observation::interaction("drag", None));
        store.record(Observation::app_preference("Editor", 0.3));

        let drags = store.query(MemoryKind::Interaction, |r| {
            matches!(r, MemoryRecord::Interaction(m) if m.interaction_type == "drag")
        });
        assert_eq!(drags.len(), 1);
        assert_eq!(store.query(MemoryKind::AppPreference, |_| true).len(), 1);
    }

    #[test]
    fn remove_and_clear() {
        let mut store = MemoryStore::ephemeral();
        let id = store.record(Observation::interaction("click", None));
        store.record(Observation::interaction("feed", None));
        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(matches!(store.try_remove(id), Err(CritterError::MemoryNotFound(_))));
        assert_eq!(store.len(), 1);
        store.clear_all();
        assert!(store.is_empty());
    }

    #[test]
    fn records_survive_reopen() {
        let backend = InMemoryBackend::new();
        {
            let mut store = MemoryStore::open(backend.clone(), MemoryConfig::default(), "k");
            store.record(Observation::app_preference("Editor", 0.3));
            store.record(Observation::location(0, Point::new(1.0, 2.0)));
        }
        let store = MemoryStore::open(backend, MemoryConfig::default(), "k");
        assert_eq!(store.len(), 2);
        assert_eq!(store.app_preferences()[0].app_name, "Editor");
    }

    #[test]
    fn corrupt_blob_starts_empty() {
        let backend = InMemoryBackend::new();
        backend.insert_raw("k", b"{ definitely not a list".to_vec());
        let store = MemoryStore::open(backend, MemoryConfig::default(), "k");
        assert!(store.is_empty());
    }

    #[test]
    fn failing_backend_keeps_session_records() {
        let mut store = MemoryStore::open(FailingBackend, MemoryConfig::default(), "k");
        assert!(store.is_empty());
        store.record(Observation::interaction("click", None));
        assert_eq!(store.len(), 1);
        assert!(store.flush().is_err());
        store.decay_sweep();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn handle_shares_one_store() {
        let handle = MemoryHandle::new(MemoryStore::ephemeral());
        let other = handle.clone();
        handle.record(Observation::interaction("click", None));
        assert_eq!(other.lock().len(), 1);
        other.decay_sweep();
        assert_eq!(handle.lock().interactions().len(), 1);
    }
}
