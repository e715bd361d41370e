//! Configuration for the critter engine.
//!
//! Maps directly to `critter.toml`. Every field has a default, so an empty
//! file (or no file at all) yields the stock tuning.

use serde::{Deserialize, Serialize};

/// Top-level critter configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CritterConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Memory store limits, decay and reinforcement.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Behavior selection tuning.
    #[serde(default)]
    pub selector: SelectorConfig,
    /// Activity clock cadence.
    #[serde(default)]
    pub clock: ClockConfig,
    /// Persistence settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl CritterConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `CritterError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::CritterError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Memory decay, reinforcement and matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Strength subtracted from raw events on every decay sweep.
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,
    /// Records at or below this strength are purged by the sweep.
    #[serde(default = "default_min_strength")]
    pub min_strength: f64,
    /// Hours between decay sweeps.
    #[serde(default = "default_24")]
    pub decay_interval_hours: u64,
    /// Half-width of the box inside which a location counts as a revisit.
    #[serde(default = "default_location_radius")]
    pub location_radius: f64,
    /// Minute window (exclusive) for matching a time pattern within one hour.
    #[serde(default = "default_15")]
    pub time_window_minutes: u32,
    /// Strength added when a location is revisited.
    #[serde(default = "default_0_1")]
    pub location_reinforcement: f64,
    /// Strength added when a time pattern, preference or health pattern recurs.
    #[serde(default = "default_0_05")]
    pub pattern_reinforcement: f64,
    /// Decay multiplier for time and health patterns.
    #[serde(default = "default_0_5")]
    pub pattern_decay_factor: f64,
    /// Decay multiplier for app and activity preferences.
    #[serde(default = "default_0_3")]
    pub preference_decay_factor: f64,
    /// Default number of favourite locations returned.
    #[serde(default = "default_5_usize")]
    pub favorite_locations_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            decay_rate: 0.001,
            min_strength: 0.1,
            decay_interval_hours: 24,
            location_radius: 50.0,
            time_window_minutes: 15,
            location_reinforcement: 0.1,
            pattern_reinforcement: 0.05,
            pattern_decay_factor: 0.5,
            preference_decay_factor: 0.3,
            favorite_locations_limit: 5,
        }
    }
}

/// Behavior selection tuning constants.
///
/// The defaults are product tuning, not derived values; change them here
/// rather than in the selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Curiosity above which generic exploring gains a direction.
    pub direction_curiosity_threshold: f64,
    /// Weight multiplier for directional exploring.
    pub direction_boost: f64,
    /// Playfulness above which generic playing gains a toy.
    pub toy_playfulness_threshold: f64,
    /// Weight multiplier for playing with a toy.
    pub toy_boost: f64,
    /// Sleep probability above which resting becomes napping.
    pub nap_sleep_threshold: f64,
    /// Sleep probability above which a nap is deep.
    pub deep_nap_threshold: f64,
    /// Weight multiplier for napping.
    pub nap_boost: f64,
    /// Curiosity above which observing becomes curious.
    pub curious_threshold: f64,
    /// Weight multiplier for curious.
    pub curious_boost: f64,
    /// Sociability above which the social reaction is excited.
    pub social_excited_threshold: f64,
    /// Sociability above which the social reaction is friendly.
    pub social_friendly_threshold: f64,
    /// Sociability below which the social reaction is shy.
    pub social_shy_threshold: f64,
    /// Happiness below which a bored candidate is added.
    pub bored_happiness_threshold: f64,
    /// Weight of the bored candidate.
    pub bored_weight: f64,
    /// Happiness above which an excited candidate is added.
    pub excited_happiness_threshold: f64,
    /// Weight of the excited candidate.
    pub excited_weight: f64,
    /// Health below which a confused candidate is added.
    pub confused_health_threshold: f64,
    /// Weight of the confused candidate.
    pub confused_weight: f64,
    /// Per-occurrence bonus applied to time-pattern boosts.
    pub pattern_occurrence_factor: f64,
    /// Scale of the enjoyment boost from activity preferences.
    pub enjoyment_factor: f64,
    /// Remembered health or happiness below this level favours resting.
    pub health_pattern_threshold: f64,
    /// Scale of the health-pattern resting boost.
    pub health_pattern_factor: f64,
    /// Multiplier applied to non-resting candidates at night.
    pub night_damping: f64,
    /// Additive resting bonus at midday.
    pub midday_rest_bonus: f64,
    /// Multiplier applied to non-resting candidates at midday.
    pub midday_damping: f64,
    /// Health below which resting dominates.
    pub low_health_threshold: f64,
    /// Additive resting bonus when health is low.
    pub low_health_rest_bonus: f64,
    /// Multiplier applied to non-resting candidates when health is low.
    pub low_health_damping: f64,
    /// Happiness below which playing is encouraged.
    pub low_happiness_threshold: f64,
    /// Playing bonus per unit of playfulness when happiness is low.
    pub low_happiness_play_factor: f64,
    /// Age fraction above which active behaviors are damped.
    pub late_age_threshold: f64,
    /// Age fraction below which active behaviors are boosted.
    pub early_age_threshold: f64,
    /// Scale of the early-age activity boost.
    pub early_age_factor: f64,
    /// Activity frequency multiplier above which chains may start.
    pub chain_energy_threshold: f64,
    /// Chain probability for energetic personalities.
    pub chain_energy_probability: f64,
    /// Curiosity above which exploring may start a chain.
    pub chain_explore_curiosity: f64,
    /// Chain probability for curious explorers.
    pub chain_explore_probability: f64,
    /// Playfulness above which playing may start a chain.
    pub chain_play_playfulness: f64,
    /// Chain probability for playful players.
    pub chain_play_probability: f64,
    /// Shortest chain, including the first behavior.
    pub chain_min_length: usize,
    /// Longest chain, including the first behavior.
    pub chain_max_length: usize,
    /// Curiosity above which exploring is followed by curious.
    pub chain_curious_after_exploring: f64,
    /// Sociability above which playing is followed by social.
    pub chain_social_after_playing: f64,
    /// Probability that playing is followed by excited rather than a toy.
    pub chain_excited_probability: f64,
    /// Sleep probability above which resting is followed by napping.
    pub chain_nap_threshold: f64,
    /// Curiosity above which observing is followed by curious.
    pub chain_curious_after_observing: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            direction_curiosity_threshold: 0.6,
            direction_boost: 1.2,
            toy_playfulness_threshold: 0.7,
            toy_boost: 1.15,
            nap_sleep_threshold: 0.6,
            deep_nap_threshold: 0.8,
            nap_boost: 1.3,
            curious_threshold: 0.7,
            curious_boost: 1.2,
            social_excited_threshold: 0.8,
            social_friendly_threshold: 0.6,
            social_shy_threshold: 0.3,
            bored_happiness_threshold: 0.3,
            bored_weight: 0.3,
            excited_happiness_threshold: 0.8,
            excited_weight: 0.4,
            confused_health_threshold: 0.3,
            confused_weight: 0.2,
            pattern_occurrence_factor: 0.1,
            enjoyment_factor: 0.3,
            health_pattern_threshold: 0.5,
            health_pattern_factor: 0.4,
            night_damping: 0.5,
            midday_rest_bonus: 0.3,
            midday_damping: 0.7,
            low_health_threshold: 0.5,
            low_health_rest_bonus: 0.5,
            low_health_damping: 0.5,
            low_happiness_threshold: 0.5,
            low_happiness_play_factor: 0.4,
            late_age_threshold: 0.7,
            early_age_threshold: 0.3,
            early_age_factor: 0.5,
            chain_energy_threshold: 1.2,
            chain_energy_probability: 0.4,
            chain_explore_curiosity: 0.7,
            chain_explore_probability: 0.5,
            chain_play_playfulness: 0.7,
            chain_play_probability: 0.4,
            chain_min_length: 2,
            chain_max_length: 4,
            chain_curious_after_exploring: 0.6,
            chain_social_after_playing: 0.6,
            chain_excited_probability: 0.5,
            chain_nap_threshold: 0.6,
            chain_curious_after_observing: 0.7,
        }
    }
}

/// Activity clock cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// User-facing activity frequency in minutes (lower = more frequent checks).
    #[serde(default = "default_2")]
    pub activity_frequency_minutes: u32,
    /// Base interval between activity checks, before scaling.
    #[serde(default = "default_15_u64")]
    pub base_check_interval_secs: u64,
    /// Minimum seconds between activities in interruptible states.
    #[serde(default = "default_10_u64")]
    pub min_activity_interval_secs: u64,
    /// Minimum seconds before interrupting sleeping, dancing or watching.
    #[serde(default = "default_120")]
    pub max_activity_interval_secs: u64,
    /// Base probability that a due check triggers an activity.
    #[serde(default = "default_0_6")]
    pub activity_probability: f64,
    /// Floor for the settings-derived interval multiplier.
    #[serde(default = "default_0_3")]
    pub min_settings_multiplier: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            activity_frequency_minutes: 2,
            base_check_interval_secs: 15,
            min_activity_interval_secs: 10,
            max_activity_interval_secs: 120,
            activity_probability: 0.6,
            min_settings_multiplier: 0.3,
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Key under which the memory collection is stored.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Use WAL mode for the SQLite backend.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Store and verify a CRC-32 of each saved blob.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            storage_key: "pet.memories.v1".to_string(),
            wal_mode: true,
            checksum_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_storage_key() -> String { "pet.memories.v1".to_string() }
fn default_decay_rate() -> f64 { 0.001 }
fn default_min_strength() -> f64 { 0.1 }
fn default_location_radius() -> f64 { 50.0 }
fn default_0_05() -> f64 { 0.05 }
fn default_0_1() -> f64 { 0.1 }
fn default_0_3() -> f64 { 0.3 }
fn default_0_5() -> f64 { 0.5 }
fn default_0_6() -> f64 { 0.6 }
fn default_2() -> u32 { 2 }
fn default_15() -> u32 { 15 }
fn default_5_usize() -> usize { 5 }
fn default_10_u64() -> u64 { 10 }
fn default_15_u64() -> u64 { 15 }
fn default_24() -> u64 { 24 }
fn default_120() -> u64 { 120 }
