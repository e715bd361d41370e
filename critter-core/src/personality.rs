//! Personality: five traits turned into behavior probabilities.
//!
//! The model is a pure function set over an immutable trait vector.
//! Replacing the personality means building a new [`PersonalityModel`];
//! nothing is ever mutated in place.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::behavior::{BaseType, Behavior};
use crate::vitals::CreatureState;

/// The creature's personality. Each trait ranges 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTraits {
    /// Playing vs resting (higher = more playful).
    pub playfulness: f64,
    /// Exploring and observing (higher = more curious).
    pub curiosity: f64,
    /// Sleep frequency and depth (higher = sleepier).
    pub sleepiness: f64,
    /// Responsiveness to interaction (higher = more social).
    pub sociability: f64,
    /// Activity frequency and intensity (higher = more energetic).
    pub energy: f64,
}

impl PersonalityTraits {
    /// Neutral personality, every trait at 0.5.
    pub const NEUTRAL: Self = Self {
        playfulness: 0.5,
        curiosity: 0.5,
        sleepiness: 0.5,
        sociability: 0.5,
        energy: 0.5,
    };

    /// Build a trait vector, clamping every trait to [0, 1].
    #[must_use]
    pub fn new(
        playfulness: f64,
        curiosity: f64,
        sleepiness: f64,
        sociability: f64,
        energy: f64,
    ) -> Self {
        Self {
            playfulness,
            curiosity,
            sleepiness,
            sociability,
            energy,
        }
        .validated()
    }

    /// Copy with every trait clamped to [0, 1]. NaN becomes 0.
    #[must_use]
    pub fn validated(self) -> Self {
        Self {
            playfulness: unit(self.playfulness),
            curiosity: unit(self.curiosity),
            sleepiness: unit(self.sleepiness),
            sociability: unit(self.sociability),
            energy: unit(self.energy),
        }
    }
}

impl Default for PersonalityTraits {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Derived probabilities and multipliers for a validated personality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityModel {
    traits: PersonalityTraits,
}

impl PersonalityModel {
    /// Build a model; the traits are validated on the way in.
    #[must_use]
    pub fn new(traits: PersonalityTraits) -> Self {
        Self {
            traits: traits.validated(),
        }
    }

    /// The validated traits this model was built from.
    #[must_use]
    pub fn traits(&self) -> PersonalityTraits {
        self.traits
    }

    /// Probability of playing.
    #[must_use]
    pub fn playfulness_probability(&self) -> f64 {
        self.traits.playfulness
    }

    /// Probability of exploring over observing.
    #[must_use]
    pub fn curiosity_probability(&self) -> f64 {
        self.traits.curiosity
    }

    /// Probability of engaging socially.
    #[must_use]
    pub fn social_interaction_probability(&self) -> f64 {
        self.traits.sociability
    }

    /// Probability of sleeping at `time_of_day` (0.0 = midnight, 1.0 = next midnight).
    ///
    /// Night is `[0, 0.25)` and `(0.75, 1]`: +0.3. Daytime: −0.2.
    #[must_use]
    pub fn sleep_probability(&self, time_of_day: f64) -> f64 {
        let modifier = if time_of_day < 0.25 || time_of_day > 0.75 {
            0.3
        } else {
            -0.2
        };
        (self.traits.sleepiness + modifier).clamp(0.0, 1.0)
    }

    /// How often activities happen: 0.5× at zero energy, 1.5× at full energy.
    #[must_use]
    pub fn activity_frequency_multiplier(&self) -> f64 {
        0.5 + self.traits.energy
    }

    /// How intense activities are: 0.7× to 1.3×.
    #[must_use]
    pub fn activity_intensity_multiplier(&self) -> f64 {
        0.7 + self.traits.energy * 0.6
    }

    /// Animation intensity for the renderer: energy and playfulness both add.
    #[must_use]
    pub fn animation_intensity_multiplier(&self) -> f64 {
        0.7 + self.traits.energy * 0.6 + self.traits.playfulness * 0.4
    }

    /// Soft gate on state transitions.
    ///
    /// Energetic creatures always move on; sluggish ones (energy < 0.3)
    /// refuse 30% of the time.
    pub fn should_transition<R: Rng + ?Sized>(
        &self,
        _from: CreatureState,
        _to: CreatureState,
        rng: &mut R,
    ) -> bool {
        if self.traits.energy > 0.7 {
            return true;
        }
        if self.traits.energy < 0.3 {
            return rng.gen_range(0.0..=1.0) > 0.3;
        }
        true
    }

    /// Baseline preference for a behavior bucket.
    #[must_use]
    pub fn preference_for_activity(&self, base: BaseType) -> f64 {
        let t = &self.traits;
        match base {
            BaseType::Exploring => t.curiosity * t.energy,
            BaseType::Playing => t.playfulness,
            BaseType::Resting => t.sleepiness,
            BaseType::Observing => t.curiosity * (1.0 - t.energy),
            BaseType::Wandering => t.curiosity * t.energy * 0.8,
        }
    }

    /// Preference for a concrete behavior.
    ///
    /// Social behaviors follow sociability and emotional one-shots get a flat
    /// 0.2; everything else uses its bucket's preference.
    #[must_use]
    pub fn preference_for_behavior(&self, behavior: &Behavior) -> f64 {
        match behavior {
            Behavior::Social(_) => self.traits.sociability,
            b if b.is_emotional() => 0.2,
            b => self.preference_for_activity(b.base_type()),
        }
    }
}

impl Default for PersonalityModel {
    fn default() -> Self {
        Self::new(PersonalityTraits::NEUTRAL)
    }
}

impl From<PersonalityTraits> for PersonalityModel {
    fn from(traits: PersonalityTraits) -> Self {
        Self::new(traits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn model(p: f64, c: f64, s: f64, so: f64, e: f64) -> PersonalityModel {
        PersonalityModel::new(PersonalityTraits {
            playfulness: p,
            curiosity: c,
            sleepiness: s,
            sociability: so,
            energy: e,
        })
    }

    #[test]
    fn out_of_range_traits_are_clamped() {
        let m = model(1.5, -0.5, 2.0, f64::NAN, 0.5);
        assert!((m.playfulness_probability() - 1.0).abs() < f64::EPSILON);
        assert!(m.curiosity_probability().abs() < f64::EPSILON);
        assert!(m.social_interaction_probability().abs() < f64::EPSILON);
        assert!((m.sleep_probability(0.5) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn sleep_probability_rises_at_night() {
        let m = model(0.5, 0.5, 0.9, 0.5, 0.5);
        let night = m.sleep_probability(0.9);
        let day = m.sleep_probability(0.2);
        // 0.2 is inside [0, 0.25), so it counts as night too.
        assert!((night - 1.0).abs() < 1e-9);
        assert!((day - 1.0).abs() < 1e-9);

        let noon = m.sleep_probability(0.5);
        assert!((noon - 0.7).abs() < 1e-9);
        assert!(night - noon >= 0.3 - 1e-9);
    }

    #[test]
    fn sleep_probability_clamps_to_unit_range() {
        let m = model(0.5, 0.5, 0.0, 0.5, 0.5);
        assert!(m.sleep_probability(0.5).abs() < f64::EPSILON);
        let m = model(0.5, 0.5, 1.0, 0.5, 0.5);
        assert!((m.sleep_probability(0.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn multipliers_follow_energy() {
        let low = model(0.0, 0.5, 0.5, 0.5, 0.0);
        let high = model(1.0, 0.5, 0.5, 0.5, 1.0);
        assert!((low.activity_frequency_multiplier() - 0.5).abs() < 1e-9);
        assert!((high.activity_frequency_multiplier() - 1.5).abs() < 1e-9);
        assert!((low.activity_intensity_multiplier() - 0.7).abs() < 1e-9);
        assert!((high.activity_intensity_multiplier() - 1.3).abs() < 1e-9);
        assert!((high.animation_intensity_multiplier() - 1.7).abs() < 1e-9);
    }

    #[test]
    fn preferences_per_bucket() {
        let m = model(0.9, 0.8, 0.3, 0.6, 0.5);
        assert!((m.preference_for_activity(BaseType::Playing) - 0.9).abs() < 1e-9);
        assert!((m.preference_for_activity(BaseType::Exploring) - 0.4).abs() < 1e-9);
        assert!((m.preference_for_activity(BaseType::Resting) - 0.3).abs() < 1e-9);
        assert!((m.preference_for_activity(BaseType::Observing) - 0.4).abs() < 1e-9);
        assert!((m.preference_for_activity(BaseType::Wandering) - 0.32).abs() < 1e-9);
        assert!((m.preference_for_behavior(&Behavior::Bored) - 0.2).abs() < 1e-9);
        assert!(
            (m.preference_for_behavior(&Behavior::Social(crate::behavior::SocialReaction::Calm))
                - 0.6)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn energetic_creatures_always_transition() {
        let m = model(0.5, 0.5, 0.5, 0.5, 0.9);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(m.should_transition(CreatureState::Idle, CreatureState::Playing, &mut rng));
        }
    }

    #[test]
    fn sluggish_creatures_sometimes_resist() {
        let m = model(0.5, 0.5, 0.5, 0.5, 0.1);
        let mut rng = StdRng::seed_from_u64(11);
        let accepted = (0..1000)
            .filter(|_| m.should_transition(CreatureState::Idle, CreatureState::Walking, &mut rng))
            .count();
        assert!(accepted > 600 && accepted < 800, "accepted {accepted}");
    }
}
