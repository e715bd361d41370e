//! Behavior selection: the weighting cascade.
//!
//! Each decision cycle starts from [`Behavior::CANDIDATES`] and runs the
//! weights through a fixed cascade:
//!
//! 1. base preference from personality
//! 2. variant enhancement (direction, toy, nap depth, curiosity target, social reaction)
//! 3. emotional overlay from vitals
//! 4. memory modifiers (time patterns, activity preferences, health patterns)
//! 5. time-of-day modifiers
//! 6. vitals modifiers
//! 7. age-in-cycle modifiers
//! 8. weighted draw, walking candidates in insertion order
//!
//! A chosen behavior may then start a short chain of associated follow-ups,
//! consumed one per call before fresh selection resumes.
//!
//! The selector never fails. An empty or non-positive distribution falls back
//! to a uniform pick over the candidate set.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::behavior::{
    BaseType, Behavior, CuriosityTarget, Direction, SleepDepth, SocialReaction, Toy,
};
use crate::config::SelectorConfig;
use crate::personality::PersonalityModel;
use crate::store::MemoryHandle;
use crate::types::{ClockTime, DayPeriod};

/// Everything the selector needs to know about the moment of decision.
#[derive(Debug, Clone)]
pub struct SelectionContext {
    /// Wall-clock hour and minute.
    pub clock: ClockTime,
    /// Position in the current day cycle, 0.0 to 1.0.
    pub age_fraction: f64,
    /// Current health, 0.0 to 1.0.
    pub health: f64,
    /// Current happiness, 0.0 to 1.0.
    pub happiness: f64,
    /// The creature's personality.
    pub personality: PersonalityModel,
    /// Whether the creature's current state may be interrupted.
    pub allows_interrupt: bool,
}

impl SelectionContext {
    /// Context with full vitals, mid-cycle, interruptible.
    #[must_use]
    pub fn new(clock: ClockTime, personality: PersonalityModel) -> Self {
        Self {
            clock,
            age_fraction: 0.5,
            health: 1.0,
            happiness: 1.0,
            personality,
            allows_interrupt: true,
        }
    }

    /// Set health and happiness.
    #[must_use]
    pub fn with_vitals(mut self, health: f64, happiness: f64) -> Self {
        self.health = health;
        self.happiness = happiness;
        self
    }

    /// Set the position in the day cycle.
    #[must_use]
    pub fn with_age(mut self, age_fraction: f64) -> Self {
        self.age_fraction = age_fraction;
        self
    }
}

/// Index of the first entry whose cumulative weight reaches `r`.
///
/// Weights are walked in order, so ties resolve to the earlier entry and
/// `r == total` selects the last non-zero entry. Non-positive weights are
/// never selected. Returns `None` when `r` exceeds the total.
#[must_use]
pub fn weighted_pick(weights: &[f64], r: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        if cumulative >= r {
            return Some(i);
        }
    }
    None
}

/// Picks the creature's next behavior.
pub struct BehaviorSelector<R: Rng = StdRng> {
    memory: MemoryHandle,
    config: SelectorConfig,
    rng: R,
    chain: Vec<Behavior>,
    chain_index: usize,
    current: Option<Behavior>,
}

impl<R: Rng> std::fmt::Debug for BehaviorSelector<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorSelector")
            .field("current", &self.current)
            .field("chain", &self.chain)
            .field("chain_index", &self.chain_index)
            .finish_non_exhaustive()
    }
}

impl BehaviorSelector<StdRng> {
    /// Selector seeded from the operating system.
    #[must_use]
    pub fn new(memory: MemoryHandle, config: SelectorConfig) -> Self {
        Self::with_rng(memory, config, StdRng::from_entropy())
    }

    /// Deterministic selector for tests and replays.
    #[must_use]
    pub fn seeded(memory: MemoryHandle, config: SelectorConfig, seed: u64) -> Self {
        Self::with_rng(memory, config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> BehaviorSelector<R> {
    /// Selector drawing from `rng`.
    pub fn with_rng(memory: MemoryHandle, config: SelectorConfig, rng: R) -> Self {
        Self {
            memory,
            config,
            rng,
            chain: Vec::new(),
            chain_index: 0,
            current: None,
        }
    }

    /// The memory this selector reads.
    #[must_use]
    pub fn memory(&self) -> &MemoryHandle {
        &self.memory
    }

    /// Behavior most recently returned or forced.
    #[must_use]
    pub fn current_activity(&self) -> Option<Behavior> {
        self.current
    }

    /// Chain links not yet handed out.
    #[must_use]
    pub fn chain_remaining(&self) -> &[Behavior] {
        self.chain.get(self.chain_index..).unwrap_or(&[])
    }

    /// The whole active chain, including links already handed out.
    #[must_use]
    pub fn active_chain(&self) -> &[Behavior] {
        &self.chain
    }

    /// Make `behavior` current without weighting. Any pending chain is
    /// dropped.
    pub fn force(&mut self, behavior: Behavior) -> Behavior {
        self.chain.clear();
        self.chain_index = 0;
        self.current = Some(behavior);
        debug!(%behavior, "Behavior forced");
        behavior
    }

    /// Choose the next behavior.
    ///
    /// Pending chain links are returned first, in order. A non-interruptible
    /// context keeps the current behavior.
    pub fn select_next(&mut self, ctx: &SelectionContext) -> Behavior {
        if !ctx.allows_interrupt {
            if let Some(current) = self.current {
                trace!(%current, "Current behavior not interruptible");
                return current;
            }
        }

        if let Some(&next) = self.chain.get(self.chain_index) {
            self.chain_index += 1;
            self.current = Some(next);
            debug!(
                behavior = %next,
                link = self.chain_index,
                of = self.chain.len(),
                "Chain link selected"
            );
            return next;
        }
        self.chain.clear();
        self.chain_index = 0;

        let chosen = self.select_contextual(ctx);
        self.current = Some(chosen);

        if self.should_start_chain(&chosen, &ctx.personality) {
            self.chain = self.generate_chain(chosen, ctx);
            self.chain_index = 1;
            debug!(chain = ?self.chain, "Behavior chain started");
        }

        debug!(behavior = %chosen, hour = ctx.clock.hour, "Behavior selected");
        chosen
    }

    /// Final weighted candidate list for `ctx`, before the draw.
    pub fn weigh(&mut self, ctx: &SelectionContext) -> Vec<(Behavior, f64)> {
        let engine = &ctx.personality;

        let mut candidates: Vec<(Behavior, f64)> = Behavior::CANDIDATES
            .iter()
            .map(|b| (*b, engine.preference_for_behavior(b)))
            .collect();

        self.enhance_variants(&mut candidates, ctx);
        self.add_emotional_overlay(&mut candidates, ctx);
        self.apply_memory_modifiers(&mut candidates, ctx);
        self.apply_time_of_day(&mut candidates, ctx);
        self.apply_vitals(&mut candidates, ctx);
        self.apply_age(&mut candidates, ctx);

        candidates
    }

    fn select_contextual(&mut self, ctx: &SelectionContext) -> Behavior {
        let candidates = self.weigh(ctx);
        let weights: Vec<f64> = candidates.iter().map(|(_, w)| w.max(0.0)).collect();
        let total: f64 = weights.iter().sum();

        if total > 0.0 && total.is_finite() {
            let r = self.rng.gen_range(0.0..=total);
            if let Some(i) = weighted_pick(&weights, r) {
                trace!(total, r, index = i, "Weighted draw");
                return candidates[i].0;
            }
        }

        debug!(total, "Degenerate weights, picking uniformly");
        self.uniform_fallback()
    }

    fn uniform_fallback(&mut self) -> Behavior {
        Behavior::CANDIDATES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Behavior::Observing)
    }

    // ------------------------------------------------------------------
    // Cascade steps
    // ------------------------------------------------------------------

    fn enhance_variants(&mut self, candidates: &mut [(Behavior, f64)], ctx: &SelectionContext) {
        let cfg = &self.config;
        let engine = &ctx.personality;
        let sleep = engine.sleep_probability(ctx.clock.day_fraction());

        for (behavior, weight) in candidates.iter_mut() {
            match *behavior {
                Behavior::Exploring(None)
                    if engine.curiosity_probability() > cfg.direction_curiosity_threshold =>
                {
                    let direction = *Direction::ALL.choose(&mut self.rng).unwrap_or(&Direction::Random);
                    *behavior = Behavior::Exploring(Some(direction));
                    *weight *= cfg.direction_boost;
                }
                Behavior::Playing(None)
                    if engine.playfulness_probability() > cfg.toy_playfulness_threshold =>
                {
                    let toy = *Toy::ALL.choose(&mut self.rng).unwrap_or(&Toy::Ball);
                    *behavior = Behavior::Playing(Some(toy));
                    *weight *= cfg.toy_boost;
                }
                Behavior::Resting if sleep > cfg.nap_sleep_threshold || ctx.clock.is_night() => {
                    let depth = if sleep > cfg.deep_nap_threshold {
                        SleepDepth::Deep
                    } else {
                        SleepDepth::Medium
                    };
                    *behavior = Behavior::Napping(depth);
                    *weight *= cfg.nap_boost;
                }
                Behavior::Observing if engine.curiosity_probability() > cfg.curious_threshold => {
                    let target = *CuriosityTarget::ALL
                        .choose(&mut self.rng)
                        .unwrap_or(&CuriosityTarget::Random);
                    *behavior = Behavior::Curious(target);
                    *weight *= cfg.curious_boost;
                }
                Behavior::Social(_) => {
                    *behavior = Behavior::Social(self.social_reaction(engine));
                }
                _ => {}
            }
        }
    }

    fn social_reaction(&self, engine: &PersonalityModel) -> SocialReaction {
        let cfg = &self.config;
        let sociability = engine.social_interaction_probability();
        if sociability > cfg.social_excited_threshold {
            SocialReaction::Excited
        } else if sociability > cfg.social_friendly_threshold {
            SocialReaction::Friendly
        } else if sociability < cfg.social_shy_threshold {
            SocialReaction::Shy
        } else {
            SocialReaction::Calm
        }
    }

    fn add_emotional_overlay(&self, candidates: &mut Vec<(Behavior, f64)>, ctx: &SelectionContext) {
        let cfg = &self.config;
        if ctx.happiness < cfg.bored_happiness_threshold {
            candidates.push((Behavior::Bored, cfg.bored_weight));
        } else if ctx.happiness > cfg.excited_happiness_threshold {
            candidates.push((Behavior::Excited, cfg.excited_weight));
        }
        if ctx.health < cfg.confused_health_threshold {
            candidates.push((Behavior::Confused, cfg.confused_weight));
        }
    }

    fn apply_memory_modifiers(&self, candidates: &mut [(Behavior, f64)], ctx: &SelectionContext) {
        let cfg = &self.config;
        let store = self.memory.lock();
        let ClockTime { hour, minute } = ctx.clock;

        for (behavior, weight) in candidates.iter_mut() {
            if let Some(pattern) =
                store.find_time_pattern(hour, minute, behavior.base_type().as_str())
            {
                *weight += pattern.boost(cfg.pattern_occurrence_factor);
            }
        }

        for (behavior, weight) in candidates.iter_mut() {
            if let Some(pref) = store.activity_preference(behavior.base_type().as_str()) {
                *weight = (*weight + pref.modifier(cfg.enjoyment_factor)).max(0.0);
            }
        }

        if let Some(pattern) = store.find_health_pattern(hour) {
            if pattern.is_low(cfg.health_pattern_threshold) {
                let bonus = pattern.strength * cfg.health_pattern_factor;
                for (behavior, weight) in candidates.iter_mut() {
                    if behavior.base_type() == BaseType::Resting {
                        *weight += bonus;
                    }
                }
            }
        }
    }

    fn apply_time_of_day(&self, candidates: &mut [(Behavior, f64)], ctx: &SelectionContext) {
        let cfg = &self.config;
        let engine = &ctx.personality;

        match DayPeriod::of(ctx.clock.hour) {
            DayPeriod::Night => {
                let sleep = engine.sleep_probability(ctx.age_fraction);
                for (behavior, weight) in candidates.iter_mut() {
                    if behavior.base_type() == BaseType::Resting {
                        *weight += sleep;
                    } else {
                        *weight *= cfg.night_damping;
                    }
                }
            }
            DayPeriod::EarlyMorning => {
                let factor = 1.0 + engine.curiosity_probability();
                for (behavior, weight) in candidates.iter_mut() {
                    if is_active(behavior.base_type()) {
                        *weight *= factor;
                    }
                }
            }
            DayPeriod::Midday => {
                for (behavior, weight) in candidates.iter_mut() {
                    if behavior.base_type() == BaseType::Resting {
                        *weight += cfg.midday_rest_bonus;
                    } else {
                        *weight *= cfg.midday_damping;
                    }
                }
            }
            DayPeriod::Evening => {
                let factor = 1.0 + engine.social_interaction_probability();
                for (behavior, weight) in candidates.iter_mut() {
                    if matches!(behavior.base_type(), BaseType::Observing | BaseType::Playing) {
                        *weight *= factor;
                    }
                }
            }
            DayPeriod::Daytime => {}
        }
    }

    fn apply_vitals(&self, candidates: &mut [(Behavior, f64)], ctx: &SelectionContext) {
        let cfg = &self.config;
        // Low health wins outright; happiness is only consulted when health is fine.
        if ctx.health < cfg.low_health_threshold {
            for (behavior, weight) in candidates.iter_mut() {
                if behavior.base_type() == BaseType::Resting {
                    *weight += cfg.low_health_rest_bonus;
                } else {
                    *weight *= cfg.low_health_damping;
                }
            }
        } else if ctx.happiness < cfg.low_happiness_threshold {
            let bonus = cfg.low_happiness_play_factor * ctx.personality.playfulness_probability();
            for (behavior, weight) in candidates.iter_mut() {
                if behavior.is_playful() {
                    *weight += bonus;
                }
            }
        }
    }

    fn apply_age(&self, candidates: &mut [(Behavior, f64)], ctx: &SelectionContext) {
        let cfg = &self.config;
        let frequency = ctx.personality.activity_frequency_multiplier();

        let factor = if ctx.age_fraction > cfg.late_age_threshold {
            1.0 - frequency + 0.5
        } else if ctx.age_fraction < cfg.early_age_threshold {
            1.0 + frequency * cfg.early_age_factor
        } else {
            return;
        };

        for (behavior, weight) in candidates.iter_mut() {
            if is_active(behavior.base_type()) {
                *weight *= factor;
            }
        }
    }

    // ------------------------------------------------------------------
    // Chains
    // ------------------------------------------------------------------

    fn should_start_chain(&mut self, chosen: &Behavior, engine: &PersonalityModel) -> bool {
        let cfg = &self.config;
        let probability = if engine.activity_frequency_multiplier() > cfg.chain_energy_threshold {
            cfg.chain_energy_probability
        } else if chosen.base_type() == BaseType::Exploring
            && engine.curiosity_probability() > cfg.chain_explore_curiosity
        {
            cfg.chain_explore_probability
        } else if chosen.base_type() == BaseType::Playing
            && engine.playfulness_probability() > cfg.chain_play_playfulness
        {
            cfg.chain_play_probability
        } else {
            return false;
        };
        self.rng.r#gen::<f64>() < probability
    }

    fn generate_chain(&mut self, first: Behavior, ctx: &SelectionContext) -> Vec<Behavior> {
        let min = self.config.chain_min_length.max(1);
        let max = self.config.chain_max_length.max(min);
        let length = self.rng.gen_range(min..=max);

        let mut chain = Vec::with_capacity(length);
        chain.push(first);
        while chain.len() < length {
            let previous = chain[chain.len() - 1];
            let next = self.next_chain_link(&previous, ctx);
            chain.push(next);
        }
        chain
    }

    fn next_chain_link(&mut self, previous: &Behavior, ctx: &SelectionContext) -> Behavior {
        let cfg = &self.config;
        let engine = &ctx.personality;
        match previous.base_type() {
            BaseType::Exploring => {
                if engine.curiosity_probability() > cfg.chain_curious_after_exploring {
                    Behavior::Curious(CuriosityTarget::Random)
                } else {
                    Behavior::Observing
                }
            }
            BaseType::Playing => {
                if engine.social_interaction_probability() > cfg.chain_social_after_playing {
                    Behavior::Social(SocialReaction::Friendly)
                } else if self.rng.r#gen::<f64>() < cfg.chain_excited_probability {
                    Behavior::Excited
                } else {
                    Behavior::Playing(Some(Toy::Ball))
                }
            }
            BaseType::Resting => {
                if engine.sleep_probability(ctx.age_fraction) > cfg.chain_nap_threshold {
                    Behavior::Napping(SleepDepth::Medium)
                } else {
                    Behavior::Resting
                }
            }
            BaseType::Observing => {
                if engine.curiosity_probability() > cfg.chain_curious_after_observing {
                    Behavior::Curious(CuriosityTarget::Random)
                } else {
                    Behavior::Exploring(Some(Direction::Random))
                }
            }
            BaseType::Wandering => Behavior::Exploring(Some(Direction::Random)),
        }
    }
}

fn is_active(base: BaseType) -> bool {
    matches!(base, BaseType::Exploring | BaseType::Wandering)
}
