//! Behaviors: what the creature is doing right now.
//!
//! A [`Behavior`] is a closed sum type. Some variants carry a detail
//! (direction, toy, nap depth, curiosity target, social reaction). Every
//! variant reduces to one of five [`BaseType`] buckets, which is the only
//! part of a behavior that is ever written to memory.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Exploration heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Up the screen.
    North,
    /// Down the screen.
    South,
    /// Right.
    East,
    /// Left.
    West,
    /// Let the renderer pick.
    Random,
}

impl Direction {
    /// Every direction, in declaration order.
    pub const ALL: [Self; 5] = [Self::North, Self::South, Self::East, Self::West, Self::Random];
}

/// Depth of a nap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepDepth {
    /// Dozing.
    Light,
    /// Ordinary nap.
    Medium,
    /// Fast asleep.
    Deep,
}

/// What caught the creature's attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CuriosityTarget {
    /// Another window.
    Window,
    /// The mouse cursor.
    Mouse,
    /// The edge of the screen.
    ScreenEdge,
    /// Let the renderer pick.
    Random,
}

impl CuriosityTarget {
    /// Every target, in declaration order.
    pub const ALL: [Self; 4] = [Self::Window, Self::Mouse, Self::ScreenEdge, Self::Random];
}

/// Toy to play with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toy {
    /// A bouncing ball.
    Ball,
    /// A sparkle trail.
    Sparkle,
    /// A floating bubble.
    Bubble,
}

impl Toy {
    /// Every toy, in declaration order.
    pub const ALL: [Self; 3] = [Self::Ball, Self::Sparkle, Self::Bubble];
}

/// Flavor of a social behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialReaction {
    /// Warm and approachable.
    Friendly,
    /// Hesitant.
    Shy,
    /// Bouncing with enthusiasm.
    Excited,
    /// Relaxed.
    Calm,
}

/// Coarse bucket a behavior reduces to for memory lookups and
/// cross-variant weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    /// Moving around with purpose.
    Exploring,
    /// Playing, alone or socially.
    Playing,
    /// Sitting or sleeping.
    Resting,
    /// Watching the world, including emotional one-shots.
    Observing,
    /// Aimless movement.
    Wandering,
}

impl BaseType {
    /// Every bucket, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Exploring,
        Self::Playing,
        Self::Resting,
        Self::Observing,
        Self::Wandering,
    ];

    /// Key used for this bucket in memory records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exploring => "exploring",
            Self::Playing => "playing",
            Self::Resting => "resting",
            Self::Observing => "observing",
            Self::Wandering => "wandering",
        }
    }

    /// Parse a memory key back into a bucket.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_str() == key)
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete behavior chosen for the creature.
///
/// `Exploring(None)` and `Playing(None)` are the generic forms that the
/// selector may sharpen into a directed or toy-specific variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "behavior", content = "detail", rename_all = "snake_case")]
pub enum Behavior {
    /// Explore, optionally in a direction.
    Exploring(Option<Direction>),
    /// Play, optionally with a toy.
    Playing(Option<Toy>),
    /// Sit and recover.
    Resting,
    /// Sleep.
    Napping(SleepDepth),
    /// Watch quietly.
    Observing,
    /// Investigate something specific.
    Curious(CuriosityTarget),
    /// Drift around.
    Wandering,
    /// React to the user.
    Social(SocialReaction),
    /// Jump at something.
    Startled,
    /// Lose the thread.
    Confused,
    /// Burst of joy.
    Excited,
    /// Nothing to do.
    Bored,
}

impl Behavior {
    /// One representative per variant, in the fixed candidate order the
    /// selector walks.
    pub const CANDIDATES: [Self; 14] = [
        Self::Exploring(None),
        Self::Exploring(Some(Direction::Random)),
        Self::Playing(None),
        Self::Playing(Some(Toy::Ball)),
        Self::Resting,
        Self::Napping(SleepDepth::Medium),
        Self::Observing,
        Self::Curious(CuriosityTarget::Random),
        Self::Wandering,
        Self::Social(SocialReaction::Friendly),
        Self::Startled,
        Self::Confused,
        Self::Excited,
        Self::Bored,
    ];

    /// Bucket used for memory and weighting.
    #[must_use]
    pub fn base_type(&self) -> BaseType {
        match self {
            Self::Exploring(_) => BaseType::Exploring,
            Self::Playing(_) | Self::Social(_) => BaseType::Playing,
            Self::Resting | Self::Napping(_) => BaseType::Resting,
            Self::Observing
            | Self::Curious(_)
            | Self::Startled
            | Self::Confused
            | Self::Excited
            | Self::Bored => BaseType::Observing,
            Self::Wandering => BaseType::Wandering,
        }
    }

    /// Transient emotional reactions.
    #[must_use]
    pub fn is_emotional(&self) -> bool {
        matches!(
            self,
            Self::Startled | Self::Confused | Self::Excited | Self::Bored
        )
    }

    /// Whether this is in the playing family (playing, toys, social).
    #[must_use]
    pub fn is_playful(&self) -> bool {
        self.base_type() == BaseType::Playing
    }

    /// Short tag naming the variant, without its detail.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Exploring(None) => "exploring",
            Self::Exploring(Some(_)) => "exploring_with_direction",
            Self::Playing(None) => "playing",
            Self::Playing(Some(_)) => "playing_with_toy",
            Self::Resting => "resting",
            Self::Napping(_) => "napping",
            Self::Observing => "observing",
            Self::Curious(_) => "curious",
            Self::Wandering => "wandering",
            Self::Social(_) => "social",
            Self::Startled => "startled",
            Self::Confused => "confused",
            Self::Excited => "excited",
            Self::Bored => "bored",
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exploring(Some(d)) => write!(f, "exploring({d:?})"),
            Self::Playing(Some(t)) => write!(f, "playing({t:?})"),
            Self::Napping(d) => write!(f, "napping({d:?})"),
            Self::Curious(t) => write!(f, "curious({t:?})"),
            Self::Social(r) => write!(f, "social({r:?})"),
            other => f.write_str(other.tag()),
        }
    }
}
