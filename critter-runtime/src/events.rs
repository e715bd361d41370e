//! Host events that feed the creature's memory.
//!
//! The window system, cursor tracker, app monitor and audio analyzer live
//! outside this crate. They report what happened as a [`PetEvent`]; this
//! module turns it into an observation and, for some events, a state change.

use serde::{Deserialize, Serialize};

use critter_core::observation::Observation;
use critter_core::types::Point;
use critter_core::vitals::{CreatureState, VitalsSink};
use tracing::debug;

use crate::creature::Creature;

/// App preference recorded when the foreground app changes while the
/// creature is sitting with the user.
const FOCUSED_APP_PREFERENCE: f64 = 0.3;

/// How the creature reacted to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorReaction {
    /// Drifted towards it.
    Follow,
    /// Backed away.
    Avoid,
    /// Ran after it.
    Chase,
    /// Hid from it.
    Hide,
}

impl CursorReaction {
    /// Interaction label stored in memory.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Avoid => "avoid",
            Self::Chase => "chase",
            Self::Hide => "hide",
        }
    }
}

/// Something the host noticed.
///
/// Serialized with a `type` tag, e.g.
/// `{"type":"clicked","location":{"x":10.0,"y":4.0}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PetEvent {
    /// The cursor came close and the creature reacted.
    Cursor {
        /// The reaction.
        reaction: CursorReaction,
        /// Cursor position.
        location: Point,
    },
    /// The user clicked the creature.
    Clicked {
        /// Click position.
        location: Point,
    },
    /// The creature's window settled somewhere.
    WindowMoved {
        /// Display index.
        screen_index: u32,
        /// Window origin on that display.
        origin: Point,
    },
    /// The foreground application changed.
    AppChanged {
        /// Application name.
        app_name: String,
    },
    /// The user entered or left a focus app.
    FocusChanged {
        /// Whether the user is now focusing.
        focusing: bool,
    },
    /// Music started or stopped.
    Music {
        /// Whether music is playing.
        playing: bool,
    },
}

impl PetEvent {
    /// Observation to record, given the creature's current state.
    #[must_use]
    pub fn observation(&self, state: CreatureState) -> Option<Observation> {
        match self {
            Self::Cursor { reaction, location } => {
                Some(Observation::interaction(reaction.as_str(), Some(*location)))
            }
            Self::Clicked { location } => Some(Observation::interaction("click", Some(*location))),
            Self::WindowMoved {
                screen_index,
                origin,
            } => Some(Observation::location(*screen_index, *origin)),
            Self::AppChanged { app_name } => {
                let preference = if state == CreatureState::Sitting {
                    FOCUSED_APP_PREFERENCE
                } else {
                    0.0
                };
                Some(Observation::app_preference(app_name.clone(), preference))
            }
            Self::FocusChanged { .. } | Self::Music { .. } => None,
        }
    }

    /// State the creature should move to, given its current state.
    #[must_use]
    pub fn state_change(&self, state: CreatureState) -> Option<CreatureState> {
        match self {
            Self::FocusChanged { focusing: true } => Some(CreatureState::Sitting),
            Self::FocusChanged { focusing: false } if state == CreatureState::Sitting => {
                Some(CreatureState::Idle)
            }
            Self::Music { playing: true } => Some(CreatureState::Dancing),
            Self::Music { playing: false } if state == CreatureState::Dancing => {
                Some(CreatureState::Idle)
            }
            _ => None,
        }
    }
}

/// Apply `event` to `creature`: record its observation, then any state change.
pub fn apply(event: &PetEvent, creature: &mut Creature) {
    if let Some(observation) = event.observation(creature.state()) {
        debug!(kind = ?observation.kind(), "Event remembered");
        creature.memory().record(observation);
    }
    if let Some(state) = event.state_change(creature.state()) {
        creature.set_state(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critter_core::store::{MemoryHandle, MemoryStore};
    use critter_core::{PersonalityModel, PersonalityTraits};

    fn creature() -> Creature {
        let memory = MemoryHandle::new(MemoryStore::ephemeral());
        let traits = PersonalityTraits::new(0.5, 0.5, 0.5, 0.5, 0.9);
        Creature::seeded(PersonalityModel::new(traits), memory, 1)
    }

    #[test]
    fn cursor_reactions_become_interactions() {
        let mut pet = creature();
        apply(
            &PetEvent::Cursor {
                reaction: CursorReaction::Chase,
                location: Point::new(3.0, 4.0),
            },
            &mut pet,
        );
        apply(&PetEvent::Clicked { location: Point::new(1.0, 1.0) }, &mut pet);

        let interactions = pet.memory().lock().interactions();
        let kinds: Vec<&str> = interactions.iter().map(|i| i.interaction_type.as_str()).collect();
        assert_eq!(kinds, ["chase", "click"]);
        assert_eq!(interactions[0].location, Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn window_moves_become_locations() {
        let mut pet = creature();
        for x in [100.0, 120.0, 400.0] {
            apply(
                &PetEvent::WindowMoved {
                    screen_index: 0,
                    origin: Point::new(x, 50.0),
                },
                &mut pet,
            );
        }
        let favorites = pet.memory().lock().favorite_locations(5);
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[0].visit_count, 2);
    }

    #[test]
    fn app_preference_depends_on_sitting() {
        let app = PetEvent::AppChanged {
            app_name: "Editor".into(),
        };
        assert_eq!(
            app.observation(CreatureState::Sitting),
            Some(Observation::app_preference("Editor", 0.3))
        );
        assert_eq!(
            app.observation(CreatureState::Walking),
            Some(Observation::app_preference("Editor", 0.0))
        );
    }

    #[test]
    fn focus_and_music_drive_state() {
        let mut pet = creature();
        apply(&PetEvent::FocusChanged { focusing: true }, &mut pet);
        assert_eq!(pet.state(), CreatureState::Sitting);

        apply(&PetEvent::Music { playing: false }, &mut pet);
        assert_eq!(pet.state(), CreatureState::Sitting);

        apply(&PetEvent::Music { playing: true }, &mut pet);
        assert_eq!(pet.state(), CreatureState::Dancing);

        apply(&PetEvent::FocusChanged { focusing: false }, &mut pet);
        assert_eq!(pet.state(), CreatureState::Dancing);

        apply(&PetEvent::Music { playing: false }, &mut pet);
        assert_eq!(pet.state(), CreatureState::Idle);
    }

    #[test]
    fn events_parse_from_json_lines() {
        let event: PetEvent =
            serde_json::from_str(r#"{"type":"cursor","reaction":"chase","location":{"x":1.0,"y":2.0}}"#)
                .expect("valid event");
        assert_eq!(
            event,
            PetEvent::Cursor {
                reaction: CursorReaction::Chase,
                location: Point::new(1.0, 2.0),
            }
        );
        let music: PetEvent =
            serde_json::from_str(r#"{"type":"music","playing":true}"#).expect("valid event");
        assert_eq!(music, PetEvent::Music { playing: true });
        assert!(serde_json::from_str::<PetEvent>(r#"{"type":"teleport"}"#).is_err());
    }
}
