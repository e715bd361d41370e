//! # Critter Core Library
//!
//! Host-agnostic behavior engine for a desktop pet.
//!
//! Three collaborators decide what the creature does from one moment to the next:
//!
//! - **Personality**: five scalar traits turned into probabilities and multipliers
//!   ([`PersonalityModel`])
//! - **Selection**: a weighted cascade over candidate behaviors, including short
//!   behavior chains ([`BehaviorSelector`])
//! - **Memory**: decaying observations (interactions, places, time patterns,
//!   preferences, health patterns) that feed back into selection ([`MemoryStore`])
//!
//! Nothing in this crate talks to a window system, a renderer or a timer. Those
//! live in the host shell; this crate only exposes the contracts they call.
//!
//! ## Failure policy
//!
//! Selection never fails and never returns "no behavior". Memory mutations never
//! fail from the caller's point of view: persistence errors are logged and the
//! in-memory store stays authoritative for the session.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod behavior;
pub mod config;
pub mod decay;
pub mod error;
pub mod memory;
pub mod observation;
pub mod persistence;
pub mod personality;
pub mod selector;
pub mod store;
pub mod types;
pub mod vitals;

pub use behavior::{BaseType, Behavior};
pub use config::CritterConfig;
pub use error::CritterError;
pub use memory::MemoryRecord;
pub use observation::Observation;
pub use personality::{PersonalityModel, PersonalityTraits};
pub use selector::{BehaviorSelector, SelectionContext};
pub use store::{MemoryHandle, MemoryStore};
pub use types::*;
pub use vitals::{CreatureState, VitalsSink};
