//! # Critter Runtime
//!
//! Host shell around `critter-core`: the creature that owns state and vitals,
//! the scheduler abstraction, host events and the activity clock.
//!
//! ```text
//!   scheduler ──tick──▶ BehaviorDriver ──select_next──▶ BehaviorSelector
//!                           │                                 │
//!                           ▼ execute                         ▼ reads
//!                        Creature ───────record──────▶ MemoryHandle
//!                           ▲
//!   host ──PetEvent─────────┘
//! ```
//!
//! ## Modules
//!
//! - `clock`: `Scheduler` trait, tokio and manual schedulers, check-interval math
//! - `creature`: state, vitals and the day cycle
//! - `events`: host events turned into memories and state changes
//! - `driver`: the activity clock
//! - `telemetry`: tracing subscriber setup

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod creature;
pub mod driver;
pub mod events;
pub mod telemetry;

pub use clock::{CancelHandle, ManualScheduler, Scheduler, TokioScheduler};
pub use creature::Creature;
pub use driver::{BehaviorDriver, DriverHandle};
pub use events::{CursorReaction, PetEvent};
