//! # Centring Core
//!
//! Simulation core for the Centring mini-game.
//!
//! The game asks the player to drop an object on the exact centre of the
//! viewport. From level 2 onward a decorative battle between two teams of
//! autonomous agents plays out behind the field. This crate contains that
//! battle simulation and the scoring rules; it never touches a renderer,
//! input device or storage.
//!
//! ## Architecture
//!
//! - [`simulation::Battle`]: the battle context and fixed-order frame loop
//! - [`arena::Arena`]: registry of agents, projectiles and effects
//! - [`systems`]: movement, projectiles, special events, population, effects
//! - [`output`]: lifecycle events and snapshots for the presentation layer
//! - [`config`]: every tuning constant, loadable from JSON
//! - [`scoring`]: the centring score and per-level bests
//!
//! ## Usage
//!
//! ```
//! use centring_core::{Battle, Level, Viewport};
//!
//! let mut battle = Battle::new(42);
//! battle.start(Level::new(3)?, Viewport::new(1280.0, 800.0), Vec::new());
//!
//! let mut ts = 0.0;
//! for _ in 0..120 {
//!     ts += 16.0;
//!     battle.frame(ts);
//!     for event in battle.take_events() {
//!         // create, update or remove the matching visual element
//!         let _ = event.entity();
//!     }
//! }
//!
//! let snapshot = battle.snapshot();
//! assert!(snapshot.tally.red > 0 || snapshot.tally.blue > 0);
//! # Ok::<(), centring_core::LevelError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod config;
pub mod entity;
pub mod geometry;
pub mod level;
pub mod output;
pub mod scoring;
pub mod simulation;
pub mod systems;

#[cfg(test)]
mod tests;

pub use arena::Arena;
pub use config::{BattleConfig, ConfigError};
pub use entity::{EntityId, Team, TeamTally};
pub use geometry::{Rect, Viewport};
pub use level::{Level, LevelError};
pub use output::{BattleEvent, BattleSnapshot, RemovalReason};
pub use scoring::{centering_score, BestScores, CenteringOutcome};
pub use simulation::{Battle, FrameStats};
