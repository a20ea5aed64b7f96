//! Per-frame battle systems.
//!
//! Each system is a `run` function over a [`Frame`], the borrowed view of
//! battle state for one step. [`Battle::step`](crate::simulation::Battle::step)
//! invokes them in a fixed order:
//!
//! 1. [`movement`]: targeting, steering, firing
//! 2. [`projectile`]: flight, expiry, collisions
//! 3. [`special`]: area bursts and line beams (level-gated)
//! 4. [`population`]: cull, refill, rebalance
//! 5. [`effects`]: removal of transient markers whose time has come

pub mod effects;
pub mod movement;
pub mod population;
pub mod projectile;
pub mod special;

use rand_chacha::ChaCha8Rng;

use crate::arena::Arena;
use crate::config::BattleConfig;
use crate::geometry::{Rect, Viewport};
use crate::level::Level;
use crate::output::EventLog;

/// Tolerance for comparisons against accumulated frame time.
///
/// A lifetime of `n * dt` expires on exactly the `n`th step even though the
/// repeated float subtraction drifts by a few ulps.
pub const TIME_EPSILON: f32 = 1e-4;

/// Mutable view of the battle handed to every system for one step.
pub struct Frame<'a> {
    /// Entity registry
    pub arena: &'a mut Arena,
    /// Lifecycle events for the presentation layer
    pub events: &'a mut EventLog,
    /// Seeded battle RNG
    pub rng: &'a mut ChaCha8Rng,
    /// Tuning parameters
    pub config: &'a BattleConfig,
    /// Current viewport
    pub viewport: Viewport,
    /// Rectangles spawn placement must avoid
    pub forbidden: &'a [Rect],
    /// Current level
    pub level: Level,
    /// Simulation clock after this step's advance (s)
    pub now: f64,
    /// Clamped step length (s)
    pub dt: f32,
}
