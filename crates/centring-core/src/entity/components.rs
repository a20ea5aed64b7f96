//! State structs for each entity kind.
//!
//! All fields are public: the battle systems mutate them directly and the
//! presentation layer reads them through snapshots.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{EntityId, Team};

/// Health every agent spawns with.
pub const AGENT_START_HEALTH: i32 = 3;

bitflags! {
    /// Presentation hints describing what an agent did on its last step.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AgentFlags: u8 {
        /// Has a target this frame
        const ENGAGED = 1 << 0;
        /// Backing away because the target is too close
        const RETREATING = 1 << 1;
        /// Health reached zero; removed by the next cull
        const DESTROYED = 1 << 2;
    }
}

impl Default for AgentFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A combatant.
///
/// # Invariants
///
/// - `health > 0` for every agent in the registry at the start of a frame
/// - `target` is advisory only; it may name an agent that no longer exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier
    pub id: EntityId,
    /// Side this agent fights for
    pub team: Team,
    /// Position in viewport pixels
    pub position: Vec2,
    /// Heading in radians (counter-clockwise from +X in screen space)
    pub heading: f32,
    /// Movement speed in px/s
    pub speed: f32,
    /// Remaining hit points
    pub health: i32,
    /// Seconds until the agent may fire again
    pub fire_cooldown: f32,
    /// Enemy selected on the last step
    pub target: Option<EntityId>,
    /// Presentation hints
    pub flags: AgentFlags,
}

impl Agent {
    /// Creates a full-health agent.
    #[must_use]
    pub fn new(
        id: EntityId,
        team: Team,
        position: Vec2,
        heading: f32,
        speed: f32,
        fire_cooldown: f32,
    ) -> Self {
        Self {
            id,
            team,
            position,
            heading,
            speed,
            health: AGENT_START_HEALTH,
            fire_cooldown,
            target: None,
            flags: AgentFlags::empty(),
        }
    }

    /// Returns `true` while health is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Subtracts damage and marks the agent destroyed at zero.
    ///
    /// Returns the remaining health.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        self.health -= amount;
        if self.health <= 0 {
            self.flags.insert(AgentFlags::DESTROYED);
        }
        self.health
    }

    /// Unit vector along the current heading.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }
}

/// A shot in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Unique identifier
    pub id: EntityId,
    /// Team of the agent that fired it; never damages this team
    pub team: Team,
    /// Position in viewport pixels
    pub position: Vec2,
    /// Velocity in px/s
    pub velocity: Vec2,
    /// Seconds left before it expires
    pub ttl: f32,
}

impl Projectile {
    /// Heading of travel in radians.
    #[must_use]
    pub fn heading(&self) -> f32 {
        self.velocity.y.atan2(self.velocity.x)
    }
}

/// Orientation of a line beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamAxis {
    /// Spans the full width at a fixed y
    Horizontal,
    /// Spans the full height at a fixed x
    Vertical,
}

/// What a transient effect depicts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectKind {
    /// Projectile impact marker
    HitSpark,
    /// Fading silhouette of a removed agent
    DeathFade {
        /// Team of the fallen agent
        team: Team,
        /// Heading at the moment of death
        heading: f32,
    },
    /// Area-damage special event
    AreaBurst {
        /// Damage radius in px
        radius: f32,
    },
    /// Line-damage special event
    LineBeam {
        /// Beam orientation
        axis: BeamAxis,
        /// Band thickness in px
        thickness: f32,
    },
}

impl EffectKind {
    /// Returns `true` for the special-event variants, which hold the
    /// concurrency slot until they expire.
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(self, Self::AreaBurst { .. } | Self::LineBeam { .. })
    }
}

/// A transient visual marker with a scheduled removal time.
///
/// For beams `position` holds the band centre: `y` for horizontal beams,
/// `x` for vertical ones, with the other coordinate at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Unique identifier
    pub id: EntityId,
    /// What to draw
    pub kind: EffectKind,
    /// Anchor point in viewport pixels
    pub position: Vec2,
    /// Simulation clock time (seconds) at which the effect is removed
    pub expires_at: f64,
}

impl Effect {
    /// Returns `true` once the clock has reached the removal time.
    #[must_use]
    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.expires_at
    }
}
