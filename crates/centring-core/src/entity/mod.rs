//! Entity module for the battle layer.
//!
//! This module provides the core entity types for the decorative battle:
//! - [`EntityId`]: Unique identifier shared by agents, projectiles and effects
//! - [`EntityTag`]: Kind classification used in lifecycle events
//! - [`Team`]: The two opposing sides
//! - [`components`]: The state structs for each entity kind
//!
//! # Example
//!
//! ```
//! use centring_core::entity::{EntityId, Team};
//!
//! let id = EntityId::new(42);
//! assert_eq!(id.as_u64(), 42);
//! assert_eq!(Team::Red.opponent(), Team::Blue);
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{Agent, AgentFlags, BeamAxis, Effect, EffectKind, Projectile, AGENT_START_HEALTH};

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Identifiers are assigned
/// monotonically by the [`Arena`](crate::arena::Arena) and never reused
/// within one battle, so ordering by id is creation order.
///
/// # Example
///
/// ```
/// use centring_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity kind tag.
///
/// Carried in lifecycle events so the presentation layer knows which
/// element type an id refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// A combatant belonging to one of the two teams
    Agent,
    /// A shot in flight
    Projectile,
    /// A transient visual marker (spark, fade, burst, beam)
    Effect,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent => write!(f, "Agent"),
            Self::Projectile => write!(f, "Projectile"),
            Self::Effect => write!(f, "Effect"),
        }
    }
}

/// One of the two battle sides.
///
/// Red is the designated team for tie-breaks when balancing spawns.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// The red team (wins spawn ties)
    Red,
    /// The blue team
    Blue,
}

impl Team {
    /// Both teams in tie-break order.
    pub const ALL: [Team; 2] = [Team::Red, Team::Blue];

    /// Returns the opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Blue => write!(f, "blue"),
        }
    }
}

/// Count of live agents per team.
///
/// Always derived from the registry on demand; never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTally {
    /// Number of red agents
    pub red: usize,
    /// Number of blue agents
    pub blue: usize,
}

impl TeamTally {
    /// Returns the count for one team.
    #[must_use]
    pub const fn get(&self, team: Team) -> usize {
        match team {
            Team::Red => self.red,
            Team::Blue => self.blue,
        }
    }

    /// Total agents across both teams.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.red + self.blue
    }

    /// The team with fewer members; ties go to red.
    #[must_use]
    pub const fn smaller_team(&self) -> Team {
        if self.red <= self.blue {
            Team::Red
        } else {
            Team::Blue
        }
    }

    /// The team with no members, if exactly one side is empty.
    ///
    /// When both sides are empty red is reported, matching the spawn
    /// tie-break.
    #[must_use]
    pub const fn wiped_team(&self) -> Option<Team> {
        if self.red == 0 {
            Some(Team::Red)
        } else if self.blue == 0 {
            Some(Team::Blue)
        } else {
            None
        }
    }

    pub(crate) fn increment(&mut self, team: Team) {
        match team {
            Team::Red => self.red += 1,
            Team::Blue => self.blue += 1,
        }
    }
}
