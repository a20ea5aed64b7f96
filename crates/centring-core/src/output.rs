//! Lifecycle events and snapshots exposed to the presentation layer.
//!
//! The battle never touches a renderer. Each frame it appends
//! [`BattleEvent`]s to an [`EventLog`]; the host drains them with
//! [`Battle::take_events`](crate::simulation::Battle::take_events) and
//! creates, updates or removes the matching visual elements. Positions of
//! moving things are read from a [`BattleSnapshot`] rather than reported
//! as per-frame events.
//!
//! # Example
//!
//! ```
//! use centring_core::entity::{EntityId, EntityTag};
//! use centring_core::output::{BattleEvent, RemovalReason};
//! use glam::Vec2;
//!
//! let event = BattleEvent::ProjectileRemoved {
//!     id: EntityId::new(9),
//!     position: Vec2::new(10.0, 20.0),
//!     reason: RemovalReason::Expired,
//! };
//! assert_eq!(event.entity(), EntityId::new(9));
//! assert_eq!(event.tag(), EntityTag::Projectile);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{Agent, Effect, EffectKind, EntityId, EntityTag, Projectile, Team, TeamTally};

/// Why a projectile left the battle. Exactly one applies per projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RemovalReason {
    /// Time to live ran out
    Expired,
    /// Flew past the viewport margin
    OutOfBounds,
    /// Struck an opposing agent
    Hit {
        /// The agent that was struck
        target: EntityId,
    },
}

/// What inflicted damage on an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "id", rename_all = "snake_case")]
pub enum DamageSource {
    /// A projectile hit
    Projectile(EntityId),
    /// An area burst special event
    AreaBurst(EntityId),
    /// A line beam special event
    LineBeam(EntityId),
}

/// Something the presentation layer should reflect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEvent {
    /// A new agent joined the battle.
    AgentSpawned {
        /// New agent
        id: EntityId,
        /// Its team
        team: Team,
        /// Spawn position
        position: Vec2,
        /// Initial heading
        heading: f32,
    },
    /// An agent lost health.
    AgentDamaged {
        /// Damaged agent
        id: EntityId,
        /// Health removed
        amount: i32,
        /// Health left (may be zero or negative until the cull)
        health: i32,
        /// Cause
        source: DamageSource,
    },
    /// An agent was culled from the registry.
    AgentRemoved {
        /// Removed agent
        id: EntityId,
        /// Its team
        team: Team,
        /// Last position
        position: Vec2,
    },
    /// An agent fired.
    ProjectileFired {
        /// New projectile
        id: EntityId,
        /// Agent that fired
        shooter: EntityId,
        /// Shooter's team
        team: Team,
        /// Muzzle position
        position: Vec2,
        /// Direction of travel
        heading: f32,
    },
    /// A projectile left the battle.
    ProjectileRemoved {
        /// Removed projectile
        id: EntityId,
        /// Last position
        position: Vec2,
        /// Why it was removed
        reason: RemovalReason,
    },
    /// A transient marker appeared.
    EffectStarted {
        /// New effect
        id: EntityId,
        /// What it depicts
        effect: EffectKind,
        /// Anchor point
        position: Vec2,
        /// Clock time when it ends
        expires_at: f64,
    },
    /// A transient marker reached its removal time.
    EffectEnded {
        /// Ended effect
        id: EntityId,
        /// What it depicted
        effect: EffectKind,
    },
}

impl BattleEvent {
    /// The entity this event is about.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        match self {
            Self::AgentSpawned { id, .. }
            | Self::AgentDamaged { id, .. }
            | Self::AgentRemoved { id, .. }
            | Self::ProjectileFired { id, .. }
            | Self::ProjectileRemoved { id, .. }
            | Self::EffectStarted { id, .. }
            | Self::EffectEnded { id, .. } => *id,
        }
    }

    /// Kind of entity the event is about.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::AgentSpawned { .. } | Self::AgentDamaged { .. } | Self::AgentRemoved { .. } => {
                EntityTag::Agent
            }
            Self::ProjectileFired { .. } | Self::ProjectileRemoved { .. } => EntityTag::Projectile,
            Self::EffectStarted { .. } | Self::EffectEnded { .. } => EntityTag::Effect,
        }
    }

    pub(crate) fn agent_spawned(agent: &Agent) -> Self {
        Self::AgentSpawned {
            id: agent.id,
            team: agent.team,
            position: agent.position,
            heading: agent.heading,
        }
    }

    pub(crate) fn effect_started(effect: &Effect) -> Self {
        Self::EffectStarted {
            id: effect.id,
            effect: effect.kind,
            position: effect.position,
            expires_at: effect.expires_at,
        }
    }
}

/// Ordered buffer of events produced since the last drain.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<BattleEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    /// Drains and returns all recorded events in emission order.
    pub fn take(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn as_slice(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Number of undrained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops all pending events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    /// Simulation clock (s)
    pub clock: f64,
    /// Whether a battle is running
    pub running: bool,
    /// Agents per team
    pub tally: TeamTally,
    /// Live agents in registry order
    pub agents: Vec<Agent>,
    /// Projectiles in flight
    pub projectiles: Vec<Projectile>,
    /// Active transient effects
    pub effects: Vec<Effect>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_drains_in_order() {
        let mut log = EventLog::new();
        assert!(log.is_empty());
        for i in 0..3 {
            log.push(BattleEvent::AgentRemoved {
                id: EntityId::new(i),
                team: Team::Red,
                position: Vec2::ZERO,
            });
        }
        assert_eq!(log.len(), 3);
        let drained = log.take();
        let ids: Vec<u64> = drained.iter().map(|e| e.entity().as_u64()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(log.is_empty());
        assert!(log.take().is_empty());
    }

    #[test]
    fn tags_match_variants() {
        let fired = BattleEvent::ProjectileFired {
            id: EntityId::new(1),
            shooter: EntityId::new(0),
            team: Team::Blue,
            position: Vec2::ZERO,
            heading: 0.0,
        };
        assert_eq!(fired.tag(), EntityTag::Projectile);

        let ended = BattleEvent::EffectEnded {
            id: EntityId::new(2),
            effect: EffectKind::HitSpark,
        };
        assert_eq!(ended.tag(), EntityTag::Effect);

        let damaged = BattleEvent::AgentDamaged {
            id: EntityId::new(3),
            amount: 1,
            health: 2,
            source: DamageSource::Projectile(EntityId::new(1)),
        };
        assert_eq!(damaged.tag(), EntityTag::Agent);
        assert_eq!(damaged.entity(), EntityId::new(3));
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = BattleEvent::ProjectileRemoved {
            id: EntityId::new(4),
            position: Vec2::new(1.0, 2.0),
            reason: RemovalReason::Hit {
                target: EntityId::new(7),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "projectile_removed");
        assert_eq!(json["reason"]["reason"], "hit");
        assert_eq!(json["reason"]["target"], 7);
    }
}
