//! Arena module for the battle layer.
//!
//! The Arena is the registry for everything alive in one battle. It provides:
//! - Agent, projectile and effect storage with deterministic iteration order
//! - Monotonic id assignment shared by all three kinds
//! - Proximity queries used by targeting, collisions and placement
//! - The derived [`TeamTally`]
//!
//! # Determinism
//!
//! Storage uses `BTreeMap` keyed by [`EntityId`]. Ids only ever increase, so
//! iterating a map visits entities in creation order, which is the
//! "registry order" every tie-break in the systems refers to.
//!
//! # Example
//!
//! ```
//! use centring_core::arena::Arena;
//! use centring_core::entity::Team;
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let red = arena.spawn_agent(Team::Red, Vec2::new(100.0, 100.0), 0.0, 50.0, 0.0);
//! let blue = arena.spawn_agent(Team::Blue, Vec2::new(160.0, 100.0), 0.0, 50.0, 0.0);
//!
//! let (target, dist_sq) = arena.nearest_enemy(red).unwrap();
//! assert_eq!(target, blue);
//! assert_eq!(dist_sq, 3600.0);
//! assert_eq!(arena.tally().total(), 2);
//! ```

use std::collections::BTreeMap;

use glam::Vec2;

use crate::entity::{Agent, Effect, EffectKind, EntityId, Projectile, Team, TeamTally};

// =============================================================================
// Arena
// =============================================================================

/// Registry of agents, projectiles and transient effects.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    /// Monotonically increasing id counter, never reset.
    next_id: u64,
    agents: BTreeMap<EntityId, Agent>,
    projectiles: BTreeMap<EntityId, Projectile>,
    effects: BTreeMap<EntityId, Effect>,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    // -------------------------------------------------------------------------
    // Spawning
    // -------------------------------------------------------------------------

    /// Adds a full-health agent and returns its id.
    pub fn spawn_agent(
        &mut self,
        team: Team,
        position: Vec2,
        heading: f32,
        speed: f32,
        fire_cooldown: f32,
    ) -> EntityId {
        let id = self.allocate_id();
        self.agents
            .insert(id, Agent::new(id, team, position, heading, speed, fire_cooldown));
        id
    }

    /// Adds a projectile and returns its id.
    pub fn spawn_projectile(&mut self, team: Team, position: Vec2, velocity: Vec2, ttl: f32) -> EntityId {
        let id = self.allocate_id();
        self.projectiles.insert(
            id,
            Projectile {
                id,
                team,
                position,
                velocity,
                ttl,
            },
        );
        id
    }

    /// Schedules a transient effect and returns its id.
    pub fn spawn_effect(&mut self, kind: EffectKind, position: Vec2, expires_at: f64) -> EntityId {
        let id = self.allocate_id();
        self.effects.insert(
            id,
            Effect {
                id,
                kind,
                position,
                expires_at,
            },
        );
        id
    }

    // -------------------------------------------------------------------------
    // Removal
    // -------------------------------------------------------------------------

    /// Removes an agent, returning it if it existed.
    pub fn remove_agent(&mut self, id: EntityId) -> Option<Agent> {
        self.agents.remove(&id)
    }

    /// Removes a projectile, returning it if it existed.
    pub fn remove_projectile(&mut self, id: EntityId) -> Option<Projectile> {
        self.projectiles.remove(&id)
    }

    /// Removes an effect, returning it if it existed.
    pub fn remove_effect(&mut self, id: EntityId) -> Option<Effect> {
        self.effects.remove(&id)
    }

    /// Drops every entity. The id counter keeps running so ids are never
    /// reused by a later battle on the same arena.
    pub fn clear(&mut self) {
        self.agents.clear();
        self.projectiles.clear();
        self.effects.clear();
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    /// Returns an agent by id.
    #[must_use]
    pub fn agent(&self, id: EntityId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Returns a mutable agent by id.
    #[must_use]
    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Returns a projectile by id.
    #[must_use]
    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    /// Returns a mutable projectile by id.
    #[must_use]
    pub fn projectile_mut(&mut self, id: EntityId) -> Option<&mut Projectile> {
        self.projectiles.get_mut(&id)
    }

    /// Returns an effect by id.
    #[must_use]
    pub fn effect(&self, id: EntityId) -> Option<&Effect> {
        self.effects.get(&id)
    }

    /// Agent ids in registry order.
    pub fn agent_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.agents.keys().copied()
    }

    /// Agents in registry order.
    pub fn agents_sorted(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    /// Mutable agents in registry order.
    pub fn agents_sorted_mut(&mut self) -> impl Iterator<Item = &mut Agent> + '_ {
        self.agents.values_mut()
    }

    /// Projectile ids in creation order.
    pub fn projectile_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.projectiles.keys().copied()
    }

    /// Projectiles in creation order.
    pub fn projectiles_sorted(&self) -> impl Iterator<Item = &Projectile> + '_ {
        self.projectiles.values()
    }

    /// Effects in creation order.
    pub fn effects_sorted(&self) -> impl Iterator<Item = &Effect> + '_ {
        self.effects.values()
    }

    /// Number of agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Number of scheduled effects.
    #[must_use]
    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Returns `true` when nothing at all is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.projectiles.is_empty() && self.effects.is_empty()
    }

    /// Live agents per team.
    #[must_use]
    pub fn tally(&self) -> TeamTally {
        let mut tally = TeamTally::default();
        for agent in self.agents.values() {
            tally.increment(agent.team);
        }
        tally
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Nearest agent of the opposing team and its squared distance.
    ///
    /// Ties go to the agent met first in registry order. Returns `None` if
    /// `id` is unknown or has no opponents.
    #[must_use]
    pub fn nearest_enemy(&self, id: EntityId) -> Option<(EntityId, f32)> {
        let me = self.agents.get(&id)?;
        let mut best: Option<(EntityId, f32)> = None;
        for other in self.agents.values() {
            if other.team == me.team {
                continue;
            }
            let d2 = me.position.distance_squared(other.position);
            if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
                best = Some((other.id, d2));
            }
        }
        best
    }

    /// First agent not on `team` within `radius` of `point`, in registry
    /// order (not the nearest one).
    #[must_use]
    pub fn first_enemy_within(&self, team: Team, point: Vec2, radius: f32) -> Option<EntityId> {
        let radius_sq = radius * radius;
        self.agents
            .values()
            .find(|a| a.team != team && a.position.distance_squared(point) <= radius_sq)
            .map(|a| a.id)
    }

    /// Agents within `radius` of `center` (inclusive), in registry order.
    #[must_use]
    pub fn agents_within(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        self.agents
            .values()
            .filter(|a| a.position.distance_squared(center) <= radius_sq)
            .map(|a| a.id)
            .collect()
    }

    /// Positions of every agent on `team`, in registry order.
    #[must_use]
    pub fn team_positions(&self, team: Team) -> Vec<Vec2> {
        self.agents
            .values()
            .filter(|a| a.team == team)
            .map(|a| a.position)
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(arena: &mut Arena, team: Team, x: f32, y: f32) -> EntityId {
        arena.spawn_agent(team, Vec2::new(x, y), 0.0, 50.0, 0.0)
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn new_arena_is_empty() {
            let arena = Arena::new();
            assert!(arena.is_empty());
            assert_eq!(arena.agent_count(), 0);
            assert_eq!(arena.tally(), TeamTally::default());
        }

        #[test]
        fn ids_are_shared_and_monotonic() {
            let mut arena = Arena::new();
            let a = spawn(&mut arena, Team::Red, 0.0, 0.0);
            let p = arena.spawn_projectile(Team::Red, Vec2::ZERO, Vec2::X, 1.0);
            let e = arena.spawn_effect(EffectKind::HitSpark, Vec2::ZERO, 1.0);
            assert!(a < p && p < e);
        }

        #[test]
        fn clear_keeps_id_counter() {
            let mut arena = Arena::new();
            let first = spawn(&mut arena, Team::Red, 0.0, 0.0);
            arena.spawn_projectile(Team::Red, Vec2::ZERO, Vec2::X, 1.0);
            arena.clear();
            assert!(arena.is_empty());
            let second = spawn(&mut arena, Team::Blue, 0.0, 0.0);
            assert!(second > first);
        }

        #[test]
        fn remove_returns_entity_once() {
            let mut arena = Arena::new();
            let id = spawn(&mut arena, Team::Red, 1.0, 2.0);
            assert_eq!(arena.remove_agent(id).map(|a| a.position), Some(Vec2::new(1.0, 2.0)));
            assert!(arena.remove_agent(id).is_none());
        }

        #[test]
        fn iteration_is_creation_order() {
            let mut arena = Arena::new();
            let ids: Vec<_> = (0..5)
                .map(|i| spawn(&mut arena, Team::ALL[i % 2], 0.0, 0.0))
                .collect();
            let seen: Vec<_> = arena.agent_ids_sorted().collect();
            assert_eq!(seen, ids);
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn tally_counts_teams() {
            let mut arena = Arena::new();
            spawn(&mut arena, Team::Red, 0.0, 0.0);
            spawn(&mut arena, Team::Red, 0.0, 0.0);
            spawn(&mut arena, Team::Blue, 0.0, 0.0);
            assert_eq!(arena.tally(), TeamTally { red: 2, blue: 1 });
        }

        #[test]
        fn nearest_enemy_ignores_allies() {
            let mut arena = Arena::new();
            let me = spawn(&mut arena, Team::Red, 0.0, 0.0);
            spawn(&mut arena, Team::Red, 1.0, 0.0);
            let far = spawn(&mut arena, Team::Blue, 100.0, 0.0);
            let near = spawn(&mut arena, Team::Blue, 0.0, 50.0);
            assert_eq!(arena.nearest_enemy(me), Some((near, 2500.0)));
            assert_eq!(arena.nearest_enemy(far).map(|(id, _)| id), Some(me));
        }

        #[test]
        fn nearest_enemy_tie_goes_to_first() {
            let mut arena = Arena::new();
            let me = spawn(&mut arena, Team::Red, 0.0, 0.0);
            let first = spawn(&mut arena, Team::Blue, 10.0, 0.0);
            spawn(&mut arena, Team::Blue, -10.0, 0.0);
            assert_eq!(arena.nearest_enemy(me).map(|(id, _)| id), Some(first));
        }

        #[test]
        fn nearest_enemy_none_without_opponents() {
            let mut arena = Arena::new();
            let me = spawn(&mut arena, Team::Red, 0.0, 0.0);
            spawn(&mut arena, Team::Red, 5.0, 0.0);
            assert!(arena.nearest_enemy(me).is_none());
            assert!(arena.nearest_enemy(EntityId::new(999)).is_none());
        }

        #[test]
        fn first_enemy_within_is_registry_order_not_nearest() {
            let mut arena = Arena::new();
            spawn(&mut arena, Team::Red, 0.0, 0.0);
            let earlier = spawn(&mut arena, Team::Blue, 10.0, 0.0);
            spawn(&mut arena, Team::Blue, 1.0, 0.0);
            assert_eq!(arena.first_enemy_within(Team::Red, Vec2::ZERO, 12.0), Some(earlier));
            assert!(arena.first_enemy_within(Team::Blue, Vec2::new(300.0, 0.0), 12.0).is_none());
        }

        #[test]
        fn agents_within_radius_is_inclusive() {
            let mut arena = Arena::new();
            let on_edge = spawn(&mut arena, Team::Red, 120.0, 0.0);
            spawn(&mut arena, Team::Blue, 121.0, 0.0);
            let inside = spawn(&mut arena, Team::Blue, 0.0, 0.0);
            assert_eq!(arena.agents_within(Vec2::ZERO, 120.0), vec![on_edge, inside]);
        }

        #[test]
        fn team_positions_filters() {
            let mut arena = Arena::new();
            spawn(&mut arena, Team::Red, 1.0, 1.0);
            spawn(&mut arena, Team::Blue, 2.0, 2.0);
            assert_eq!(arena.team_positions(Team::Blue), vec![Vec2::new(2.0, 2.0)]);
        }
    }
}
