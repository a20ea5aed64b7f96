//! Projectile flight, expiry and collision.
//!
//! Every projectile leaves through exactly one [`RemovalReason`]. Expiry is
//! checked first, then bounds, then collisions. Collision picks the first
//! opposing agent in registry order within the hit radius, not the nearest.

use glam::Vec2;

use crate::entity::{EffectKind, EntityId};
use crate::output::{BattleEvent, DamageSource, RemovalReason};

use super::{Frame, TIME_EPSILON};

/// Advances all projectiles one step. Returns the number of hits.
pub fn run(frame: &mut Frame<'_>) -> usize {
    let config = frame.config;
    let p = &config.projectile;
    let ids: Vec<EntityId> = frame.arena.projectile_ids_sorted().collect();
    let mut hits = 0;

    for id in ids {
        let Some(projectile) = frame.arena.projectile_mut(id) else {
            continue;
        };
        projectile.position += projectile.velocity * frame.dt;
        projectile.ttl -= frame.dt;
        let (team, position) = (projectile.team, projectile.position);

        let leaving = if projectile.ttl <= TIME_EPSILON {
            Some(RemovalReason::Expired)
        } else if !frame.viewport.contains_with_margin(position, p.bounds_margin) {
            Some(RemovalReason::OutOfBounds)
        } else {
            None
        };
        if let Some(reason) = leaving {
            remove(frame, id, position, reason);
            continue;
        }

        let Some(target) = frame.arena.first_enemy_within(team, position, p.hit_radius) else {
            continue;
        };
        if let Some(agent) = frame.arena.agent_mut(target) {
            let health = agent.apply_damage(p.damage);
            let spark_at = agent.position;
            frame.events.push(BattleEvent::AgentDamaged {
                id: target,
                amount: p.damage,
                health,
                source: DamageSource::Projectile(id),
            });
            let expires_at = frame.now + f64::from(p.hit_marker_duration);
            let spark = frame.arena.spawn_effect(EffectKind::HitSpark, spark_at, expires_at);
            if let Some(effect) = frame.arena.effect(spark) {
                frame.events.push(BattleEvent::effect_started(effect));
            }
        }
        remove(frame, id, position, RemovalReason::Hit { target });
        hits += 1;
    }

    hits
}

fn remove(frame: &mut Frame<'_>, id: EntityId, position: Vec2, reason: RemovalReason) {
    if frame.arena.remove_projectile(id).is_some() {
        frame.events.push(BattleEvent::ProjectileRemoved { id, position, reason });
    }
}
