//! Targeting, steering and firing.
//!
//! Agents are processed in registry order and each one sees the positions
//! already written by agents earlier in the same step.

use crate::entity::{AgentFlags, EntityId, Team};
use crate::geometry::normalize_angle;
use crate::output::BattleEvent;

use super::Frame;
use glam::Vec2;

/// A shot decided during steering, spawned once the agent borrow ends.
struct Shot {
    shooter: EntityId,
    team: Team,
    position: Vec2,
    heading: f32,
}

/// Runs one movement step for every agent. Returns the number of shots fired.
pub fn run(frame: &mut Frame<'_>) -> usize {
    let config = frame.config;
    let m = &config.movement;
    let dt = frame.dt;
    let ids: Vec<EntityId> = frame.arena.agent_ids_sorted().collect();
    let mut shots = 0;

    for id in ids {
        let Some((target_id, dist_sq)) = frame.arena.nearest_enemy(id) else {
            // No opponents: hold position, heading and cooldown.
            if let Some(agent) = frame.arena.agent_mut(id) {
                agent.flags.remove(AgentFlags::ENGAGED | AgentFlags::RETREATING);
            }
            continue;
        };
        let Some(target_pos) = frame.arena.agent(target_id).map(|t| t.position) else {
            continue;
        };
        let Some(agent) = frame.arena.agent_mut(id) else {
            continue;
        };

        agent.target = Some(target_id);

        let to_target = target_pos - agent.position;
        let desired = to_target.y.atan2(to_target.x);
        let max_turn = m.turn_rate * dt;
        let delta = normalize_angle(desired - agent.heading).clamp(-max_turn, max_turn);
        agent.heading = normalize_angle(agent.heading + delta);

        let dist = dist_sq.sqrt();
        let throttle = if dist > m.standoff_distance {
            1.0
        } else if dist < m.standoff_distance * m.retreat_ratio {
            -m.retreat_speed_factor
        } else {
            0.0
        };
        let forward = agent.forward();
        agent.position = frame
            .viewport
            .clamp_inset(agent.position + forward * agent.speed * throttle * dt, m.edge_margin);

        agent.flags.insert(AgentFlags::ENGAGED);
        agent.flags.set(AgentFlags::RETREATING, throttle < 0.0);

        agent.fire_cooldown -= dt;
        let shot = if agent.fire_cooldown <= 0.0 && dist < m.fire_range {
            agent.fire_cooldown = m.fire_cooldown.sample(frame.rng);
            Some(Shot {
                shooter: agent.id,
                team: agent.team,
                position: agent.position + forward * config.projectile.muzzle_offset,
                heading: agent.heading,
            })
        } else {
            None
        };

        if let Some(shot) = shot {
            fire(frame, &shot);
            shots += 1;
        }
    }

    shots
}

fn fire(frame: &mut Frame<'_>, shot: &Shot) {
    let p = &frame.config.projectile;
    let velocity = Vec2::from_angle(shot.heading) * p.speed;
    let id = frame
        .arena
        .spawn_projectile(shot.team, shot.position, velocity, p.lifetime);
    frame.events.push(BattleEvent::ProjectileFired {
        id,
        shooter: shot.shooter,
        team: shot.team,
        position: shot.position,
        heading: shot.heading,
    });
}
