//! End-to-end scenarios driven through [`Battle`].

use std::collections::BTreeMap;

use glam::Vec2;

use super::helpers::*;
use crate::entity::{EntityId, Team};
use crate::output::{BattleEvent, DamageSource, RemovalReason};
use crate::simulation::Battle;

// =============================================================================
// Combat invariants
// =============================================================================

#[test]
fn health_never_increases_and_dead_agents_are_culled() {
    let mut battle = started_battle(5, 17);
    let mut previous: BTreeMap<EntityId, i32> = health_by_id(&battle).into_iter().collect();

    for _ in 0..400 {
        battle.step(TEST_DT);
        assert!(battle.arena().agents_sorted().all(|a| a.is_alive()));

        let current: BTreeMap<EntityId, i32> = health_by_id(&battle).into_iter().collect();
        for (id, health) in &current {
            if let Some(before) = previous.get(id) {
                assert!(health <= before, "agent {id} healed from {before} to {health}");
            }
        }
        previous = current;
    }
}

#[test]
fn every_projectile_leaves_once_and_spares_its_team() {
    let mut battle = started_battle(5, 23);
    let mut events = battle.take_events();
    for _ in 0..400 {
        battle.step(TEST_DT);
        events.extend(battle.take_events());
    }

    let mut agent_team = BTreeMap::new();
    let mut projectile_team = BTreeMap::new();
    for event in &events {
        match event {
            BattleEvent::AgentSpawned { id, team, .. } => {
                agent_team.insert(*id, *team);
            }
            BattleEvent::ProjectileFired { id, team, .. } => {
                projectile_team.insert(*id, *team);
            }
            _ => {}
        }
    }
    assert!(!projectile_team.is_empty(), "nobody fired in 20 s");

    let mut removed = BTreeMap::new();
    for (id, reason) in removals(&events) {
        assert!(projectile_team.contains_key(&id));
        assert!(removed.insert(id, reason).is_none(), "projectile {id} removed twice");
    }
    for id in projectile_team.keys() {
        let alive = battle.arena().projectile(*id).is_some();
        assert!(alive != removed.contains_key(id), "projectile {id} lost or duplicated");
    }

    for event in &events {
        if let BattleEvent::AgentDamaged {
            id,
            source: DamageSource::Projectile(pid),
            ..
        } = event
        {
            assert_ne!(agent_team[id], projectile_team[pid]);
        }
    }
    for (id, reason) in &removed {
        if let RemovalReason::Hit { target } = reason {
            assert_ne!(agent_team[target], projectile_team[id]);
        }
    }
}

// =============================================================================
// Population
// =============================================================================

#[test]
fn peaceful_battles_hold_their_target() {
    for level in 2..=8 {
        let mut battle = started_battle_with(peaceful_config(), level, 5);
        let target = battle.target_count();
        assert_eq!(battle.tally().total(), target);

        run_frames(&mut battle, 40);
        let tally = battle.tally();
        assert_eq!(tally.total(), target, "level {level}");
        assert!(tally.red > 0 && tally.blue > 0, "level {level}");
        assert!(removed_agents(battle.pending_events()).is_empty());
    }
}

#[test]
fn six_agents_split_evenly() {
    let battle = started_battle_with(peaceful_config(), 2, 8);
    let tally = battle.tally();
    assert_eq!(tally.total(), 6);
    assert!(tally.red.abs_diff(tally.blue) <= 1);
    assert!((2..=4).contains(&tally.red));
}

#[test]
fn wiped_team_is_rebalanced_away_from_enemies() {
    let mut config = peaceful_config();
    config.population.base_count = 4;
    let mut battle = started_battle_with(config, 2, 31);
    assert_eq!(battle.target_count(), 4);

    let blues: Vec<EntityId> = battle
        .arena()
        .agents_sorted()
        .filter(|a| a.team == Team::Blue)
        .map(|a| a.id)
        .collect();
    for id in blues {
        battle.arena_mut().remove_agent(id);
    }
    battle
        .arena_mut()
        .spawn_agent(Team::Red, Vec2::new(200.0, 300.0), 0.0, 50.0, 5.0);
    battle
        .arena_mut()
        .spawn_agent(Team::Red, Vec2::new(1000.0, 500.0), 0.0, 50.0, 5.0);
    assert_eq!(battle.tally().red, 4);
    assert_eq!(battle.tally().blue, 0);
    battle.take_events();

    let mut spawned = Vec::new();
    for _ in 0..20 {
        let stats = battle.step(TEST_DT);
        if stats.spawned > 0 {
            spawned = battle.take_events();
            break;
        }
        assert_eq!(battle.tally().blue, 0);
    }
    assert!(battle.clock() >= 0.6, "rebalanced early at {}", battle.clock());

    let newcomers: Vec<Vec2> = spawned
        .iter()
        .filter_map(|e| match e {
            BattleEvent::AgentSpawned { team: Team::Blue, position, .. } => Some(*position),
            _ => None,
        })
        .collect();
    assert!((3..=5).contains(&newcomers.len()));
    assert_eq!(battle.tally().blue, newcomers.len());
    // Rebalancing does not trim the other side back to the target.
    assert!(battle.tally().total() > battle.target_count());

    let reds = battle.arena().team_positions(Team::Red);
    for blue in &newcomers {
        for red in &reds {
            assert!(blue.distance(*red) >= 120.0, "{blue} spawned {} px from {red}", blue.distance(*red));
        }
    }
}

#[test]
fn projectile_expires_after_its_lifetime() {
    let mut battle = started_battle_with(empty_population_config(), 2, 1);
    assert!(battle.is_running());
    assert_eq!(battle.target_count(), 0);

    let bystander = battle
        .arena_mut()
        .spawn_agent(Team::Blue, Vec2::new(100.0, 100.0), 0.0, 50.0, 5.0);
    let shot = battle
        .arena_mut()
        .spawn_projectile(Team::Red, Vec2::new(640.0, 400.0), Vec2::new(10.0, 0.0), 1.6);

    run_frames(&mut battle, 31);
    assert!(battle.arena().projectile(shot).is_some());
    assert!(removals(battle.pending_events()).is_empty());

    battle.step(TEST_DT);
    assert!(battle.arena().projectile(shot).is_none());
    assert_eq!(removals(&battle.take_events()), vec![(shot, RemovalReason::Expired)]);
    assert_eq!(battle.arena().agent(bystander).map(|a| a.health), Some(3));
}

// =============================================================================
// Special events
// =============================================================================

#[test]
fn one_special_event_at_a_time() {
    let mut config = peaceful_config();
    config.special.trigger_probability = 1.0;
    config.special.cooldown = 0.0;
    let mut battle = started_battle_with(config, 3, 12);

    let first = battle.step(TEST_DT);
    assert!(first.special_triggered);
    assert_eq!(battle.special_active(), 1);
    assert!(battle.try_trigger_special().is_none());

    let mut triggers = 1;
    for _ in 0..60 {
        let stats = battle.step(TEST_DT);
        assert!(battle.special_active() <= 1);
        if stats.special_triggered {
            triggers += 1;
        }
    }
    // Bursts last 0.55 s and beams 0.42 s, so 3 s leaves room for several.
    assert!(triggers >= 3, "only {triggers} triggers");
}

#[test]
fn special_events_stay_off_on_level_two() {
    let mut config = peaceful_config();
    config.special.trigger_probability = 1.0;
    config.special.cooldown = 0.0;
    let mut battle = started_battle_with(config, 2, 12);
    for _ in 0..40 {
        assert!(!battle.step(TEST_DT).special_triggered);
    }
    assert_eq!(battle.special_active(), 0);
}

// =============================================================================
// Teardown
// =============================================================================

#[test]
fn teardown_twice_leaves_nothing_behind() {
    let mut battle = started_battle(6, 77);
    run_frames(&mut battle, 100);
    assert!(battle.arena().agent_count() > 0);

    battle.stop();
    let after_first = battle.snapshot();
    battle.stop();
    assert_eq!(battle.snapshot(), after_first);
    assert!(!after_first.running);
    assert!(after_first.agents.is_empty());
    assert!(after_first.projectiles.is_empty());
    assert!(after_first.effects.is_empty());
    assert_eq!(battle.special_active(), 0);

    run_frames(&mut battle, 10);
    assert!(battle.arena().is_empty());
}

#[test]
fn idle_battle_ignores_special_requests() {
    let mut battle = Battle::new(3);
    assert!(battle.try_trigger_special().is_none());
    assert!(battle.take_events().is_empty());
}
