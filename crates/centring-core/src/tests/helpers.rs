//! Test helper functions for setting up battles and system frames.
//!
//! [`TestBench`] owns every piece of state a [`Frame`] borrows so system
//! tests can drive one `run` function at a time. The free functions build
//! whole [`Battle`]s for scenario tests.

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::arena::Arena;
use crate::config::BattleConfig;
use crate::entity::{EntityId, Team};
use crate::geometry::{Rect, Viewport};
use crate::level::Level;
use crate::output::{BattleEvent, EventLog, RemovalReason};
use crate::simulation::Battle;
use crate::systems::Frame;

/// Seed used by tests that do not care about the exact random stream.
pub const TEST_SEED: u64 = 42;

/// Standard frame length used by scenario tests.
pub const TEST_DT: f32 = 0.05;

// =============================================================================
// System Bench
// =============================================================================

/// Owned battle state for exercising individual systems.
pub struct TestBench {
    pub arena: Arena,
    pub events: EventLog,
    pub rng: ChaCha8Rng,
    pub config: BattleConfig,
    pub viewport: Viewport,
    pub forbidden: Vec<Rect>,
    pub level: Level,
    /// Clock after the most recent [`TestBench::frame`] call.
    pub now: f64,
}

impl TestBench {
    /// A 1280x800 bench on level 2 with default config.
    pub fn new() -> Self {
        Self::at_level(2)
    }

    /// A 1280x800 bench on the given level.
    pub fn at_level(level: u8) -> Self {
        Self {
            arena: Arena::new(),
            events: EventLog::new(),
            rng: ChaCha8Rng::seed_from_u64(TEST_SEED),
            config: BattleConfig::default(),
            viewport: Viewport::new(1280.0, 800.0),
            forbidden: Vec::new(),
            level: Level::new(level).expect("test level in range"),
            now: 0.0,
        }
    }

    /// Spawns an agent facing +X at 50 px/s that will not fire for 5 s.
    pub fn agent(&mut self, team: Team, x: f32, y: f32) -> EntityId {
        self.arena.spawn_agent(team, Vec2::new(x, y), 0.0, 50.0, 5.0)
    }

    /// Spawns a projectile with the configured lifetime.
    pub fn projectile(&mut self, team: Team, x: f32, y: f32, velocity: Vec2) -> EntityId {
        let ttl = self.config.projectile.lifetime;
        self.arena.spawn_projectile(team, Vec2::new(x, y), velocity, ttl)
    }

    /// Advances the clock by `dt` and borrows a frame over the bench.
    pub fn frame(&mut self, dt: f32) -> Frame<'_> {
        self.now += f64::from(dt);
        Frame {
            arena: &mut self.arena,
            events: &mut self.events,
            rng: &mut self.rng,
            config: &self.config,
            viewport: self.viewport,
            forbidden: &self.forbidden,
            level: self.level,
            now: self.now,
            dt,
        }
    }
}

// =============================================================================
// Battle Setup
// =============================================================================

/// A 1280x800 viewport.
pub fn test_viewport() -> Viewport {
    Viewport::new(1280.0, 800.0)
}

/// Creates and starts a default-config battle on `level`.
pub fn started_battle(level: u8, seed: u64) -> Battle {
    started_battle_with(BattleConfig::default(), level, seed)
}

/// Creates and starts a battle with a custom config.
pub fn started_battle_with(config: BattleConfig, level: u8, seed: u64) -> Battle {
    let mut battle = Battle::with_config(config, seed).expect("valid test config");
    battle.start(
        Level::new(level).expect("test level in range"),
        test_viewport(),
        Vec::new(),
    );
    battle
}

/// Config with no shooting and no special events, so nobody takes damage.
pub fn peaceful_config() -> BattleConfig {
    let mut config = BattleConfig::default();
    config.movement.fire_range = 0.0;
    config.special.trigger_probability = 0.0;
    config
}

/// Config whose population target is zero on every level.
pub fn empty_population_config() -> BattleConfig {
    let mut config = BattleConfig::default();
    config.population.base_count = 0;
    config.population.per_level = 0;
    config
}

/// Steps the battle `frames` times with [`TEST_DT`].
pub fn run_frames(battle: &mut Battle, frames: usize) {
    for _ in 0..frames {
        battle.step(TEST_DT);
    }
}

// =============================================================================
// Event Queries
// =============================================================================

/// Every `(projectile, reason)` removal in `events`.
pub fn removals(events: &[BattleEvent]) -> Vec<(EntityId, RemovalReason)> {
    events
        .iter()
        .filter_map(|e| match e {
            BattleEvent::ProjectileRemoved { id, reason, .. } => Some((*id, *reason)),
            _ => None,
        })
        .collect()
}

/// Ids of every agent removed in `events`.
pub fn removed_agents(events: &[BattleEvent]) -> Vec<EntityId> {
    events
        .iter()
        .filter_map(|e| match e {
            BattleEvent::AgentRemoved { id, .. } => Some(*id),
            _ => None,
        })
        .collect()
}

/// Health of every live agent, keyed by id in registry order.
pub fn health_by_id(battle: &Battle) -> Vec<(EntityId, i32)> {
    battle.arena().agents_sorted().map(|a| (a.id, a.health)).collect()
}
