//! Population control: seeding, culling, refilling and rebalancing.
//!
//! New agents always join the team with fewer members (red on ties), and are
//! placed by bounded random search. Placement never fails: when the search
//! runs out of attempts it settles for a fallback position.

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::config::{PopulationConfig, SpawnConfig};
use crate::entity::{EffectKind, EntityId, Team};
use crate::geometry::{overlaps_any, Rect, Viewport};
use crate::level::Level;
use crate::output::BattleEvent;

use super::Frame;

// =============================================================================
// Pure rules
// =============================================================================

/// Number of agents the population controller maintains on `level`.
///
/// Zero below `min_level`, then `base_count + per_level` for each level
/// above it, capped at `max_count`.
///
/// ```
/// use centring_core::config::PopulationConfig;
/// use centring_core::level::Level;
/// use centring_core::systems::population::target_count;
///
/// let config = PopulationConfig::default();
/// assert_eq!(target_count(Level::FIRST, &config), 0);
/// assert_eq!(target_count(Level::new(2)?, &config), 6);
/// assert_eq!(target_count(Level::new(8)?, &config), 36);
/// # Ok::<(), centring_core::level::LevelError>(())
/// ```
#[must_use]
pub fn target_count(level: Level, config: &PopulationConfig) -> usize {
    let level = level.get();
    if level < config.min_level {
        return 0;
    }
    let above = usize::from(level - config.min_level);
    above
        .saturating_mul(config.per_level)
        .saturating_add(config.base_count)
        .min(config.max_count)
}

/// Size of one rebalance batch for a given target count.
#[must_use]
pub fn rebalance_batch(target: usize, config: &PopulationConfig) -> usize {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = (target as f32 * config.rebalance_fraction).floor() as usize;
    scaled.clamp(config.rebalance_min, config.rebalance_max)
}

/// Draws spawn positions until one keeps its clearance box off every
/// forbidden rectangle.
///
/// After `attempts` rejected draws the last candidate is returned anyway.
pub fn random_safe_position<R: Rng>(
    rng: &mut R,
    viewport: Viewport,
    forbidden: &[Rect],
    spawn: &SpawnConfig,
    attempts: u32,
) -> Vec2 {
    let mut candidate = viewport.center();
    for _ in 0..attempts.max(1) {
        let fx = spawn.x_band.sample(rng);
        let fy = spawn.y_band.sample(rng);
        candidate = viewport.at_fraction(fx, fy);
        if !overlaps_any(&Rect::around(candidate, spawn.ui_clearance), forbidden) {
            break;
        }
    }
    candidate
}

/// Like [`random_safe_position`], but also keeps at least `min_distance`
/// from every point in `enemies`.
///
/// When no candidate satisfies the distance within `attempts` tries, the
/// candidate with the largest minimum enemy distance is returned.
pub fn position_away_from<R: Rng>(
    rng: &mut R,
    viewport: Viewport,
    forbidden: &[Rect],
    spawn: &SpawnConfig,
    enemies: &[Vec2],
    min_distance: f32,
    attempts: u32,
) -> Vec2 {
    let min_sq = min_distance * min_distance;
    let mut best = (viewport.center(), f32::NEG_INFINITY);
    for _ in 0..attempts.max(1) {
        let candidate = random_safe_position(rng, viewport, forbidden, spawn, attempts);
        let nearest_sq = enemies
            .iter()
            .map(|e| e.distance_squared(candidate))
            .fold(f32::INFINITY, f32::min);
        if nearest_sq >= min_sq {
            return candidate;
        }
        if nearest_sq > best.1 {
            best = (candidate, nearest_sq);
        }
    }
    best.0
}

// =============================================================================
// Frame operations
// =============================================================================

/// Creates one agent with randomised heading, speed and initial cooldown.
pub fn spawn_agent(frame: &mut Frame<'_>, team: Team, position: Vec2) -> EntityId {
    let config = frame.config;
    let spawn = &config.spawn;
    let heading = frame.rng.gen_range(0.0..std::f32::consts::TAU);
    let speed = spawn.speed.sample(frame.rng);
    let cooldown = spawn.initial_cooldown.sample(frame.rng);
    let id = frame
        .arena
        .spawn_agent(team, position, heading, speed, cooldown);
    if let Some(agent) = frame.arena.agent(id) {
        frame.events.push(BattleEvent::agent_spawned(agent));
    }
    id
}

fn spawn_balanced(frame: &mut Frame<'_>) -> EntityId {
    let team = frame.arena.tally().smaller_team();
    let position = random_safe_position(
        frame.rng,
        frame.viewport,
        frame.forbidden,
        &frame.config.spawn,
        frame.config.population.placement_attempts,
    );
    spawn_agent(frame, team, position)
}

/// Populates a freshly entered level.
///
/// An empty registry with a target of two or more is seeded with one red
/// and one blue agent; the rest are added by [`refill`].
pub fn seed(frame: &mut Frame<'_>, target: usize) -> usize {
    let mut spawned = 0;
    if frame.arena.agent_count() == 0 && target >= 2 {
        for team in Team::ALL {
            let position = random_safe_position(
                frame.rng,
                frame.viewport,
                frame.forbidden,
                &frame.config.spawn,
                frame.config.population.placement_attempts,
            );
            spawn_agent(frame, team, position);
            spawned += 1;
        }
    }
    spawned + refill(frame, target)
}

/// Tops the registry up to `target`, balancing teams.
pub fn refill(frame: &mut Frame<'_>, target: usize) -> usize {
    let missing = target.saturating_sub(frame.arena.agent_count());
    for _ in 0..missing {
        spawn_balanced(frame);
    }
    missing
}

/// Removes every agent whose health reached zero, leaving a death fade in
/// its place. Returns the number removed.
pub fn cull(frame: &mut Frame<'_>) -> usize {
    let dead: Vec<EntityId> = frame
        .arena
        .agents_sorted()
        .filter(|a| !a.is_alive())
        .map(|a| a.id)
        .collect();
    let expires_at = frame.now + f64::from(frame.config.population.death_fade_duration);

    for &id in &dead {
        let Some(agent) = frame.arena.remove_agent(id) else {
            continue;
        };
        frame.events.push(BattleEvent::AgentRemoved {
            id,
            team: agent.team,
            position: agent.position,
        });
        let fade = frame.arena.spawn_effect(
            EffectKind::DeathFade {
                team: agent.team,
                heading: agent.heading,
            },
            agent.position,
            expires_at,
        );
        if let Some(effect) = frame.arena.effect(fade) {
            frame.events.push(BattleEvent::effect_started(effect));
        }
    }

    if !dead.is_empty() {
        debug!(culled = dead.len(), remaining = frame.arena.agent_count(), "culled agents");
    }
    dead.len()
}

/// Tracks team wipes and respawns the missing side after a delay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rebalancer {
    wiped_since: Option<(Team, f64)>,
}

impl Rebalancer {
    /// Creates a tracker with no wipe observed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The wiped team and the clock time it was first seen empty.
    #[must_use]
    pub const fn pending(&self) -> Option<(Team, f64)> {
        self.wiped_since
    }

    /// Forgets any observed wipe.
    pub fn reset(&mut self) {
        self.wiped_since = None;
    }

    /// Checks the tally and spawns a batch once a wipe has lasted the
    /// rebalance cooldown. Returns the number of agents spawned.
    pub fn run(&mut self, frame: &mut Frame<'_>, target: usize) -> usize {
        let config = frame.config;
        let pop = &config.population;
        let wiped = if target >= 2 {
            frame.arena.tally().wiped_team()
        } else {
            None
        };
        let Some(team) = wiped else {
            self.wiped_since = None;
            return 0;
        };

        let since = match self.wiped_since {
            Some((seen, since)) if seen == team => since,
            _ => {
                self.wiped_since = Some((team, frame.now));
                frame.now
            }
        };
        if frame.now - since < f64::from(pop.rebalance_cooldown) {
            return 0;
        }

        self.wiped_since = None;
        let batch = rebalance_batch(target, pop);
        let enemies = frame.arena.team_positions(team.opponent());
        for _ in 0..batch {
            let position = position_away_from(
                frame.rng,
                frame.viewport,
                frame.forbidden,
                &config.spawn,
                &enemies,
                pop.min_enemy_distance,
                pop.placement_attempts,
            );
            spawn_agent(frame, team, position);
        }
        debug!(%team, batch, opponents = enemies.len(), "rebalanced wiped team");
        batch
    }
}
