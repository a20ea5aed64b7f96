//! The battle context and its frame loop.
//!
//! [`Battle`] owns everything one decorative battle needs: the entity
//! registry, the seeded RNG, the simulation clock, the special-event
//! counter and the rebalance timer. Each call to [`Battle::step`] runs the
//! systems in a fixed order:
//!
//! 1. **Movement**: targeting, steering, firing
//! 2. **Projectiles**: flight, expiry, collisions
//! 3. **Special events**: only from the configured level upward
//! 4. **Population**: cull, refill, rebalance
//! 5. **Effects**: remove markers whose time has come
//!
//! # Determinism
//!
//! Given the same seed, config, level, viewport and sequence of frame
//! inputs, two battles produce identical snapshots and event streams:
//! every random draw comes from one `ChaCha8Rng` and every iteration walks
//! the registry in id order.
//!
//! # Example
//!
//! ```
//! use centring_core::geometry::Viewport;
//! use centring_core::level::Level;
//! use centring_core::simulation::Battle;
//!
//! let mut battle = Battle::new(7);
//! battle.start(Level::new(2)?, Viewport::new(1280.0, 800.0), Vec::new());
//! assert_eq!(battle.tally().total(), 6);
//!
//! for _ in 0..60 {
//!     battle.step(1.0 / 60.0);
//! }
//! let events = battle.take_events();
//! assert!(!events.is_empty());
//!
//! battle.stop();
//! assert!(battle.arena().is_empty());
//! # Ok::<(), centring_core::level::LevelError>(())
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::arena::Arena;
use crate::config::{BattleConfig, ConfigError};
use crate::entity::{EntityId, TeamTally};
use crate::geometry::{Rect, Viewport};
use crate::level::Level;
use crate::output::{BattleEvent, BattleSnapshot, EventLog};
use crate::systems::population::{self, Rebalancer};
use crate::systems::special::SpecialEvents;
use crate::systems::{effects, movement, projectile, Frame};

// =============================================================================
// Frame Stats
// =============================================================================

/// What happened during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Step length actually integrated (s)
    pub dt: f32,
    /// Projectiles fired
    pub shots: usize,
    /// Projectiles that struck an agent
    pub hits: usize,
    /// Whether a special event triggered
    pub special_triggered: bool,
    /// Agents culled
    pub culled: usize,
    /// Agents spawned by refill or rebalance
    pub spawned: usize,
    /// Effects removed
    pub effects_expired: usize,
}

// =============================================================================
// Battle
// =============================================================================

/// One decorative battle and everything it owns.
#[derive(Debug, Clone)]
pub struct Battle {
    config: BattleConfig,
    seed: u64,
    rng: ChaCha8Rng,
    arena: Arena,
    events: EventLog,
    special: SpecialEvents,
    rebalancer: Rebalancer,
    level: Level,
    viewport: Viewport,
    forbidden: Vec<Rect>,
    target: usize,
    /// Simulation clock in seconds since `start`.
    clock: f64,
    /// Host timestamp of the previous [`Battle::frame`] call.
    last_timestamp_ms: Option<f64>,
    frames: u64,
    running: bool,
}

impl Battle {
    /// Creates an idle battle with the default config.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::build(BattleConfig::default(), seed)
    }

    /// Creates an idle battle with a custom config.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by
    /// [`BattleConfig::validate`].
    pub fn with_config(config: BattleConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    fn build(config: BattleConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            arena: Arena::new(),
            events: EventLog::new(),
            special: SpecialEvents::new(),
            rebalancer: Rebalancer::new(),
            level: Level::FIRST,
            viewport: Viewport::default(),
            forbidden: Vec::new(),
            target: 0,
            clock: 0.0,
            last_timestamp_ms: None,
            frames: 0,
            running: false,
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Tears down any previous battle and enters `level`.
    ///
    /// Below the population controller's first level the battle stays idle.
    /// Otherwise the registry is seeded and topped up to the level's target
    /// count immediately.
    pub fn start(&mut self, level: Level, viewport: Viewport, forbidden: Vec<Rect>) {
        self.stop();
        self.level = level;
        self.viewport = viewport;
        self.forbidden = forbidden;

        if level.get() < self.config.population.min_level {
            info!(%level, "no battle on this level");
            return;
        }

        self.target = population::target_count(level, &self.config.population);
        self.running = true;
        let mut frame = Frame {
            arena: &mut self.arena,
            events: &mut self.events,
            rng: &mut self.rng,
            config: &self.config,
            viewport: self.viewport,
            forbidden: &self.forbidden,
            level: self.level,
            now: self.clock,
            dt: 0.0,
        };
        let spawned = population::seed(&mut frame, self.target);
        info!(
            %level,
            target = self.target,
            spawned,
            width = viewport.width,
            height = viewport.height,
            "battle started"
        );
    }

    /// Clears agents, projectiles, effects, counters and pending events.
    ///
    /// Safe to call any number of times. Frame calls after a stop are
    /// no-ops until the next [`Battle::start`].
    pub fn stop(&mut self) {
        let was_running = self.running;
        self.running = false;
        self.arena.clear();
        self.events.clear();
        self.special.reset();
        self.rebalancer.reset();
        self.target = 0;
        self.clock = 0.0;
        self.last_timestamp_ms = None;
        self.frames = 0;
        if was_running {
            info!(level = %self.level, "battle stopped");
        }
    }

    /// Updates the viewport, e.g. after a window resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Replaces the rectangles that spawn placement must avoid.
    pub fn set_forbidden(&mut self, forbidden: Vec<Rect>) {
        self.forbidden = forbidden;
    }

    // -------------------------------------------------------------------------
    // Frame loop
    // -------------------------------------------------------------------------

    /// Advances by the time elapsed since the previous call.
    ///
    /// `timestamp_ms` is the host's frame timestamp in milliseconds. The
    /// first call after [`Battle::start`] integrates a zero-length step.
    pub fn frame(&mut self, timestamp_ms: f64) -> FrameStats {
        if !self.running {
            return FrameStats::default();
        }
        let dt = match self.last_timestamp_ms.replace(timestamp_ms) {
            #[allow(clippy::cast_possible_truncation)]
            Some(last) => ((timestamp_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.step(dt)
    }

    /// Advances by `dt` seconds, clamped to `[0, max_frame_dt]`.
    pub fn step(&mut self, dt: f32) -> FrameStats {
        if !self.running {
            return FrameStats::default();
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_frame_dt)
        } else {
            0.0
        };
        self.clock += f64::from(dt);
        self.frames += 1;

        let mut frame = Frame {
            arena: &mut self.arena,
            events: &mut self.events,
            rng: &mut self.rng,
            config: &self.config,
            viewport: self.viewport,
            forbidden: &self.forbidden,
            level: self.level,
            now: self.clock,
            dt,
        };

        let shots = movement::run(&mut frame);
        let hits = projectile::run(&mut frame);
        let special_triggered = self.special.run(&mut frame).is_some();
        let culled = population::cull(&mut frame);
        let spawned = population::refill(&mut frame, self.target)
            + self.rebalancer.run(&mut frame, self.target);
        let effects_expired = effects::run(&mut frame, &mut self.special);

        trace!(
            frame = self.frames,
            dt,
            agents = self.arena.agent_count(),
            projectiles = self.arena.projectile_count(),
            effects = self.arena.effect_count(),
            "frame stepped"
        );

        FrameStats {
            dt,
            shots,
            hits,
            special_triggered,
            culled,
            spawned,
            effects_expired,
        }
    }

    /// Attempts a special event right now, bypassing the level gate and the
    /// per-frame roll order but not the concurrency limit or cooldown.
    ///
    /// Agents killed by the event are culled before this returns, so no
    /// agent enters the next step with health at or below zero.
    ///
    /// Returns the new effect's id, or `None` if nothing triggered.
    pub fn try_trigger_special(&mut self) -> Option<EntityId> {
        if !self.running {
            return None;
        }
        let mut frame = Frame {
            arena: &mut self.arena,
            events: &mut self.events,
            rng: &mut self.rng,
            config: &self.config,
            viewport: self.viewport,
            forbidden: &self.forbidden,
            level: self.level,
            now: self.clock,
            dt: 0.0,
        };
        let effect = self.special.try_trigger(&mut frame);
        if effect.is_some() {
            population::cull(&mut frame);
        }
        effect
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    /// Drains the lifecycle events produced since the last drain.
    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        self.events.take()
    }

    /// Undrained events, oldest first.
    #[must_use]
    pub fn pending_events(&self) -> &[BattleEvent] {
        self.events.as_slice()
    }

    /// Copies everything a renderer needs for the current frame.
    #[must_use]
    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            clock: self.clock,
            running: self.running,
            tally: self.arena.tally(),
            agents: self.arena.agents_sorted().cloned().collect(),
            projectiles: self.arena.projectiles_sorted().cloned().collect(),
            effects: self.arena.effects_sorted().cloned().collect(),
        }
    }

    /// Live agents per team.
    #[must_use]
    pub fn tally(&self) -> TeamTally {
        self.arena.tally()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The entity registry.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable access to the entity registry.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Seed the RNG was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Level of the current (or last) battle.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Current viewport.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Agent count the population controller maintains.
    #[must_use]
    pub const fn target_count(&self) -> usize {
        self.target
    }

    /// Simulation clock in seconds since the battle started.
    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    /// Steps taken since the battle started.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Returns `true` between [`Battle::start`] on a battle level and
    /// [`Battle::stop`].
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Special events currently holding a concurrency slot.
    #[must_use]
    pub const fn special_active(&self) -> u32 {
        self.special.active()
    }
}

// =============================================================================
// Tests
// =============================================================================
