//! Tuning parameters for the battle layer.
//!
//! Every constant the systems use lives in [`BattleConfig`]. The defaults
//! reproduce the shipped game; a JSON document may override any subset of
//! fields:
//!
//! ```
//! use centring_core::config::BattleConfig;
//!
//! let config = BattleConfig::from_json(r#"{ "movement": { "standoff_distance": 90.0 } }"#)?;
//! assert_eq!(config.movement.standoff_distance, 90.0);
//! assert_eq!(config.projectile.speed, 360.0);
//! # Ok::<(), centring_core::config::ConfigError>(())
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or validating a [`BattleConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the schema.
    #[error("failed to parse battle config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value that must be strictly positive is not.
    #[error("`{field}` must be finite and positive, got {value}")]
    NotPositive {
        /// Dotted field path
        field: &'static str,
        /// Offending value
        value: f32,
    },
    /// A value that must be zero or more is not.
    #[error("`{field}` must be finite and non-negative, got {value}")]
    Negative {
        /// Dotted field path
        field: &'static str,
        /// Offending value
        value: f32,
    },
    /// A probability lies outside `[0, 1]`.
    #[error("`{field}` must be a probability in [0, 1], got {value}")]
    Probability {
        /// Dotted field path
        field: &'static str,
        /// Offending value
        value: f32,
    },
    /// A `min..max` range has `min > max` or a fractional range leaves `[0, 1]`.
    #[error("`{field}` range {min}..{max} is invalid")]
    InvalidRange {
        /// Dotted field path
        field: &'static str,
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },
    /// An integer count or bound is inconsistent.
    #[error("`{field}` is invalid: {reason}")]
    InvalidCount {
        /// Dotted field path
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// A closed-open `min..max` interval of floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    /// Lower bound (inclusive)
    pub min: f32,
    /// Upper bound (exclusive unless equal to `min`)
    pub max: f32,
}

impl FloatRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draws a uniform sample; a zero-width range returns `min`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    /// Returns `true` when `value` lies in `[min, max]`.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn validate_fraction(&self, field: &'static str) -> Result<(), ConfigError> {
        self.validate(field)?;
        if self.min < 0.0 || self.max > 1.0 {
            return Err(ConfigError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Steering, standoff and firing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Maximum turn rate in rad/s
    pub turn_rate: f32,
    /// Preferred distance to the current target in px
    pub standoff_distance: f32,
    /// Fraction of the standoff distance below which agents back off
    pub retreat_ratio: f32,
    /// Speed multiplier while backing off
    pub retreat_speed_factor: f32,
    /// Agents are kept this far inside the viewport edges (px)
    pub edge_margin: f32,
    /// Agents only fire at targets closer than this (px)
    pub fire_range: f32,
    /// Cooldown drawn after each shot (s)
    pub fire_cooldown: FloatRange,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            turn_rate: 3.0,
            standoff_distance: 120.0,
            retreat_ratio: 0.7,
            retreat_speed_factor: 0.5,
            edge_margin: 20.0,
            fire_range: 420.0,
            fire_cooldown: FloatRange::new(0.4, 1.0),
        }
    }
}

/// Projectile flight and collision parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Muzzle speed in px/s
    pub speed: f32,
    /// Time to live in seconds
    pub lifetime: f32,
    /// Distance ahead of the shooter where the projectile appears (px)
    pub muzzle_offset: f32,
    /// Projectiles further than this outside the viewport are dropped (px)
    pub bounds_margin: f32,
    /// Collision radius around agents (px)
    pub hit_radius: f32,
    /// Health removed per hit
    pub damage: i32,
    /// Lifetime of the hit marker (s)
    pub hit_marker_duration: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 360.0,
            lifetime: 1.6,
            muzzle_offset: 10.0,
            bounds_margin: 20.0,
            hit_radius: 12.0,
            damage: 1,
            hit_marker_duration: 0.25,
        }
    }
}

/// Area burst and line beam parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialConfig {
    /// First level on which special events run
    pub min_level: u8,
    /// Seconds between triggers
    pub cooldown: f32,
    /// Per-frame trigger chance once the cooldown has elapsed
    pub trigger_probability: f32,
    /// Chance that a trigger is a burst rather than a beam
    pub burst_probability: f32,
    /// Maximum number of special events alive at once
    pub max_concurrent: u32,
    /// Horizontal placement band as fractions of the width
    pub x_band: FloatRange,
    /// Vertical placement band as fractions of the height
    pub y_band: FloatRange,
    /// Burst damage radius (px)
    pub burst_radius: f32,
    /// Damage dealt by a burst
    pub burst_damage: i32,
    /// Burst lifetime (s)
    pub burst_duration: f32,
    /// Beam band thickness (px)
    pub beam_thickness: f32,
    /// Agents closer than `beam_thickness * beam_hit_factor` to the beam
    /// centre line are hit
    pub beam_hit_factor: f32,
    /// Damage dealt by a beam
    pub beam_damage: i32,
    /// Beam lifetime (s)
    pub beam_duration: f32,
}

impl Default for SpecialConfig {
    fn default() -> Self {
        Self {
            min_level: 3,
            cooldown: 5.0,
            trigger_probability: 0.2,
            burst_probability: 0.6,
            max_concurrent: 1,
            x_band: FloatRange::new(0.1, 0.9),
            y_band: FloatRange::new(0.15, 0.85),
            burst_radius: 120.0,
            burst_damage: 2,
            burst_duration: 0.55,
            beam_thickness: 12.0,
            beam_hit_factor: 0.8,
            beam_damage: 1,
            beam_duration: 0.42,
        }
    }
}

/// Target counts, refill and rebalance parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// First level with a battle
    pub min_level: u8,
    /// Agent count on `min_level`
    pub base_count: usize,
    /// Extra agents per level above `min_level`
    pub per_level: usize,
    /// Hard cap on the target count
    pub max_count: usize,
    /// Seconds a team must stay wiped before a rebalance batch spawns
    pub rebalance_cooldown: f32,
    /// Fraction of the target count used to size a rebalance batch
    pub rebalance_fraction: f32,
    /// Smallest rebalance batch
    pub rebalance_min: usize,
    /// Largest rebalance batch
    pub rebalance_max: usize,
    /// Rebalanced agents try to spawn at least this far from enemies (px)
    pub min_enemy_distance: f32,
    /// Random candidates tried per placement before falling back
    pub placement_attempts: u32,
    /// Lifetime of the death marker left by a culled agent (s)
    pub death_fade_duration: f32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            min_level: 2,
            base_count: 6,
            per_level: 5,
            max_count: 100,
            rebalance_cooldown: 0.6,
            rebalance_fraction: 0.3,
            rebalance_min: 3,
            rebalance_max: 5,
            min_enemy_distance: 120.0,
            placement_attempts: 200,
            death_fade_duration: 0.22,
        }
    }
}

/// Where and how new agents appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Horizontal spawn band as fractions of the width
    pub x_band: FloatRange,
    /// Vertical spawn band as fractions of the height
    pub y_band: FloatRange,
    /// Half-extent of the box that must stay clear of forbidden regions (px)
    pub ui_clearance: f32,
    /// Speed drawn for each new agent (px/s)
    pub speed: FloatRange,
    /// Initial fire cooldown drawn for each new agent (s)
    pub initial_cooldown: FloatRange,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            x_band: FloatRange::new(0.06, 0.94),
            y_band: FloatRange::new(0.18, 0.88),
            ui_clearance: 28.0,
            speed: FloatRange::new(40.0, 70.0),
            initial_cooldown: FloatRange::new(0.0, 0.6),
        }
    }
}

/// Complete battle configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Upper bound on the per-frame time step (s)
    pub max_frame_dt: f32,
    /// Movement and firing
    pub movement: MovementConfig,
    /// Projectiles
    pub projectile: ProjectileConfig,
    /// Special events
    pub special: SpecialConfig,
    /// Population control
    pub population: PopulationConfig,
    /// Spawn placement
    pub spawn: SpawnConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            max_frame_dt: 0.05,
            movement: MovementConfig::default(),
            projectile: ProjectileConfig::default(),
            special: SpecialConfig::default(),
            population: PopulationConfig::default(),
            spawn: SpawnConfig::default(),
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { field, value })
    }
}

impl BattleConfig {
    /// Parses a JSON document and validates the result.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the other
    /// variants when a value fails [`BattleConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field for values the systems cannot work with.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_frame_dt", self.max_frame_dt)?;

        let m = &self.movement;
        non_negative("movement.turn_rate", m.turn_rate)?;
        positive("movement.standoff_distance", m.standoff_distance)?;
        probability("movement.retreat_ratio", m.retreat_ratio)?;
        non_negative("movement.retreat_speed_factor", m.retreat_speed_factor)?;
        non_negative("movement.edge_margin", m.edge_margin)?;
        non_negative("movement.fire_range", m.fire_range)?;
        m.fire_cooldown.validate("movement.fire_cooldown")?;
        non_negative("movement.fire_cooldown.min", m.fire_cooldown.min)?;

        let p = &self.projectile;
        positive("projectile.speed", p.speed)?;
        positive("projectile.lifetime", p.lifetime)?;
        non_negative("projectile.muzzle_offset", p.muzzle_offset)?;
        non_negative("projectile.bounds_margin", p.bounds_margin)?;
        non_negative("projectile.hit_radius", p.hit_radius)?;
        if p.damage < 0 {
            return Err(ConfigError::InvalidCount {
                field: "projectile.damage",
                reason: "damage cannot be negative",
            });
        }
        non_negative("projectile.hit_marker_duration", p.hit_marker_duration)?;

        let s = &self.special;
        non_negative("special.cooldown", s.cooldown)?;
        probability("special.trigger_probability", s.trigger_probability)?;
        probability("special.burst_probability", s.burst_probability)?;
        if s.max_concurrent == 0 {
            return Err(ConfigError::InvalidCount {
                field: "special.max_concurrent",
                reason: "at least one concurrent event is required",
            });
        }
        s.x_band.validate_fraction("special.x_band")?;
        s.y_band.validate_fraction("special.y_band")?;
        non_negative("special.burst_radius", s.burst_radius)?;
        positive("special.burst_duration", s.burst_duration)?;
        non_negative("special.beam_thickness", s.beam_thickness)?;
        non_negative("special.beam_hit_factor", s.beam_hit_factor)?;
        positive("special.beam_duration", s.beam_duration)?;
        if s.burst_damage < 0 || s.beam_damage < 0 {
            return Err(ConfigError::InvalidCount {
                field: "special.damage",
                reason: "damage cannot be negative",
            });
        }

        let pop = &self.population;
        if pop.max_count < pop.base_count {
            return Err(ConfigError::InvalidCount {
                field: "population.max_count",
                reason: "cap is below the base count",
            });
        }
        if pop.rebalance_min == 0 || pop.rebalance_min > pop.rebalance_max {
            return Err(ConfigError::InvalidCount {
                field: "population.rebalance_min",
                reason: "batch bounds must satisfy 1 <= min <= max",
            });
        }
        if pop.placement_attempts == 0 {
            return Err(ConfigError::InvalidCount {
                field: "population.placement_attempts",
                reason: "at least one attempt is required",
            });
        }
        non_negative("population.rebalance_cooldown", pop.rebalance_cooldown)?;
        non_negative("population.rebalance_fraction", pop.rebalance_fraction)?;
        non_negative("population.min_enemy_distance", pop.min_enemy_distance)?;
        non_negative("population.death_fade_duration", pop.death_fade_duration)?;

        let sp = &self.spawn;
        sp.x_band.validate_fraction("spawn.x_band")?;
        sp.y_band.validate_fraction("spawn.y_band")?;
        non_negative("spawn.ui_clearance", sp.ui_clearance)?;
        sp.speed.validate("spawn.speed")?;
        non_negative("spawn.speed.min", sp.speed.min)?;
        sp.initial_cooldown.validate("spawn.initial_cooldown")?;
        non_negative("spawn.initial_cooldown.min", sp.initial_cooldown.min)?;

        Ok(())
    }
}
