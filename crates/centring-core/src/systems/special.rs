//! Area bursts and line beams.
//!
//! Special events deal their damage on the frame they trigger and then hold
//! a concurrency slot until their effect expires. The slot is released by
//! [`SpecialEvents::release`], which the effect expiry step calls.

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::entity::{BeamAxis, EffectKind, EntityId};
use crate::output::{BattleEvent, DamageSource};

use super::Frame;

/// Concurrency and cooldown state for special events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecialEvents {
    active: u32,
    last_trigger: Option<f64>,
}

impl SpecialEvents {
    /// Creates an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of special events currently holding a slot.
    #[must_use]
    pub const fn active(&self) -> u32 {
        self.active
    }

    /// Clock time of the most recent trigger.
    #[must_use]
    pub const fn last_trigger(&self) -> Option<f64> {
        self.last_trigger
    }

    /// Forgets all state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Frees one slot after a special effect expired.
    pub fn release(&mut self) {
        self.active = self.active.saturating_sub(1);
    }

    /// Runs the level-gated per-frame roll.
    pub fn run(&mut self, frame: &mut Frame<'_>) -> Option<EntityId> {
        if frame.level.get() < frame.config.special.min_level {
            return None;
        }
        self.try_trigger(frame)
    }

    /// Attempts one trigger.
    ///
    /// Returns `None` without consuming randomness when every slot is taken
    /// or the cooldown has not elapsed. Otherwise rolls the trigger chance
    /// and, on success, fires a burst or a beam and returns its effect id.
    pub fn try_trigger(&mut self, frame: &mut Frame<'_>) -> Option<EntityId> {
        let config = frame.config;
        let s = &config.special;
        if self.active >= s.max_concurrent {
            return None;
        }
        if let Some(last) = self.last_trigger {
            if frame.now - last < f64::from(s.cooldown) {
                return None;
            }
        }
        if frame.rng.gen::<f32>() >= s.trigger_probability {
            return None;
        }

        self.last_trigger = Some(frame.now);
        self.active += 1;
        let burst = frame.rng.gen::<f32>() < s.burst_probability;
        Some(if burst {
            area_burst(frame)
        } else {
            line_beam(frame)
        })
    }
}

fn area_burst(frame: &mut Frame<'_>) -> EntityId {
    let config = frame.config;
    let s = &config.special;
    let center = frame
        .viewport
        .at_fraction(s.x_band.sample(frame.rng), s.y_band.sample(frame.rng));

    let effect = spawn(
        frame,
        EffectKind::AreaBurst {
            radius: s.burst_radius,
        },
        center,
        s.burst_duration,
    );

    let victims = frame.arena.agents_within(center, s.burst_radius);
    debug!(
        x = center.x,
        y = center.y,
        victims = victims.len(),
        "area burst"
    );
    for id in victims {
        damage(frame, id, s.burst_damage, DamageSource::AreaBurst(effect));
    }
    effect
}

fn line_beam(frame: &mut Frame<'_>) -> EntityId {
    let config = frame.config;
    let s = &config.special;
    let axis = if frame.rng.gen::<f32>() < 0.5 {
        BeamAxis::Horizontal
    } else {
        BeamAxis::Vertical
    };
    let (offset, anchor) = match axis {
        BeamAxis::Horizontal => {
            let y = s.y_band.sample(frame.rng) * frame.viewport.height;
            (y, Vec2::new(0.0, y))
        }
        BeamAxis::Vertical => {
            let x = s.x_band.sample(frame.rng) * frame.viewport.width;
            (x, Vec2::new(x, 0.0))
        }
    };

    let effect = spawn(
        frame,
        EffectKind::LineBeam {
            axis,
            thickness: s.beam_thickness,
        },
        anchor,
        s.beam_duration,
    );

    let reach = s.beam_thickness * s.beam_hit_factor;
    let victims: Vec<EntityId> = frame
        .arena
        .agents_sorted()
        .filter(|a| {
            let along = match axis {
                BeamAxis::Horizontal => a.position.y,
                BeamAxis::Vertical => a.position.x,
            };
            (along - offset).abs() < reach
        })
        .map(|a| a.id)
        .collect();
    debug!(?axis, offset, victims = victims.len(), "line beam");
    for id in victims {
        damage(frame, id, s.beam_damage, DamageSource::LineBeam(effect));
    }
    effect
}

fn spawn(frame: &mut Frame<'_>, kind: EffectKind, position: Vec2, duration: f32) -> EntityId {
    let expires_at = frame.now + f64::from(duration);
    let id = frame.arena.spawn_effect(kind, position, expires_at);
    if let Some(effect) = frame.arena.effect(id) {
        frame.events.push(BattleEvent::effect_started(effect));
    }
    id
}

fn damage(frame: &mut Frame<'_>, id: EntityId, amount: i32, source: DamageSource) {
    if let Some(agent) = frame.arena.agent_mut(id) {
        let health = agent.apply_damage(amount);
        frame.events.push(BattleEvent::AgentDamaged {
            id,
            amount,
            health,
            source,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FloatRange;
    use crate::entity::{Team, AGENT_START_HEALTH};
    use crate::tests::helpers::TestBench;

    fn always_trigger(bench: &mut TestBench) {
        bench.config.special.trigger_probability = 1.0;
        bench.config.special.cooldown = 0.0;
    }

    #[test]
    fn disabled_below_min_level() {
        let mut bench = TestBench::at_level(2);
        always_trigger(&mut bench);
        let mut special = SpecialEvents::new();

        assert!(special.run(&mut bench.frame(0.05)).is_none());
        assert_eq!(special.active(), 0);
    }

    #[test]
    fn trigger_takes_a_slot() {
        let mut bench = TestBench::at_level(3);
        always_trigger(&mut bench);
        let mut special = SpecialEvents::new();

        let effect = special.run(&mut bench.frame(0.05)).unwrap();

        assert_eq!(special.active(), 1);
        assert!(bench.arena.effect(effect).unwrap().kind.is_special());
        assert_eq!(special.last_trigger(), Some(bench.now));
    }

    #[test]
    fn full_slots_block_second_trigger() {
        let mut bench = TestBench::at_level(3);
        always_trigger(&mut bench);
        let mut special = SpecialEvents::new();

        assert!(special.try_trigger(&mut bench.frame(0.0)).is_some());
        assert!(special.try_trigger(&mut bench.frame(0.0)).is_none());
        assert_eq!(bench.arena.effect_count(), 1);

        special.release();
        assert!(special.try_trigger(&mut bench.frame(0.0)).is_some());
    }

    #[test]
    fn cooldown_gates_trigger() {
        let mut bench = TestBench::at_level(3);
        always_trigger(&mut bench);
        bench.config.special.cooldown = 5.0;
        let mut special = SpecialEvents::new();

        assert!(special.try_trigger(&mut bench.frame(0.05)).is_some());
        special.release();
        assert!(special.try_trigger(&mut bench.frame(4.0)).is_none());
        assert!(special.try_trigger(&mut bench.frame(1.5)).is_some());
    }

    #[test]
    fn zero_probability_never_triggers() {
        let mut bench = TestBench::at_level(8);
        bench.config.special.trigger_probability = 0.0;
        let mut special = SpecialEvents::new();

        for _ in 0..200 {
            assert!(special.run(&mut bench.frame(0.05)).is_none());
        }
    }

    #[test]
    fn burst_damages_inside_radius_inclusive() {
        let mut bench = TestBench::at_level(3);
        always_trigger(&mut bench);
        bench.config.special.burst_probability = 1.0;
        bench.config.special.x_band = FloatRange::new(0.5, 0.5);
        bench.config.special.y_band = FloatRange::new(0.5, 0.5);
        // Viewport 1280x800, so the burst lands on (640, 400).
        let edge = bench.agent(Team::Red, 760.0, 400.0);
        let inside = bench.agent(Team::Blue, 650.0, 410.0);
        let outside = bench.agent(Team::Blue, 761.0, 400.0);
        let mut special = SpecialEvents::new();

        special.try_trigger(&mut bench.frame(0.05)).unwrap();

        assert_eq!(bench.arena.agent(edge).unwrap().health, AGENT_START_HEALTH - 2);
        assert_eq!(bench.arena.agent(inside).unwrap().health, AGENT_START_HEALTH - 2);
        assert_eq!(bench.arena.agent(outside).unwrap().health, AGENT_START_HEALTH);
        let burst = bench.arena.effects_sorted().next().unwrap();
        assert_eq!(burst.position, Vec2::new(640.0, 400.0));
        assert!((burst.expires_at - (bench.now + 0.55)).abs() < 1e-6);
    }

    #[test]
    fn beam_damages_narrow_band() {
        let mut bench = TestBench::at_level(3);
        always_trigger(&mut bench);
        bench.config.special.burst_probability = 0.0;
        bench.config.special.x_band = FloatRange::new(0.5, 0.5);
        bench.config.special.y_band = FloatRange::new(0.5, 0.5);
        // Both axes land on the centre lines x = 640 / y = 400.
        let on_both = bench.agent(Team::Red, 645.0, 405.0);
        let near_miss = bench.agent(Team::Blue, 650.0, 410.0);
        let far = bench.agent(Team::Blue, 100.0, 100.0);
        let mut special = SpecialEvents::new();

        special.try_trigger(&mut bench.frame(0.05)).unwrap();

        assert_eq!(bench.arena.agent(on_both).unwrap().health, AGENT_START_HEALTH - 1);
        assert_eq!(bench.arena.agent(near_miss).unwrap().health, AGENT_START_HEALTH);
        assert_eq!(bench.arena.agent(far).unwrap().health, AGENT_START_HEALTH);
        let beam = bench.arena.effects_sorted().next().unwrap();
        assert!(matches!(beam.kind, EffectKind::LineBeam { thickness, .. } if thickness == 12.0));
    }

    #[test]
    fn reset_clears_state() {
        let mut bench = TestBench::at_level(3);
        always_trigger(&mut bench);
        let mut special = SpecialEvents::new();
        special.try_trigger(&mut bench.frame(0.05));

        special.reset();

        assert_eq!(special, SpecialEvents::new());
    }
}
