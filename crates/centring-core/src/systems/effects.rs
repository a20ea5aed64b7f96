//! Removal of transient markers whose scheduled time has passed.

use crate::entity::EntityId;
use crate::output::BattleEvent;

use super::special::SpecialEvents;
use super::{Frame, TIME_EPSILON};

/// Removes expired effects, releasing a special-event slot for every burst
/// or beam among them. Returns the number removed.
///
/// Only effects are touched; agents and projectiles are never read here.
pub fn run(frame: &mut Frame<'_>, special: &mut SpecialEvents) -> usize {
    let now = frame.now + f64::from(TIME_EPSILON);
    let expired: Vec<EntityId> = frame
        .arena
        .effects_sorted()
        .filter(|e| e.is_expired(now))
        .map(|e| e.id)
        .collect();

    for &id in &expired {
        if let Some(effect) = frame.arena.remove_effect(id) {
            if effect.kind.is_special() {
                special.release();
            }
            frame.events.push(BattleEvent::EffectEnded {
                id,
                effect: effect.kind,
            });
        }
    }
    expired.len()
}
