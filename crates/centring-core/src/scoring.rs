//! Centring score and per-level best scores.
//!
//! These are the rules of the game itself, independent of the battle layer.
//! Storage is left to the host: [`BestScores`] serialises to a JSON object
//! keyed by level number.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Viewport;
use crate::level::Level;

/// A drop within this many pixels of the centre completes the level.
pub const SUCCESS_RADIUS: f32 = 8.0;

/// Result of scoring one drop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenteringOutcome {
    /// Distance from the object centre to the viewport centre (px)
    pub distance: f32,
    /// Score in `[0, 100]`
    pub score: f32,
    /// Whether the drop completes the level
    pub success: bool,
}

/// Scores a drop by how close `object_center` lies to the viewport centre.
///
/// The score falls linearly from 100 at the centre to 0 at a corner.
///
/// ```
/// use centring_core::geometry::Viewport;
/// use centring_core::scoring::centering_score;
/// use glam::Vec2;
///
/// let vp = Viewport::new(800.0, 600.0);
/// let hit = centering_score(vp, Vec2::new(403.0, 304.0));
/// assert!(hit.success);
/// assert!((hit.score - 99.0).abs() < 1e-4);
///
/// let corner = centering_score(vp, Vec2::ZERO);
/// assert_eq!(corner.score, 0.0);
/// assert!(!corner.success);
/// ```
#[must_use]
pub fn centering_score(viewport: Viewport, object_center: Vec2) -> CenteringOutcome {
    let distance = viewport.center().distance(object_center);
    let max_distance = viewport.half_diagonal();
    let score = if max_distance > 0.0 {
        (100.0 - distance / max_distance * 100.0).max(0.0)
    } else if distance > 0.0 {
        0.0
    } else {
        100.0
    };
    CenteringOutcome {
        distance,
        score,
        success: distance <= SUCCESS_RADIUS,
    }
}

/// Best score per level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BestScores {
    scores: BTreeMap<Level, f32>,
}

impl BestScores {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `score` if it beats the current best. Returns `true` on a new
    /// best.
    pub fn record(&mut self, level: Level, score: f32) -> bool {
        let is_best = self.scores.get(&level).map_or(true, |&best| score > best);
        if is_best {
            self.scores.insert(level, score);
        }
        is_best
    }

    /// Records a drop only when it completed the level.
    pub fn submit(&mut self, level: Level, outcome: &CenteringOutcome) -> bool {
        outcome.success && self.record(level, outcome.score)
    }

    /// Best score on `level`, if any.
    #[must_use]
    pub fn best(&self, level: Level) -> Option<f32> {
        self.scores.get(&level).copied()
    }

    /// Level 1 is always open; later levels open once the previous level
    /// has a recorded best.
    #[must_use]
    pub fn is_unlocked(&self, level: Level) -> bool {
        level.previous().map_or(true, |prev| self.scores.contains_key(&prev))
    }

    /// Highest level that can currently be played.
    #[must_use]
    pub fn highest_unlocked(&self) -> Level {
        Level::all()
            .take_while(|&l| self.is_unlocked(l))
            .last()
            .unwrap_or(Level::FIRST)
    }

    /// Recorded bests in level order.
    pub fn iter(&self) -> impl Iterator<Item = (Level, f32)> + '_ {
        self.scores.iter().map(|(&l, &s)| (l, s))
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
