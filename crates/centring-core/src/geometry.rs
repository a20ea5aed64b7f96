//! Viewport and screen-rectangle primitives.
//!
//! Coordinates are CSS pixels with the origin at the top-left corner of the
//! viewport and y growing downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Size of the visible play area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in px
    pub width: f32,
    /// Height in px
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport of the given size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Geometric centre.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Distance from the centre to a corner.
    #[must_use]
    pub fn half_diagonal(&self) -> f32 {
        self.center().length()
    }

    /// Returns `true` when `point` lies inside the viewport grown by
    /// `margin` on every side (edges inclusive).
    #[must_use]
    pub fn contains_with_margin(&self, point: Vec2, margin: f32) -> bool {
        point.x >= -margin
            && point.y >= -margin
            && point.x <= self.width + margin
            && point.y <= self.height + margin
    }

    /// Clamps `point` into the viewport shrunk by `inset` on every side.
    ///
    /// A viewport smaller than twice the inset collapses to its centre
    /// instead of producing an inverted range.
    #[must_use]
    pub fn clamp_inset(&self, point: Vec2, inset: f32) -> Vec2 {
        let min = Vec2::splat(inset).min(self.center());
        let max = (self.size() - Vec2::splat(inset)).max(self.center());
        point.clamp(min, max)
    }

    /// Maps a fractional coordinate (0..1 on each axis) to pixels.
    #[must_use]
    pub fn at_fraction(&self, fx: f32, fy: f32) -> Vec2 {
        Vec2::new(fx * self.width, fy * self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// An axis-aligned screen rectangle, shaped like a DOM bounding rect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge in px
    pub left: f32,
    /// Top edge in px
    pub top: f32,
    /// Right edge in px
    pub right: f32,
    /// Bottom edge in px
    pub bottom: f32,
}

impl Rect {
    /// Creates a rectangle from its edges.
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Square of half-extent `half` centred on `center`.
    #[must_use]
    pub fn around(center: Vec2, half: f32) -> Self {
        Self::new(center.x - half, center.y - half, center.x + half, center.y + half)
    }

    /// Intersection test with touching edges counting as overlap.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.bottom < other.top
            || self.top > other.bottom)
    }
}

/// Returns `true` if `rect` touches any of `regions`.
#[must_use]
pub fn overlaps_any(rect: &Rect, regions: &[Rect]) -> bool {
    regions.iter().any(|r| rect.intersects(r))
}

/// Wraps an angle into `[-π, π]`.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}
