//! Game level numbers.
//!
//! Levels run from 1 to [`Level::MAX`]. The battle layer starts on level 2
//! and special events on level 3 (both configurable); level 1 is the plain
//! centring game.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected level number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("level {0} is outside 1..={max}", max = Level::MAX)]
pub struct LevelError(pub u8);

/// A validated level number in `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// Highest level.
    pub const MAX: u8 = 8;

    /// The first level.
    pub const FIRST: Level = Level(1);

    /// Creates a level.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError`] when `n` is 0 or above [`Level::MAX`].
    pub const fn new(n: u8) -> Result<Self, LevelError> {
        if n >= 1 && n <= Self::MAX {
            Ok(Self(n))
        } else {
            Err(LevelError(n))
        }
    }

    /// The raw level number.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The following level, or `None` on the last one.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        if self.0 < Self::MAX {
            Some(Self(self.0 + 1))
        } else {
            None
        }
    }

    /// The preceding level, or `None` on the first one.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        if self.0 > 1 {
            Some(Self(self.0 - 1))
        } else {
            None
        }
    }

    /// All levels in order.
    pub fn all() -> impl Iterator<Item = Level> {
        (1..=Self::MAX).map(Level)
    }

    /// Edge length of the draggable object on this level, in pixels.
    ///
    /// The object shrinks as levels advance, except for a larger break on
    /// level 6.
    #[must_use]
    pub const fn object_size(self) -> f32 {
        match self.0 {
            2 => 80.0,
            3 => 65.0,
            4 => 55.0,
            5 => 45.0,
            6 => 85.0,
            7 => 35.0,
            8 => 25.0,
            _ => 100.0,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u8> for Level {
    type Error = LevelError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
