//! Bubbles - the main game objects.
//!
//! A bubble is either in flight (the projectile) or attached to a lattice
//! cell. When 3+ of the same color are connected, they pop!

use bevy::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::hex::HexCoord;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<BubbleColor>();
    app.register_type::<BubbleId>();
}

/// The different bubble colors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BubbleColor {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl BubbleColor {
    /// Get all possible bubble colors.
    pub const ALL: [BubbleColor; 6] = [
        BubbleColor::Red,
        BubbleColor::Blue,
        BubbleColor::Green,
        BubbleColor::Yellow,
        BubbleColor::Purple,
        BubbleColor::Orange,
    ];
}

/// Stable handle of a bubble owned by a [`HexGrid`](super::grid::HexGrid).
///
/// Handles are issued in increasing order and never reused within a level,
/// so iterating bubbles by handle is iterating them in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct BubbleId(pub u32);

/// Where a bubble is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BubbleState {
    /// In flight with the given velocity (pixels per second).
    Moving { velocity: Vec2 },
    /// Bound to a lattice cell.
    Attached { coord: HexCoord },
}

/// A single bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub color: BubbleColor,
    /// Center in screen pixels.
    pub position: Vec2,
    pub state: BubbleState,
}

impl Bubble {
    /// A projectile leaving `position` with `velocity`.
    pub fn moving(color: BubbleColor, position: Vec2, velocity: Vec2) -> Self {
        Self {
            color,
            position,
            state: BubbleState::Moving { velocity },
        }
    }

    /// The cell this bubble occupies, if attached.
    pub fn coord(&self) -> Option<HexCoord> {
        match self.state {
            BubbleState::Attached { coord } => Some(coord),
            BubbleState::Moving { .. } => None,
        }
    }

}

/// Draws bubble colors uniformly from a level's palette.
///
/// Seeded so a whole game can be replayed.
#[derive(Debug, Clone)]
pub struct ColorSpawner {
    rng: StdRng,
}

impl ColorSpawner {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from the operating system.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::rng().random())
    }

    /// Pick a color from `palette`. Falls back to the default color if the
    /// palette is empty (validated level configs never are).
    pub fn next_color(&mut self, palette: &[BubbleColor]) -> BubbleColor {
        if palette.is_empty() {
            return BubbleColor::default();
        }
        palette[self.rng.random_range(0..palette.len())]
    }
}
