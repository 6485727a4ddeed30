//! Hexagonal bubble-grid engine for bubble shooter games.
//!
//! The engine lives in [`game`] and can be driven directly through
//! [`game::Simulation`], or added to a Bevy app with [`BubbleGridPlugin`].

pub mod game;

use bevy::prelude::*;

use game::{ConfigError, LevelSet, Simulation};

/// Runs a [`Simulation`] as a resource.
///
/// Send [`game::AimShooter`], [`game::FireProjectile`] and
/// [`game::RestartGame`] messages to play; read [`game::GameEvent`] messages
/// to follow the game.
pub struct BubbleGridPlugin {
    simulation: Simulation,
}

impl BubbleGridPlugin {
    /// Validate `levels` up front so a bad level document never reaches the app.
    pub fn new(levels: LevelSet) -> Result<Self, ConfigError> {
        Ok(Self {
            simulation: Simulation::new(levels)?,
        })
    }

    pub fn with_seed(levels: LevelSet, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            simulation: Simulation::with_seed(levels, seed)?,
        })
    }
}

impl Plugin for BubbleGridPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.simulation.clone());
        app.add_plugins(game::plugin);
    }
}
