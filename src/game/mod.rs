//! The bubble grid engine.
//!
//! This module contains all the gameplay logic including:
//! - Hexagonal lattice geometry (odd rows shifted right)
//! - The grid of attached bubbles
//! - Shooter aim and projectile motion
//! - Attachment of stopped projectiles to grid cells
//! - Cluster popping and dropping of unsupported bubbles
//! - Level progression, score and high score

mod attach;
mod bubble;
mod cluster;
mod config;
mod error;
mod grid;
mod hex;
mod highscore;
mod projectile;
mod shooter;
mod state;

use bevy::prelude::*;

pub use attach::{Attachment, MIN_SEPARATION, SlotSource, attach, avoid_overlap, find_slot, relocate_if_occupied};
pub use bubble::{Bubble, BubbleColor, BubbleId, BubbleState, ColorSpawner};
pub use cluster::{
    ClusterPopped, FloatingBubblesRemoved, MIN_CLUSTER_SIZE, MatchOutcome, POINTS_PER_BUBBLE, POINTS_PER_FLOATING,
    check_and_remove_matches, find_anchored_bubbles, find_cluster, remove_floating_bubbles,
};
pub use config::{GameSettings, LevelConfig, LevelSet, LevelSpec};
pub use error::ConfigError;
pub use grid::HexGrid;
pub use hex::{HexCoord, HexLayout};
pub use highscore::{HighScore, HighScoreStore};
pub use projectile::{Contact, Playfield, Projectile};
pub use shooter::Shooter;
pub use state::{
    AimShooter, BubbleView, FireProjectile, GameEvent, GamePhase, RestartGame, Score, SetAimAngle, Simulation,
    SimulationSystems,
};

pub(crate) fn plugin(app: &mut App) {
    app.add_plugins((hex::plugin, bubble::plugin, state::plugin, highscore::plugin));
}
