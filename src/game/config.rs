//! Level configuration.
//!
//! Levels are described by a JSON document with shared `game_settings` and a
//! list of `levels`. Everything is validated up front; a running simulation
//! only ever sees a [`LevelConfig`] that passed validation.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{bubble::BubbleColor, error::ConfigError, hex::HexLayout};

/// Settings shared by every level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub bubble_radius: f32,
    /// Y position of row 0.
    pub grid_offset_y: f32,
    /// Distance of the shooter base above the bottom of the playfield.
    pub shooter_y_offset: f32,
    pub playfield_width: f32,
    pub playfield_height: f32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            bubble_radius: 30.0,
            grid_offset_y: 50.0,
            shooter_y_offset: 50.0,
            playfield_width: 1200.0,
            playfield_height: 800.0,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.bubble_radius.is_finite() && self.bubble_radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.bubble_radius));
        }
        if !(self.playfield_width > 0.0 && self.playfield_height > 0.0) {
            return Err(ConfigError::InvalidPlayfield {
                width: self.playfield_width,
                height: self.playfield_height,
            });
        }
        Ok(())
    }
}

/// One level's grid and projectile parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub rows: usize,
    pub cols: usize,
    pub colors: Vec<BubbleColor>,
    /// Projectile speed in pixels per second.
    pub bubble_speed: f32,
}

impl LevelSpec {
    /// Validate this level; `level` is its 1-based number for error reporting.
    pub fn validate(&self, level: usize) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::NoRows { level });
        }
        if self.cols == 0 {
            return Err(ConfigError::NoColumns { level });
        }
        if self.colors.is_empty() {
            return Err(ConfigError::NoColors { level });
        }
        if !(self.bubble_speed.is_finite() && self.bubble_speed > 0.0) {
            return Err(ConfigError::InvalidSpeed {
                level,
                speed: self.bubble_speed,
            });
        }
        Ok(())
    }
}

/// The full level document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    #[serde(default)]
    pub game_settings: GameSettings,
    pub levels: Vec<LevelSpec>,
}

impl Default for LevelSet {
    fn default() -> Self {
        use BubbleColor::*;

        Self {
            game_settings: GameSettings::default(),
            levels: vec![
                LevelSpec {
                    rows: 5,
                    cols: 12,
                    colors: vec![Red, Blue, Green],
                    bubble_speed: 600.0,
                },
                LevelSpec {
                    rows: 6,
                    cols: 14,
                    colors: vec![Red, Blue, Green, Yellow],
                    bubble_speed: 700.0,
                },
                LevelSpec {
                    rows: 7,
                    cols: 16,
                    colors: vec![Red, Blue, Green, Yellow, Purple],
                    bubble_speed: 800.0,
                },
            ],
        }
    }
}

impl LevelSet {
    /// Parse and validate a JSON level document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let set: LevelSet = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game_settings.validate()?;
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        for (i, level) in self.levels.iter().enumerate() {
            level.validate(i + 1)?;
        }
        Ok(())
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The merged configuration of a 1-based level number, clamped to the
    /// available levels.
    pub fn level(&self, number: usize) -> Option<LevelConfig> {
        if self.levels.is_empty() {
            return None;
        }
        let number = number.clamp(1, self.levels.len());
        let spec = self.levels.get(number - 1)?;
        Some(LevelConfig {
            number,
            rows: spec.rows,
            cols: spec.cols,
            colors: spec.colors.clone(),
            bubble_speed: spec.bubble_speed,
            settings: self.game_settings.clone(),
        })
    }
}

/// Immutable configuration for one level of play.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    /// 1-based level number.
    pub number: usize,
    pub rows: usize,
    pub cols: usize,
    pub colors: Vec<BubbleColor>,
    pub bubble_speed: f32,
    pub settings: GameSettings,
}

impl LevelConfig {
    pub fn radius(&self) -> f32 {
        self.settings.bubble_radius
    }

    /// Lattice geometry for this level, centered in the playfield.
    pub fn layout(&self) -> HexLayout {
        HexLayout::centered(
            self.settings.bubble_radius,
            self.rows,
            self.cols,
            self.settings.playfield_width,
            self.settings.grid_offset_y,
        )
    }

    /// Center of the shooter base.
    pub fn shooter_base(&self) -> Vec2 {
        Vec2::new(
            (self.settings.playfield_width / 2.0).floor(),
            self.settings.playfield_height - self.settings.shooter_y_offset,
        )
    }
}
