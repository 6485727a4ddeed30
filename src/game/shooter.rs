//! The shooter/launcher at the bottom of the playfield.
//!
//! The shooter always has a "loaded" bubble ready to fire and an
//! "on deck" bubble preview. Angles are in degrees in screen space, where
//! y grows downward: -90 is straight up, -180 is left, 0 is right.

use bevy::prelude::*;

use super::{bubble::BubbleColor, projectile::Projectile};

/// Distance from the shooter base to the muzzle.
const BARREL_LENGTH: f32 = 80.0;

/// Aim straight up.
const STRAIGHT_UP: f32 = -90.0;

/// Every shot climbs at least this many degrees above horizontal.
const MIN_ELEVATION: f32 = 5.0;

const MIN_ANGLE: f32 = -180.0 + MIN_ELEVATION;
const MAX_ANGLE: f32 = -MIN_ELEVATION;

/// Targets this close to vertical above the base snap to straight up.
const VERTICAL_DEADZONE: f32 = 0.1;

/// The launcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Shooter {
    pub base: Vec2,
    angle: f32,
    pub loaded: BubbleColor,
    pub on_deck: BubbleColor,
}

impl Shooter {
    pub fn new(base: Vec2, loaded: BubbleColor, on_deck: BubbleColor) -> Self {
        Self {
            base,
            angle: STRAIGHT_UP,
            loaded,
            on_deck,
        }
    }

    /// Current aim in degrees.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Set the aim, clamped to the firing arc.
    pub fn set_angle(&mut self, degrees: f32) {
        self.angle = degrees.clamp(MIN_ANGLE, MAX_ANGLE);
    }

    /// Aim at a point on screen.
    pub fn aim_at(&mut self, target: Vec2) {
        let delta = target - self.base;
        if delta.x.abs() < VERTICAL_DEADZONE {
            self.angle = STRAIGHT_UP;
            return;
        }
        // Targets below the base clamp to the lowest shot on their side.
        let degrees = delta.y.atan2(delta.x).to_degrees();
        self.set_angle(if degrees > 0.0 && delta.x < 0.0 {
            MIN_ANGLE
        } else {
            degrees
        });
    }

    /// Unit vector along the barrel.
    pub fn direction(&self) -> Vec2 {
        let radians = self.angle.to_radians();
        Vec2::new(radians.cos(), radians.sin())
    }

    /// Where projectiles leave the barrel.
    pub fn muzzle(&self) -> Vec2 {
        self.base + self.direction() * BARREL_LENGTH
    }

    /// Launch the loaded bubble at `speed` and rotate in the next color.
    pub fn fire(&mut self, speed: f32, next: BubbleColor) -> Projectile {
        let projectile = Projectile::new(self.loaded, self.muzzle(), self.direction() * speed);
        self.loaded = self.on_deck;
        self.on_deck = next;
        projectile
    }
}
