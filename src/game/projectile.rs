//! Projectile - the bubble being shot.
//!
//! The projectile travels in a straight line, bouncing off the side walls,
//! until it reaches the ceiling or touches an attached bubble.

use bevy::prelude::*;

use super::{
    bubble::{Bubble, BubbleColor},
    grid::HexGrid,
};

/// A projectile touching an attached bubble within this many radii stops.
const CONTACT_DISTANCE: f32 = 2.05;

/// How far below the playfield a projectile may travel before it is lost.
const OUT_OF_BOUNDS_MARGIN: f32 = 50.0;

/// The walls a projectile moves between. The ceiling is at `y = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

/// What happened to the projectile during one tick.
///
/// Checks run in this fixed priority; the first that applies wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Reached the ceiling; stopped and ready to attach.
    Ceiling,
    /// Bounced off a side wall; still moving.
    Wall,
    /// Touched an attached bubble; stopped and ready to attach.
    Bubble,
    /// Fell out of the bottom of the playfield.
    OutOfBounds,
}

/// The bubble in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub color: BubbleColor,
    pub position: Vec2,
    /// Pixels per second.
    pub velocity: Vec2,
}

impl Projectile {
    pub fn new(color: BubbleColor, position: Vec2, velocity: Vec2) -> Self {
        Self {
            color,
            position,
            velocity,
        }
    }

    /// Move the projectile based on its velocity.
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Reflect off a side wall if the bubble's edge reached it.
    ///
    /// Returns whether a bounce happened.
    pub fn bounce_off_walls(&mut self, radius: f32, width: f32) -> bool {
        if self.position.x - radius <= 0.0 {
            self.position.x = radius;
            self.velocity.x = -self.velocity.x;
            return true;
        }
        if self.position.x + radius >= width {
            self.position.x = width - radius;
            self.velocity.x = -self.velocity.x;
            return true;
        }
        false
    }

    /// Whether the bubble's top edge reached the ceiling.
    pub fn hits_ceiling(&self, radius: f32) -> bool {
        self.position.y - radius <= 0.0
    }

    /// Whether an attached bubble is close enough to stop on.
    pub fn touches_grid(&self, grid: &HexGrid) -> bool {
        let reach = grid.layout().radius * CONTACT_DISTANCE;
        grid.nearest_distance(self.position)
            .is_some_and(|d| d <= reach)
    }

    /// Halt the projectile in place.
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// The bubble to hand to the attachment resolver.
    pub fn into_bubble(self) -> Bubble {
        Bubble::moving(self.color, self.position, self.velocity)
    }

    /// Advance one tick and classify the result.
    ///
    /// Ceiling contact pre-empts everything, a wall bounce keeps the projectile
    /// moving without checking bubbles this tick, then bubble contact, then
    /// falling out of the playfield.
    pub fn step(&mut self, grid: &HexGrid, playfield: Playfield, dt: f32) -> Option<Contact> {
        let radius = grid.layout().radius;
        self.integrate(dt);

        if self.hits_ceiling(radius) {
            self.stop();
            self.position.y = radius;
            return Some(Contact::Ceiling);
        }
        if self.bounce_off_walls(radius, playfield.width) {
            return Some(Contact::Wall);
        }
        if self.touches_grid(grid) {
            self.stop();
            return Some(Contact::Bubble);
        }
        if self.position.y > playfield.height + OUT_OF_BOUNDS_MARGIN {
            return Some(Contact::OutOfBounds);
        }
        None
    }
}
