//! Hexagonal lattice coordinates using offset coordinates (odd rows shifted).
//!
//! Based on Red Blob Games' excellent guide:
//! https://www.redblobgames.com/grids/hexagons/
//!
//! Bubbles are packed as circles of radius `r` on a brick-offset lattice:
//! neighbors in a row are `2r` apart, rows are `√3·r` apart, and odd rows are
//! shifted right by `r`. Screen coordinates grow downward from the ceiling.

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<HexCoord>();
    app.register_type::<HexLayout>();
}

/// Square root of 3, used frequently in hex math.
pub const SQRT_3: f32 = 1.732_050_8;

/// Neighbor offsets `(d_row, d_col)` for cells on even rows.
const EVEN_ROW_NEIGHBORS: [(isize, isize); 6] = [
    (-1, -1), // Upper left
    (-1, 0),  // Upper right
    (0, -1),  // Left
    (0, 1),   // Right
    (1, -1),  // Lower left
    (1, 0),   // Lower right
];

/// Neighbor offsets `(d_row, d_col)` for cells on odd rows (shifted right).
const ODD_ROW_NEIGHBORS: [(isize, isize); 6] = [
    (-1, 0), // Upper left
    (-1, 1), // Upper right
    (0, -1), // Left
    (0, 1),  // Right
    (1, 0),  // Lower left
    (1, 1),  // Lower right
];

/// A cell on the lattice.
///
/// Rows increase downward from the ceiling (row 0), columns increase to the
/// right. Both are always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct HexCoord {
    pub row: usize,
    pub col: usize,
}

impl HexCoord {
    /// Create a new hex coordinate.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The first cell of the ceiling row.
    pub const ORIGIN: Self = Self { row: 0, col: 0 };

    /// Whether this cell sits on a shifted (odd) row.
    #[inline]
    pub const fn is_odd_row(&self) -> bool {
        self.row % 2 == 1
    }

    /// Parity-dependent offsets to the 6 adjacent cells.
    pub fn neighbor_offsets(&self) -> &'static [(isize, isize); 6] {
        if self.is_odd_row() {
            &ODD_ROW_NEIGHBORS
        } else {
            &EVEN_ROW_NEIGHBORS
        }
    }

    /// Apply a signed offset, returning `None` if it would leave the
    /// non-negative quadrant.
    pub fn offset(&self, d_row: isize, d_col: isize) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }

    /// All hex-adjacent coordinates with non-negative components.
    ///
    /// Unlike [`HexGrid::neighbors_of`](super::grid::HexGrid::neighbors_of)
    /// these are not bounded by the current grid size, which lets the
    /// attachment resolver grow the grid toward a candidate.
    pub fn neighbors(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.neighbor_offsets()
            .iter()
            .filter_map(|&(dr, dc)| self.offset(dr, dc))
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Pixel geometry of a level's lattice.
///
/// There is exactly one projection from cells to pixels, [`HexLayout::cell_to_pixel`];
/// initial placement, attachment and collision checks all go through it.
/// The horizontal origin is fixed when the level is built so later grid growth
/// never shifts bubbles that are already attached.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct HexLayout {
    /// Bubble radius shared by every bubble in the session.
    pub radius: f32,
    /// Pixel position of cell (0, 0).
    pub origin: Vec2,
}

impl HexLayout {
    /// Build a layout that centers a `rows × cols` grid in a playfield.
    pub fn centered(radius: f32, rows: usize, cols: usize, playfield_width: f32, offset_y: f32) -> Self {
        let h = 2.0 * radius;
        let mut total_width = h * (cols.saturating_sub(1)) as f32 + radius;
        if rows % 2 == 1 {
            total_width = h * cols as f32;
        }

        Self {
            radius,
            origin: Vec2::new((playfield_width - total_width) / 2.0, offset_y),
        }
    }

    /// Horizontal distance between neighbors in a row.
    #[inline]
    pub fn horizontal_spacing(&self) -> f32 {
        2.0 * self.radius
    }

    /// Vertical distance between rows.
    #[inline]
    pub fn vertical_spacing(&self) -> f32 {
        SQRT_3 * self.radius
    }

    /// Horizontal shift applied to odd rows.
    #[inline]
    pub fn odd_row_offset(&self) -> f32 {
        self.radius
    }

    /// Canonical pixel center of a cell, rounded to whole pixels.
    pub fn cell_to_pixel(&self, coord: HexCoord) -> Vec2 {
        let mut x = self.origin.x + self.horizontal_spacing() * coord.col as f32;
        if coord.is_odd_row() {
            x += self.odd_row_offset();
        }
        let y = self.origin.y + self.vertical_spacing() * coord.row as f32;

        Vec2::new(x.round(), y.round())
    }

    /// Y coordinate below which a projectile is still considered "at the
    /// ceiling" for the ceiling fallback (two row heights under row 0).
    pub fn ceiling_band(&self) -> f32 {
        self.origin.y + self.vertical_spacing() * 2.0
    }
}
