//! The hexagonal grid that holds all attached bubbles.
//!
//! Cells are a dense, growable `rows × cols` table of optional bubble handles.
//! The bubbles themselves live in an ordered arena keyed by [`BubbleId`], so a
//! cell never holds a reference into another cell and neighbor lookups stay O(1).
//!
//! Every mutation keeps the two views consistent: a cell holds a handle exactly
//! when the bubble behind that handle is attached to that cell, and the bubble's
//! pixel position is the lattice projection of its cell.

use bevy::prelude::*;
use std::collections::BTreeMap;

use super::{
    bubble::{Bubble, BubbleId, BubbleState},
    hex::{HexCoord, HexLayout},
};

/// The main grid holding all attached bubbles.
#[derive(Debug, Clone)]
pub struct HexGrid {
    layout: HexLayout,
    /// Row-major cells; every row has exactly `cols` entries.
    cells: Vec<Vec<Option<BubbleId>>>,
    cols: usize,
    bubbles: BTreeMap<BubbleId, Bubble>,
    next_id: u32,
}

impl HexGrid {
    /// Create an empty `rows × cols` grid.
    pub fn new(layout: HexLayout, rows: usize, cols: usize) -> Self {
        Self {
            layout,
            cells: vec![vec![None; cols]; rows],
            cols,
            bubbles: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn layout(&self) -> &HexLayout {
        &self.layout
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Canonical pixel center of a cell.
    pub fn cell_to_pixel(&self, coord: HexCoord) -> Vec2 {
        self.layout.cell_to_pixel(coord)
    }

    /// Check if a coordinate is addressable without growing.
    pub fn in_bounds(&self, coord: HexCoord) -> bool {
        coord.row < self.rows() && coord.col < self.cols
    }

    /// Grow rows and/or columns so `coord` is addressable.
    ///
    /// New cells start empty. The grid never shrinks. Returns whether it grew.
    pub fn ensure_size(&mut self, coord: HexCoord) -> bool {
        let mut grew = false;

        if coord.col >= self.cols {
            self.cols = coord.col + 1;
            for row in &mut self.cells {
                row.resize(self.cols, None);
            }
            grew = true;
        }

        if coord.row >= self.rows() {
            let cols = self.cols;
            self.cells.resize_with(coord.row + 1, || vec![None; cols]);
            grew = true;
        }

        if grew {
            debug!("Grid grew to {}x{}", self.rows(), self.cols);
        }
        grew
    }

    /// The in-bounds hex neighbors of a cell.
    ///
    /// Out-of-range coordinates are dropped; this never grows the grid.
    pub fn neighbors_of(&self, coord: HexCoord) -> Vec<HexCoord> {
        coord.neighbors().filter(|n| self.in_bounds(*n)).collect()
    }

    /// Get the bubble handle at a cell, if any.
    pub fn get(&self, coord: HexCoord) -> Option<BubbleId> {
        self.cells.get(coord.row)?.get(coord.col).copied().flatten()
    }

    /// Check if a cell is occupied.
    pub fn is_occupied(&self, coord: HexCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Check if a cell exists and holds no bubble.
    pub fn is_cell_empty(&self, coord: HexCoord) -> bool {
        self.in_bounds(coord) && !self.is_occupied(coord)
    }

    /// Look up a bubble by handle.
    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.get(&id)
    }

    /// The bubble occupying a cell, if any.
    pub fn bubble_at(&self, coord: HexCoord) -> Option<&Bubble> {
        self.get(coord).and_then(|id| self.bubbles.get(&id))
    }

    /// Attach a bubble to a cell, growing the grid if needed.
    ///
    /// The bubble is marked attached and snapped to the cell's lattice position.
    /// If the cell is already taken the bubble is handed back untouched.
    pub fn place(&mut self, mut bubble: Bubble, coord: HexCoord) -> Result<BubbleId, Bubble> {
        self.ensure_size(coord);
        if self.is_occupied(coord) {
            return Err(bubble);
        }

        let id = BubbleId(self.next_id);
        self.next_id += 1;

        bubble.state = BubbleState::Attached { coord };
        bubble.position = self.cell_to_pixel(coord);
        self.cells[coord.row][coord.col] = Some(id);
        self.bubbles.insert(id, bubble);

        Ok(id)
    }

    /// Detach the bubble at a cell.
    ///
    /// Returns the bubble that was removed, if any.
    pub fn remove(&mut self, coord: HexCoord) -> Option<Bubble> {
        let id = self.cells.get_mut(coord.row)?.get_mut(coord.col)?.take()?;
        self.bubbles.remove(&id)
    }

    /// Remove all bubbles, keeping the current dimensions.
    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(None);
        }
        self.bubbles.clear();
    }

    /// Get the number of attached bubbles.
    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    /// Check if no bubble is attached.
    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Iterate attached bubbles in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (BubbleId, &Bubble)> {
        self.bubbles.iter().map(|(id, bubble)| (*id, bubble))
    }

    /// Get all occupied coordinates in creation order.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.bubbles.values().filter_map(Bubble::coord)
    }

    /// Occupied cells of a single row, left to right.
    pub fn row_coords(&self, row: usize) -> Vec<HexCoord> {
        let Some(cells) = self.cells.get(row) else {
            return Vec::new();
        };
        cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_some())
            .map(|(col, _)| HexCoord::new(row, col))
            .collect()
    }

    /// Every empty cell, row-major.
    pub fn empty_cells(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_none())
                .map(move |(col, _)| HexCoord::new(row, col))
        })
    }

    /// Distance from a point to the closest attached bubble center.
    pub fn nearest_distance(&self, pos: Vec2) -> Option<f32> {
        self.bubbles
            .values()
            .map(|b| b.position.distance(pos))
            .min_by(f32::total_cmp)
    }

    /// Check that no attached bubble center lies closer than `min_separation`
    /// to `pos`.
    pub fn has_clearance(&self, pos: Vec2, min_separation: f32) -> bool {
        self.nearest_distance(pos)
            .is_none_or(|d| d >= min_separation)
    }

    /// Lowest pixel edge of any attached bubble.
    pub fn lowest_edge(&self) -> Option<f32> {
        let radius = self.layout.radius;
        self.bubbles
            .values()
            .map(|b| b.position.y + radius)
            .max_by(f32::total_cmp)
    }
}
