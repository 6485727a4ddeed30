//! Cluster detection - finding and popping matching bubbles.
//!
//! Uses flood fill (BFS) to find connected groups of same-colored bubbles.
//! When a cluster of 3+ is found, they pop! Popping can cut bubbles off from
//! the ceiling; a second flood fill from row 0 finds everything still hanging
//! and drops the rest.

use bevy::prelude::*;
use std::collections::{HashSet, VecDeque};

use super::{bubble::BubbleColor, grid::HexGrid, hex::HexCoord};

/// Minimum cluster size to pop (match-3).
pub const MIN_CLUSTER_SIZE: usize = 3;

/// Points awarded per bubble popped in a cluster.
pub const POINTS_PER_BUBBLE: u32 = 10;

/// Points awarded per bubble dropped after losing its support.
pub const POINTS_PER_FLOATING: u32 = 5;

/// A popped same-color cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterPopped {
    pub coords: Vec<HexCoord>,
    pub color: BubbleColor,
    pub count: usize,
}

impl ClusterPopped {
    pub fn points(&self) -> u32 {
        self.count as u32 * POINTS_PER_BUBBLE
    }
}

/// Bubbles dropped because nothing connects them to the ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingBubblesRemoved {
    pub coords: Vec<HexCoord>,
    pub count: usize,
}

impl FloatingBubblesRemoved {
    pub fn points(&self) -> u32 {
        self.count as u32 * POINTS_PER_FLOATING
    }
}

/// Everything removed by one match check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub popped: Option<ClusterPopped>,
    pub dropped: Option<FloatingBubblesRemoved>,
}

impl MatchOutcome {
    /// Whether a cluster popped.
    pub fn matched(&self) -> bool {
        self.popped.is_some()
    }

    /// Total score earned.
    pub fn points(&self) -> u32 {
        self.popped.as_ref().map_or(0, ClusterPopped::points)
            + self.dropped.as_ref().map_or(0, FloatingBubblesRemoved::points)
    }
}

/// Pop the cluster containing `origin` if it is large enough, then drop any
/// bubbles left without support.
pub fn check_and_remove_matches(grid: &mut HexGrid, origin: HexCoord) -> MatchOutcome {
    let Some(color) = grid.bubble_at(origin).map(|b| b.color) else {
        return MatchOutcome::default();
    };

    let cluster = find_cluster(grid, origin, color);
    if cluster.len() < MIN_CLUSTER_SIZE {
        return MatchOutcome::default();
    }

    info!(
        "Found cluster of {} {:?} bubbles at {}",
        cluster.len(),
        color,
        origin
    );

    for &coord in &cluster {
        grid.remove(coord);
    }

    let popped = ClusterPopped {
        count: cluster.len(),
        coords: cluster,
        color,
    };

    MatchOutcome {
        popped: Some(popped),
        dropped: remove_floating_bubbles(grid),
    }
}

/// Find all connected bubbles of the same color using flood fill (BFS).
///
/// Visits are keyed by coordinate, so each cell is examined at most once.
pub fn find_cluster(grid: &HexGrid, start: HexCoord, target_color: BubbleColor) -> Vec<HexCoord> {
    let mut cluster = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(coord) = queue.pop_front() {
        match grid.bubble_at(coord) {
            Some(bubble) if bubble.color == target_color => {}
            _ => continue,
        }
        cluster.push(coord);

        for neighbor in grid.neighbors_of(coord) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    cluster
}

/// Detect and remove floating bubbles (not connected to the ceiling row).
pub fn remove_floating_bubbles(grid: &mut HexGrid) -> Option<FloatingBubblesRemoved> {
    if grid.is_empty() {
        return None;
    }

    let anchored = find_anchored_bubbles(grid);
    let floating: Vec<HexCoord> = grid.coords().filter(|c| !anchored.contains(c)).collect();

    if floating.is_empty() {
        return None;
    }

    info!("Found {} floating bubbles to remove", floating.len());

    for &coord in &floating {
        grid.remove(coord);
    }

    Some(FloatingBubblesRemoved {
        count: floating.len(),
        coords: floating,
    })
}

/// Find all bubbles connected to row 0 using BFS, regardless of color.
pub fn find_anchored_bubbles(grid: &HexGrid) -> HashSet<HexCoord> {
    let mut anchored = HashSet::new();
    let mut queue = VecDeque::new();

    for coord in grid.row_coords(0) {
        queue.push_back(coord);
        anchored.insert(coord);
    }

    while let Some(coord) = queue.pop_front() {
        for neighbor in grid.neighbors_of(coord) {
            if grid.is_occupied(neighbor) && anchored.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    anchored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{bubble::Bubble, hex::HexLayout};
    use BubbleColor::*;

    fn grid_from(rows: &[&[Option<BubbleColor>]]) -> HexGrid {
        let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let layout = HexLayout::centered(30.0, rows.len(), cols, 1200.0, 50.0);
        let mut grid = HexGrid::new(layout, rows.len(), cols);
        for (row, cells) in rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Some(color) = cell {
                    let bubble = Bubble::moving(*color, Vec2::ZERO, Vec2::ZERO);
                    grid.place(bubble, HexCoord::new(row, col)).unwrap();
                }
            }
        }
        grid
    }

    #[test]
    fn test_pair_does_not_pop() {
        let mut grid = grid_from(&[&[Some(Red), Some(Red), Some(Blue)]]);
        let outcome = check_and_remove_matches(&mut grid, HexCoord::new(0, 0));
        assert!(!outcome.matched());
        assert_eq!(outcome.points(), 0);
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn test_red_pair_plus_shot_pops_three() {
        // Row 0: [red, red, blue]; a red lands below the first red at (1, 0).
        let mut grid = grid_from(&[
            &[Some(Red), Some(Red), Some(Blue)],
            &[Some(Red), None, None],
        ]);
        let outcome = check_and_remove_matches(&mut grid, HexCoord::new(1, 0));

        let popped = outcome.popped.clone().unwrap();
        assert_eq!(popped.count, 3);
        assert_eq!(popped.color, Red);
        assert_eq!(outcome.points(), 30);
        assert!(outcome.dropped.is_none());

        assert_eq!(grid.len(), 1);
        assert_eq!(grid.bubble_at(HexCoord::new(0, 2)).unwrap().color, Blue);
    }

    #[test]
    fn test_cluster_stops_at_other_colors() {
        let grid = grid_from(&[
            &[Some(Green), Some(Green), Some(Blue), Some(Green)],
            &[Some(Green), Some(Blue), Some(Green), None],
        ]);
        let mut cluster = find_cluster(&grid, HexCoord::new(0, 0), Green);
        cluster.sort();
        // (0,3) and (1,2) are green but only reachable through blue.
        assert_eq!(
            cluster,
            vec![HexCoord::new(0, 0), HexCoord::new(0, 1), HexCoord::new(1, 0)]
        );
    }

    #[test]
    fn test_match_isolates_lower_bubble() {
        // The yellow bubble at (1,1) hangs only from the reds at (0,1) and (0,2).
        let mut grid = grid_from(&[
            &[Some(Blue), Some(Red), Some(Red)],
            &[None, Some(Yellow), Some(Red)],
        ]);

        let outcome = check_and_remove_matches(&mut grid, HexCoord::new(1, 2));
        assert_eq!(outcome.popped.as_ref().unwrap().count, 3);

        let dropped = outcome.dropped.clone().unwrap();
        assert_eq!(dropped.coords, vec![HexCoord::new(1, 1)]);
        assert_eq!(outcome.points(), 30 + 5);

        assert_eq!(grid.len(), 1);
        assert!(grid.is_occupied(HexCoord::new(0, 0)));
    }

    #[test]
    fn test_sweep_keeps_supported_bubbles() {
        let mut grid = grid_from(&[
            &[Some(Red), None, None, None],
            &[Some(Blue), None, None, None],
            &[Some(Green), None, Some(Yellow), Some(Yellow)],
        ]);
        let dropped = remove_floating_bubbles(&mut grid).unwrap();

        let mut coords = dropped.coords.clone();
        coords.sort();
        assert_eq!(coords, vec![HexCoord::new(2, 2), HexCoord::new(2, 3)]);
        assert_eq!(dropped.points(), 10);

        let anchored = find_anchored_bubbles(&grid);
        assert_eq!(anchored.len(), grid.len());
    }

    #[test]
    fn test_sweep_is_noop_when_everything_hangs() {
        let mut grid = grid_from(&[&[Some(Red), Some(Blue)], &[Some(Green), None]]);
        assert!(remove_floating_bubbles(&mut grid).is_none());
        assert_eq!(grid.len(), 3);

        let mut empty = grid_from(&[&[None, None]]);
        assert!(remove_floating_bubbles(&mut empty).is_none());
    }

    #[test]
    fn test_sweep_drops_everything_without_ceiling_row() {
        let mut grid = grid_from(&[&[None, None], &[Some(Red), Some(Red)]]);
        let dropped = remove_floating_bubbles(&mut grid).unwrap();
        assert_eq!(dropped.count, 2);
        assert!(grid.is_empty());
    }
}
