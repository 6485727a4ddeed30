//! Attachment - turning a stopped projectile into a grid bubble.
//!
//! The resolver always finds a cell. It prefers an empty neighbor of a bubble
//! the projectile touched, then a ceiling slot, then the globally nearest empty
//! cell. The chosen cell is re-checked for occupancy and for overlap with other
//! bubbles before the projectile is committed. If no overlap-free alternative
//! exists the original cell is used anyway: the projectile must never be left
//! hanging.

use bevy::prelude::*;

use super::{
    bubble::{Bubble, BubbleId},
    grid::HexGrid,
    hex::HexCoord,
};

/// Bubbles closer than this many radii to the projectile count as touched.
const CONTACT_REACH: f32 = 2.1;

/// Minimum center distance between attached bubbles, in radii.
pub const MIN_SEPARATION: f32 = 1.95;

/// Ceiling slots must be within this many radii horizontally.
const CEILING_REACH: f32 = 2.0;

/// Half-width of the window searched when the target cell is taken.
const OCCUPIED_SEARCH_RADIUS: isize = 2;

/// Which rule picked the target cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSource {
    /// Empty neighbor of a touched bubble.
    Contact,
    /// Empty row-0 cell near the projectile.
    Ceiling,
    /// Globally nearest empty cell.
    Nearest,
    /// First empty cell in row-major order.
    FirstEmpty,
}

/// The outcome of attaching a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub id: BubbleId,
    pub coord: HexCoord,
    pub source: SlotSource,
    /// `false` when the bubble was committed despite overlapping a neighbor.
    pub clear: bool,
}

/// Attach a stopped projectile to the grid.
///
/// The bubble ends up attached, snapped to its cell's lattice position and
/// registered in the grid. This never fails.
pub fn attach(grid: &mut HexGrid, bubble: Bubble) -> Attachment {
    let (target, source) = find_slot(grid, bubble.position);

    let target = match relocate_if_occupied(grid, target) {
        Some(coord) => coord,
        None => {
            warn!("No free cell around occupied target {}", target);
            first_empty_slot(grid)
        }
    };

    let (mut coord, clear) = avoid_overlap(grid, target);

    let mut bubble = bubble;
    let id = loop {
        match grid.place(bubble, coord) {
            Ok(id) => break id,
            Err(rejected) => {
                warn!("Cell {} taken at commit, using first empty cell", coord);
                bubble = rejected;
                coord = first_empty_slot(grid);
            }
        }
    };

    debug!("Attached bubble at {} via {:?}", coord, source);

    Attachment {
        id,
        coord,
        source,
        clear,
    }
}

/// Pick the target cell for a projectile stopped at `pos`.
///
/// May grow the grid when a touched bubble's neighbor lies past the edge.
pub fn find_slot(grid: &mut HexGrid, pos: Vec2) -> (HexCoord, SlotSource) {
    if let Some(coord) = contact_slot(grid, pos) {
        return (coord, SlotSource::Contact);
    }
    if let Some(coord) = ceiling_slot(grid, pos) {
        return (coord, SlotSource::Ceiling);
    }
    if let Some(coord) = nearest_empty_slot(grid, pos) {
        return (coord, SlotSource::Nearest);
    }
    (first_empty_slot(grid), SlotSource::FirstEmpty)
}

/// Nearest empty hex neighbor of any bubble within touching range.
fn contact_slot(grid: &mut HexGrid, pos: Vec2) -> Option<HexCoord> {
    let reach = grid.layout().radius * CONTACT_REACH;

    let candidates: Vec<HexCoord> = grid
        .iter()
        .filter(|(_, bubble)| bubble.position.distance(pos) < reach)
        .filter_map(|(_, bubble)| bubble.coord())
        .flat_map(|coord| coord.neighbors().collect::<Vec<_>>())
        .collect();

    let mut best: Option<(HexCoord, f32)> = None;
    for coord in candidates {
        grid.ensure_size(coord);
        if !grid.is_cell_empty(coord) {
            continue;
        }
        let dist = grid.cell_to_pixel(coord).distance(pos);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((coord, dist));
        }
    }

    best.map(|(coord, _)| coord)
}

/// Nearest empty ceiling cell, if the projectile is still near the top.
fn ceiling_slot(grid: &HexGrid, pos: Vec2) -> Option<HexCoord> {
    let layout = grid.layout();
    if pos.y >= layout.ceiling_band() {
        return None;
    }
    let reach = layout.radius * CEILING_REACH;

    let mut best: Option<(HexCoord, f32)> = None;
    for col in 0..grid.cols() {
        let coord = HexCoord::new(0, col);
        if !grid.is_cell_empty(coord) {
            continue;
        }
        let center = grid.cell_to_pixel(coord);
        if (center.x - pos.x).abs() >= reach {
            continue;
        }
        let dist = center.distance(pos);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((coord, dist));
        }
    }

    best.map(|(coord, _)| coord)
}

/// The empty cell whose center is closest to `pos`.
fn nearest_empty_slot(grid: &HexGrid, pos: Vec2) -> Option<HexCoord> {
    let mut best: Option<(HexCoord, f32)> = None;
    for coord in grid.empty_cells() {
        let dist = grid.cell_to_pixel(coord).distance(pos);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((coord, dist));
        }
    }
    best.map(|(coord, _)| coord)
}

/// First empty cell in row-major order, adding a row if the grid is full.
fn first_empty_slot(grid: &mut HexGrid) -> HexCoord {
    if let Some(coord) = grid.empty_cells().next() {
        return coord;
    }
    let coord = HexCoord::new(grid.rows(), 0);
    grid.ensure_size(coord);
    coord
}

/// Keep `coord` if it is empty, otherwise take the first empty cell of the
/// surrounding 5×5 window, scanning rows top to bottom and columns left to right.
pub fn relocate_if_occupied(grid: &HexGrid, coord: HexCoord) -> Option<HexCoord> {
    if !grid.is_occupied(coord) {
        return Some(coord);
    }

    let window = -OCCUPIED_SEARCH_RADIUS..=OCCUPIED_SEARCH_RADIUS;
    let relocated = window
        .clone()
        .flat_map(|dr| window.clone().map(move |dc| (dr, dc)))
        .filter_map(|(dr, dc)| coord.offset(dr, dc))
        .find(|c| grid.is_cell_empty(*c));

    if let Some(c) = relocated {
        warn!("Target {} already occupied, relocated to {}", coord, c);
    }
    relocated
}

/// Make sure the bubble at `coord` would not overlap an attached bubble.
///
/// On overlap the 8 surrounding cells are tried in scan order, growing the grid
/// as needed. Returns the chosen cell and whether it is overlap-free; when no
/// neighbor qualifies the original cell is returned.
pub fn avoid_overlap(grid: &mut HexGrid, coord: HexCoord) -> (HexCoord, bool) {
    let min_separation = grid.layout().radius * MIN_SEPARATION;

    if grid.has_clearance(grid.cell_to_pixel(coord), min_separation) {
        return (coord, true);
    }

    for dr in -1..=1 {
        for dc in -1..=1 {
            if dr == 0 && dc == 0 {
                continue;
            }
            let Some(alt) = coord.offset(dr, dc) else {
                continue;
            };
            grid.ensure_size(alt);
            if grid.is_cell_empty(alt) && grid.has_clearance(grid.cell_to_pixel(alt), min_separation) {
                debug!("Moved attachment from {} to {} to avoid overlap", coord, alt);
                return (alt, true);
            }
        }
    }

    warn!("No overlap-free cell around {}, attaching anyway", coord);
    (coord, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{bubble::BubbleColor, hex::HexLayout};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn layout() -> HexLayout {
        HexLayout::centered(30.0, 5, 12, 1200.0, 50.0)
    }

    fn projectile(pos: Vec2) -> Bubble {
        Bubble::moving(BubbleColor::Blue, pos, Vec2::ZERO)
    }

    fn filled(rows: usize, cols: usize) -> HexGrid {
        let mut grid = HexGrid::new(layout(), rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                grid.place(projectile(Vec2::ZERO), HexCoord::new(row, col)).unwrap();
            }
        }
        grid
    }

    #[test]
    fn test_contact_picks_nearest_empty_neighbor() {
        let mut grid = HexGrid::new(layout(), 5, 12);
        grid.place(projectile(Vec2::ZERO), HexCoord::new(0, 4)).unwrap();

        // Just below and to the right of (0, 4): lower-right neighbor is (1, 4).
        let anchor = grid.cell_to_pixel(HexCoord::new(0, 4));
        let pos = anchor + Vec2::new(25.0, 45.0);
        let attachment = attach(&mut grid, projectile(pos));

        assert_eq!(attachment.source, SlotSource::Contact);
        assert_eq!(attachment.coord, HexCoord::new(1, 4));
        assert!(attachment.clear);
        let bubble = grid.bubble(attachment.id).unwrap();
        assert_eq!(bubble.position, grid.cell_to_pixel(HexCoord::new(1, 4)));
    }

    #[test]
    fn test_contact_grows_grid_below() {
        let mut grid = HexGrid::new(layout(), 1, 12);
        grid.place(projectile(Vec2::ZERO), HexCoord::new(0, 3)).unwrap();

        let anchor = grid.cell_to_pixel(HexCoord::new(0, 3));
        let attachment = attach(&mut grid, projectile(anchor + Vec2::new(-20.0, 50.0)));

        assert_eq!(attachment.coord, HexCoord::new(1, 2));
        assert_eq!(grid.rows(), 2);
    }

    #[test]
    fn test_ceiling_fallback_on_empty_grid() {
        let mut grid = HexGrid::new(layout(), 5, 12);
        // Column 3 sits at x = 240 + 180 = 420.
        let attachment = attach(&mut grid, projectile(Vec2::new(425.0, 30.0)));

        assert_eq!(attachment.source, SlotSource::Ceiling);
        assert_eq!(attachment.coord, HexCoord::new(0, 3));
    }

    #[test]
    fn test_global_fallback_far_from_everything() {
        let mut grid = HexGrid::new(layout(), 5, 12);
        // Below the ceiling band and touching nothing.
        let target = grid.cell_to_pixel(HexCoord::new(3, 5));
        let attachment = attach(&mut grid, projectile(target + Vec2::new(3.0, -2.0)));

        assert_eq!(attachment.source, SlotSource::Nearest);
        assert_eq!(attachment.coord, HexCoord::new(3, 5));
    }

    #[test]
    fn test_full_grid_gets_a_new_row() {
        let mut grid = filled(2, 3);
        let (coord, source) = find_slot(&mut grid, Vec2::new(-5000.0, -5000.0));
        assert_eq!(source, SlotSource::FirstEmpty);
        assert_eq!(coord, HexCoord::new(2, 0));
        assert_eq!(grid.rows(), 3);
    }

    #[test]
    fn test_relocate_scans_window_in_order() {
        let mut grid = filled(5, 5);
        grid.remove(HexCoord::new(4, 0));
        grid.remove(HexCoord::new(1, 3));

        assert_eq!(
            relocate_if_occupied(&grid, HexCoord::new(2, 2)),
            Some(HexCoord::new(1, 3))
        );
        assert_eq!(
            relocate_if_occupied(&grid, HexCoord::new(4, 0)),
            Some(HexCoord::new(4, 0))
        );
    }

    #[test]
    fn test_relocate_gives_up_when_window_is_full() {
        let grid = filled(5, 5);
        assert_eq!(relocate_if_occupied(&grid, HexCoord::new(2, 2)), None);
    }

    // With r = 1 rounding to whole pixels packs rows 1 and 2 too tightly, which
    // is the situation the overlap check exists for.
    fn tight_layout() -> HexLayout {
        HexLayout {
            radius: 1.0,
            origin: Vec2::ZERO,
        }
    }

    #[test]
    fn test_overlap_moves_to_clear_neighbor() {
        let mut grid = HexGrid::new(tight_layout(), 3, 3);
        grid.place(projectile(Vec2::ZERO), HexCoord::new(1, 0)).unwrap();

        let (coord, clear) = avoid_overlap(&mut grid, HexCoord::new(2, 0));
        assert!(clear);
        assert_eq!(coord, HexCoord::new(1, 1));
    }

    #[test]
    fn test_overlap_commits_anyway_when_boxed_in() {
        let mut grid = HexGrid::new(tight_layout(), 4, 3);
        for row in 0..4 {
            for col in 0..3 {
                if (row, col) != (2, 1) {
                    grid.place(projectile(Vec2::ZERO), HexCoord::new(row, col)).unwrap();
                }
            }
        }

        let (coord, clear) = avoid_overlap(&mut grid, HexCoord::new(2, 1));
        assert!(!clear);
        assert_eq!(coord, HexCoord::new(2, 1));
    }

    #[test]
    fn test_two_projectiles_at_same_point_get_distinct_cells() {
        let mut grid = HexGrid::new(layout(), 5, 12);
        grid.place(projectile(Vec2::ZERO), HexCoord::new(0, 6)).unwrap();
        let pos = grid.cell_to_pixel(HexCoord::new(0, 6)) + Vec2::new(0.0, 55.0);

        let first = attach(&mut grid, projectile(pos));
        let second = attach(&mut grid, projectile(pos));

        assert_ne!(first.coord, second.coord);
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn test_random_attachments_always_commit() {
        let mut rng = StdRng::seed_from_u64(0xB0B);
        for _ in 0..20 {
            let mut grid = HexGrid::new(layout(), 5, 12);
            for _ in 0..rng.random_range(0..40) {
                let coord = HexCoord::new(rng.random_range(0..5), rng.random_range(0..12));
                let _ = grid.place(projectile(Vec2::ZERO), coord);
            }

            for _ in 0..30 {
                let before = grid.len();
                let pos = Vec2::new(rng.random_range(0.0..1200.0), rng.random_range(0.0..600.0));
                let attachment = attach(&mut grid, projectile(pos));

                assert!(grid.in_bounds(attachment.coord));
                assert_eq!(grid.get(attachment.coord), Some(attachment.id));
                assert_eq!(grid.len(), before + 1);
            }

            let radius = grid.layout().radius;
            let centers: Vec<Vec2> = grid.iter().map(|(_, b)| b.position).collect();
            for (i, a) in centers.iter().enumerate() {
                for b in &centers[i + 1..] {
                    assert!(a.distance(*b) >= MIN_SEPARATION * radius);
                }
            }
        }
    }
}
