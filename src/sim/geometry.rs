//! Grid ↔ world mapping for the brick-wall layout

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hex::Coord;
use crate::config::GridConfig;

/// Closed-form cell placement. Odd rows are shifted right by half a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub cell_size: f32,
    /// Top-left corner of cell (0, 0)
    pub origin: Vec2,
}

impl GridGeometry {
    pub fn new(cell_size: f32, origin: Vec2) -> Self {
        Self { cell_size, origin }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.cell_size, config.origin)
    }

    #[inline]
    fn row_offset(&self, row: i32) -> f32 {
        if row.rem_euclid(2) == 1 {
            self.cell_size / 2.0
        } else {
            0.0
        }
    }

    /// World position of a cell's center
    #[inline]
    pub fn cell_center(&self, coord: Coord) -> Vec2 {
        let half = self.cell_size / 2.0;
        Vec2::new(
            self.origin.x + coord.col as f32 * self.cell_size + self.row_offset(coord.row) + half,
            self.origin.y + coord.row as f32 * self.cell_size + half,
        )
    }

    /// Cell whose square contains `pos`. Approximate near row seams; may
    /// return coordinates outside the grid.
    pub fn nearest_cell(&self, pos: Vec2) -> Coord {
        let row = ((pos.y - self.origin.y) / self.cell_size).floor() as i32;
        let col = ((pos.x - self.origin.x - self.row_offset(row)) / self.cell_size).floor() as i32;
        Coord::new(col, row)
    }
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::from_config(&GridConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_even_row_center() {
        let g = GridGeometry::default();
        assert_eq!(g.cell_center(Coord::new(0, 0)), Vec2::new(22.5, 122.5));
        assert_eq!(g.cell_center(Coord::new(4, 4)), Vec2::new(202.5, 302.5));
    }

    #[test]
    fn test_odd_row_is_offset() {
        let g = GridGeometry::default();
        let even = g.cell_center(Coord::new(2, 2));
        let odd = g.cell_center(Coord::new(2, 3));
        assert_eq!(odd.x - even.x, 22.5);
        assert_eq!(odd.y - even.y, 45.0);
    }

    #[test]
    fn test_nearest_cell_outside_grid() {
        let g = GridGeometry::default();
        assert_eq!(g.nearest_cell(Vec2::new(10.0, 50.0)).row, -2);
        assert_eq!(g.nearest_cell(Vec2::new(-30.0, 122.5)).col, -1);
    }

    proptest! {
        #[test]
        fn prop_round_trip(col in 0i32..8, row in 0i32..12) {
            let g = GridGeometry::default();
            let coord = Coord::new(col, row);
            prop_assert_eq!(g.nearest_cell(g.cell_center(coord)), coord);
        }

        #[test]
        fn prop_round_trip_with_jitter(col in 0i32..8, row in 0i32..12, dx in -20.0f32..20.0, dy in -20.0f32..20.0) {
            let g = GridGeometry::default();
            let coord = Coord::new(col, row);
            let pos = g.cell_center(coord) + Vec2::new(dx, dy);
            prop_assert_eq!(g.nearest_cell(pos), coord);
        }
    }
}
