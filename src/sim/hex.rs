//! Offset-row adjacency
//!
//! Odd rows sit half a cell to the right of even rows, so each cell touches
//! two cells above, two beside and two below. Which two depends on parity.

use serde::{Deserialize, Serialize};

/// A cell address. Signed so neighbor offsets can step outside the grid
/// before being filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub col: i32,
    pub row: i32,
}

impl Coord {
    #[inline]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    #[inline]
    pub fn is_odd_row(&self) -> bool {
        self.row.rem_euclid(2) == 1
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// (dx, dy) for cells in even rows: up-left, up, left, right, down-left, down
pub const EVEN_ROW_OFFSETS: [(i32, i32); 6] = [(-1, -1), (0, -1), (-1, 0), (1, 0), (-1, 1), (0, 1)];

/// (dx, dy) for cells in odd rows: up, up-right, left, right, down, down-right
pub const ODD_ROW_OFFSETS: [(i32, i32); 6] = [(0, -1), (1, -1), (-1, 0), (1, 0), (0, 1), (1, 1)];

/// True if `coord` lies within `[0, cols) × [0, rows)`
#[inline]
pub fn in_bounds(coord: Coord, cols: i32, rows: i32) -> bool {
    coord.col >= 0 && coord.col < cols && coord.row >= 0 && coord.row < rows
}

/// In-bounds neighbors of `coord`. Every grid search goes through here.
pub fn neighbors(coord: Coord, cols: i32, rows: i32) -> impl Iterator<Item = Coord> {
    let offsets = if coord.is_odd_row() {
        ODD_ROW_OFFSETS
    } else {
        EVEN_ROW_OFFSETS
    };
    offsets
        .into_iter()
        .map(move |(dx, dy)| Coord::new(coord.col + dx, coord.row + dy))
        .filter(move |&c| in_bounds(c, cols, rows))
}
