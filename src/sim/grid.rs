//! The playing field
//!
//! Flat row-major storage of optional pieces. The grid exclusively owns every
//! placed piece; a slot holds a piece iff that piece's `grid_coord` names the
//! slot.

use std::collections::VecDeque;

use glam::Vec2;
use thiserror::Error;

use super::geometry::GridGeometry;
use super::hex::{self, Coord};
use super::piece::{Color, Piece, PieceId};
use crate::config::GridConfig;

/// Why a placement was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("cell {0} is outside the grid")]
    OutOfBounds(Coord),
    #[error("cell {0} is already occupied")]
    Occupied(Coord),
}

/// A refused placement hands the piece back untouched
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason}")]
pub struct PlacementRejected {
    pub piece: Piece,
    pub reason: PlaceError,
}

/// Offset hex grid of `rows × cols` cells
#[derive(Debug, Clone)]
pub struct Grid {
    cols: i32,
    rows: i32,
    geometry: GridGeometry,
    cells: Vec<Option<Piece>>,
}

impl Grid {
    pub fn new(cols: i32, rows: i32, geometry: GridGeometry) -> Self {
        let size = (cols.max(0) * rows.max(0)) as usize;
        Self {
            cols,
            rows,
            geometry,
            cells: vec![None; size],
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.cols, config.rows, GridGeometry::from_config(config))
    }

    #[inline]
    fn index(&self, coord: Coord) -> Option<usize> {
        if !self.in_bounds(coord) {
            return None;
        }
        Some((coord.row * self.cols + coord.col) as usize)
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    #[inline]
    pub fn in_bounds(&self, coord: Coord) -> bool {
        hex::in_bounds(coord, self.cols, self.rows)
    }

    /// In-bounds neighbors of `coord`
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> {
        hex::neighbors(coord, self.cols, self.rows)
    }

    /// Piece at `coord`, `None` when empty or out of bounds
    pub fn get(&self, coord: Coord) -> Option<&Piece> {
        self.index(coord).and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.get(coord).is_some()
    }

    /// Place `piece` into an empty in-bounds cell
    pub fn place_at(&mut self, mut piece: Piece, coord: Coord) -> Result<(), PlacementRejected> {
        let Some(idx) = self.index(coord) else {
            log::warn!("Invalid grid position: {coord}");
            return Err(PlacementRejected {
                piece,
                reason: PlaceError::OutOfBounds(coord),
            });
        };
        if self.cells[idx].is_some() {
            log::warn!("Grid position {coord} already occupied");
            return Err(PlacementRejected {
                piece,
                reason: PlaceError::Occupied(coord),
            });
        }

        piece.grid_coord = Some(coord);
        piece.pos = self.geometry.cell_center(coord);
        self.cells[idx] = Some(piece);
        Ok(())
    }

    /// Take the piece out of `coord`
    pub fn remove_at(&mut self, coord: Coord) -> Option<Piece> {
        let idx = self.index(coord)?;
        let mut piece = self.cells[idx].take()?;
        piece.grid_coord = None;
        Some(piece)
    }

    /// Remove a piece by identity; `None` if the grid does not hold it
    pub fn remove_piece(&mut self, id: PieceId) -> Option<Piece> {
        let coord = self.iter().find(|p| p.id == id)?.grid_coord?;
        self.remove_at(coord)
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }

    /// Placed pieces in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.cells.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Number of placed stained pieces
    pub fn stained_count(&self) -> usize {
        self.iter().filter(|p| p.is_stained()).count()
    }

    /// Distinct matchable colors currently placed, in `Color` order
    pub fn colors_present(&self) -> Vec<Color> {
        let mut colors: Vec<Color> = self.iter().filter_map(|p| p.kind.matchable_color()).collect();
        colors.sort();
        colors.dedup();
        colors
    }

    /// True if any cell at or below `row` is occupied
    pub fn any_at_or_below(&self, row: i32) -> bool {
        self.iter()
            .filter_map(|p| p.grid_coord)
            .any(|c| c.row >= row)
    }

    /// Empty cell whose center is closest to `pos`. Row-major scan; the first
    /// cell found wins ties.
    pub fn nearest_empty_cell(&self, pos: Vec2) -> Option<Coord> {
        let mut best: Option<(Coord, f32)> = None;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let coord = Coord::new(col, row);
                if self.is_occupied(coord) {
                    continue;
                }
                let distance = self.geometry.cell_center(coord).distance(pos);
                if best.is_none_or(|(_, d)| distance < d) {
                    best = Some((coord, distance));
                }
            }
        }
        best.map(|(coord, _)| coord)
    }

    /// Same-color cluster containing `start`, in BFS order, seed first.
    /// Empty when `start` is empty or stained.
    pub fn find_matches(&self, start: Coord) -> Vec<Coord> {
        let Some(seed) = self.get(start) else {
            return Vec::new();
        };
        if seed.kind.matchable_color().is_none() {
            return Vec::new();
        }
        let kind = seed.kind;

        let mut visited = vec![false; self.cells.len()];
        let mut matches = Vec::new();
        let mut queue = VecDeque::new();
        if let Some(idx) = self.index(start) {
            visited[idx] = true;
        }
        queue.push_back(start);

        while let Some(coord) = queue.pop_front() {
            matches.push(coord);
            for next in self.neighbors(coord) {
                let Some(idx) = self.index(next) else {
                    continue;
                };
                if visited[idx] {
                    continue;
                }
                if self.cells[idx].as_ref().is_some_and(|p| p.kind.matches(&kind)) {
                    visited[idx] = true;
                    queue.push_back(next);
                }
            }
        }

        log::debug!("Found {} matching pieces from {start}", matches.len());
        matches
    }

    /// Occupied cells with no occupied path to row 0
    pub fn floating_coords(&self) -> Vec<Coord> {
        let mut anchored = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();

        for col in 0..self.cols {
            let coord = Coord::new(col, 0);
            if let Some(idx) = self.index(coord) {
                if self.cells[idx].is_some() {
                    anchored[idx] = true;
                    queue.push_back(coord);
                }
            }
        }

        while let Some(coord) = queue.pop_front() {
            for next in self.neighbors(coord) {
                let Some(idx) = self.index(next) else {
                    continue;
                };
                if !anchored[idx] && self.cells[idx].is_some() {
                    anchored[idx] = true;
                    queue.push_back(next);
                }
            }
        }

        self.iter()
            .filter_map(|p| p.grid_coord)
            .filter(|&c| self.index(c).is_some_and(|idx| !anchored[idx]))
            .collect()
    }

    /// Detach and return every floating piece (row-major order). The grid no
    /// longer holds them when this returns.
    pub fn find_floating_clusters(&mut self) -> Vec<Piece> {
        let floating: Vec<Piece> = self
            .floating_coords()
            .into_iter()
            .filter_map(|coord| self.remove_at(coord))
            .collect();
        log::debug!("Found {} floating pieces", floating.len());
        floating
    }

    /// Check the slot/coordinate bijection
    pub fn check_invariants(&self) -> bool {
        self.cells.iter().enumerate().all(|(idx, cell)| match cell {
            None => true,
            Some(piece) => piece
                .grid_coord
                .and_then(|c| self.index(c))
                .is_some_and(|i| i == idx),
        })
    }
}
