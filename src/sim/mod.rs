//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (row-major over the grid)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod grid;
pub mod hex;
pub mod launcher;
pub mod piece;
pub mod resolve;
pub mod state;
pub mod tick;

pub use collision::Surface;
pub use geometry::GridGeometry;
pub use grid::{Grid, PlaceError, PlacementRejected};
pub use hex::Coord;
pub use launcher::{FlightStep, Launcher, LauncherState, Projectile};
pub use piece::{Color, Piece, PieceId, PieceIds, PieceKind};
pub use resolve::{PlacementOutcome, process_placement};
pub use state::{DiscardReason, FallingPiece, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
