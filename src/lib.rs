//! Vendemmia - a hex-grid grape shooter core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, matching, launcher, resolution)
//! - `config`: Data-driven game tuning
//! - `level`: Level records, loading and fallback generation
//! - `driver`: Fixed-step frame driver
//! - `autoplay`: Demo AI used by the headless runner

pub mod autoplay;
pub mod config;
pub mod driver;
pub mod level;
pub mod sim;

pub use config::GameConfig;
pub use driver::FrameDriver;
pub use level::{LevelData, PlacementRecord};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted by the driver (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default grid dimensions
    pub const GRID_COLS: i32 = 8;
    pub const GRID_ROWS: i32 = 12;
    pub const CELL_SIZE: f32 = 45.0;
    /// Top of the grid in world space
    pub const GRID_START_Y: f32 = 100.0;

    /// Playfield (portrait phone) dimensions
    pub const FIELD_WIDTH: f32 = 375.0;
    pub const FIELD_HEIGHT: f32 = 667.0;

    /// Pieces are drawn at 80% of a cell
    pub const PIECE_RADIUS: f32 = CELL_SIZE * 0.8 / 2.0;

    /// Smallest cluster that pops
    pub const MIN_MATCH_SIZE: usize = 3;
}

/// Clamp `value` into `[min, max]` without panicking on inverted bounds
#[inline]
pub fn clamp_f32(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Unit vector from `from` toward `to`, or `None` when they coincide
#[inline]
pub fn direction_between(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    let length = delta.length();
    if length > 0.0 {
        Some(delta / length)
    } else {
        None
    }
}
