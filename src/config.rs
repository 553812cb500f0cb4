//! Game tuning
//!
//! One immutable value threaded into the grid and the launcher at
//! construction. Loaded from JSON; every field has a default so partial files
//! work.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Playfield bounds (world space, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
        }
    }
}

/// Grid shape and placement in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cols: i32,
    pub rows: i32,
    pub cell_size: f32,
    /// Top-left corner of cell (0, 0)
    pub origin: Vec2,
    /// First row whose occupation ends the game
    pub danger_row: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            cell_size: CELL_SIZE,
            origin: Vec2::new(0.0, GRID_START_Y),
            // Death line at y = 550 falls on row 10
            danger_row: 10,
        }
    }
}

/// Projectile kinematics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Launch speed at power 1.0 (px/s)
    pub shoot_speed: f32,
    /// Velocity kept (and reversed) on wall/ceiling contact
    pub bounce: f32,
    /// Below this speed a projectile with no contact is resolved in place
    pub min_speed: f32,
    /// Collision radius of a piece
    pub piece_radius: f32,
    /// Contact distance multiplier for forgiving near-misses
    pub collision_shrink: f32,
    /// Fall acceleration of detached pieces (px/s²)
    pub gravity: f32,
    /// How far below the field a falling piece travels before removal
    pub fall_margin: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            shoot_speed: 800.0,
            bounce: 0.3,
            min_speed: 10.0,
            piece_radius: PIECE_RADIUS,
            collision_shrink: 0.9,
            gravity: 300.0,
            fall_margin: 100.0,
        }
    }
}

/// Aiming and reload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Launcher base distance above the bottom of the field
    pub base_offset: f32,
    /// Loaded piece sits this far above the base
    pub muzzle_offset: f32,
    /// Pointer distance that maps to power 1.0
    pub power_distance: f32,
    pub min_power: f32,
    pub max_power: f32,
    /// Most downward vertical aim component allowed (negative = up)
    pub max_aim_y: f32,
    /// Ticks between resolution and the next piece being armed
    pub reload_ticks: u32,
    /// Chance the generated color is one already in the grid
    pub present_color_bias: f32,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            base_offset: 80.0,
            muzzle_offset: 30.0,
            power_distance: 200.0,
            min_power: 0.5,
            max_power: 1.5,
            max_aim_y: -0.1,
            reload_ticks: 30,
            present_color_bias: 0.8,
        }
    }
}

/// Points table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub min_match_size: usize,
    pub points_per_piece: u64,
    pub large_match_threshold: usize,
    pub large_match_bonus: u64,
    pub points_per_drop: u64,
    pub stained_drop_bonus: u64,
    /// Multiplied by the level number
    pub level_complete_bonus: u64,
    pub restart_penalty: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_match_size: MIN_MATCH_SIZE,
            points_per_piece: 10,
            large_match_threshold: 5,
            large_match_bonus: 50,
            points_per_drop: 20,
            stained_drop_bonus: 100,
            level_complete_bonus: 1000,
            restart_penalty: 1000,
        }
    }
}

/// Run length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Clearing this level finishes the game
    pub total_levels: u32,
    /// Awarded once when the final level is cleared
    pub game_complete_bonus: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            total_levels: 10,
            game_complete_bonus: 5000,
        }
    }
}

/// Complete tuning for one run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub field: FieldConfig,
    pub grid: GridConfig,
    pub physics: PhysicsConfig,
    pub launcher: LauncherConfig,
    pub scoring: ScoringConfig,
    pub progression: ProgressionConfig,
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.grid.cols <= 0 || self.grid.rows <= 0 {
            return invalid("grid must have at least one row and column");
        }
        if self.grid.cell_size <= 0.0 {
            return invalid("cell_size must be positive");
        }
        if self.grid.danger_row < 0 || self.grid.danger_row >= self.grid.rows {
            return invalid("danger_row must be inside the grid");
        }
        if self.field.width <= 0.0 || self.field.height <= 0.0 {
            return invalid("field must have positive size");
        }
        if !(0.0..1.0).contains(&self.physics.bounce) {
            return invalid("bounce must be in [0, 1)");
        }
        if self.physics.piece_radius <= 0.0 || self.physics.collision_shrink <= 0.0 {
            return invalid("piece_radius and collision_shrink must be positive");
        }
        if self.launcher.min_power <= 0.0 || self.launcher.min_power > self.launcher.max_power {
            return invalid("power range must be positive and ordered");
        }
        if self.launcher.power_distance <= 0.0 {
            return invalid("power_distance must be positive");
        }
        if !(0.0..=1.0).contains(&self.launcher.present_color_bias) {
            return invalid("present_color_bias must be a probability");
        }
        if self.scoring.min_match_size < 2 {
            return invalid("min_match_size must be at least 2");
        }
        if self.progression.total_levels == 0 {
            return invalid("total_levels must be at least 1");
        }
        Ok(())
    }

    /// Where the launcher base sits
    pub fn launch_base(&self) -> Vec2 {
        Vec2::new(
            self.field.width / 2.0,
            self.field.height - self.launcher.base_offset,
        )
    }

    /// Where a fired piece starts its flight
    pub fn muzzle(&self) -> Vec2 {
        self.launch_base() - Vec2::new(0.0, self.launcher.muzzle_offset)
    }

    /// Pointer positions above this line may aim
    pub fn aim_limit_y(&self) -> f32 {
        self.field.height / 2.0
    }
}
