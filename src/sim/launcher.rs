//! The launcher: aiming, firing and the in-flight projectile
//!
//! State machine:
//! `Idle → Aiming → InFlight → Resolving → Cooldown → Idle`.
//! `Idle` and `Aiming` are the armed states. Flight advances only when the
//! owning tick calls [`Launcher::step`], so pausing the tick freezes it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{self, Surface};
use super::grid::Grid;
use super::piece::{Color, Piece, PieceId, PieceIds, PieceKind};
use crate::config::{FieldConfig, GameConfig, LauncherConfig, PhysicsConfig};
use crate::{clamp_f32, direction_between};

/// Launcher phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LauncherState {
    /// Piece loaded, no aim yet
    Idle,
    /// Piece loaded and aimed
    Aiming,
    /// Projectile moving
    InFlight,
    /// Projectile stopped, waiting for the grid to take it
    Resolving,
    /// Reloading
    Cooldown { ticks_left: u32 },
}

/// The fired piece and its velocity
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub piece: Piece,
    pub vel: Vec2,
}

/// What one flight step produced
#[derive(Debug, Clone, PartialEq)]
pub enum FlightStep {
    /// Nothing in flight
    Idle,
    Moving { bounces: Vec<Surface> },
    /// Overlapping placed pieces; resolve at the current position
    Contact {
        bounces: Vec<Surface>,
        touching: Vec<PieceId>,
    },
    /// Too slow without touching anything; resolve where it is
    Stalled { bounces: Vec<Surface> },
    /// Dropped below the field
    Lost,
}

/// Aim, fire and fly one piece at a time
#[derive(Debug, Clone)]
pub struct Launcher {
    config: LauncherConfig,
    physics: PhysicsConfig,
    field: FieldConfig,
    base: Vec2,
    muzzle: Vec2,
    aim_limit_y: f32,
    state: LauncherState,
    aim_dir: Vec2,
    aim_power: f32,
    loaded: Option<Piece>,
    next: Option<Piece>,
    projectile: Option<Projectile>,
    rng: Pcg32,
}

impl Launcher {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self {
            config: config.launcher,
            physics: config.physics,
            field: config.field,
            base: config.launch_base(),
            muzzle: config.muzzle(),
            aim_limit_y: config.aim_limit_y(),
            state: LauncherState::Cooldown { ticks_left: 0 },
            aim_dir: Vec2::NEG_Y,
            aim_power: 1.0,
            loaded: None,
            next: None,
            projectile: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Drop everything and arm with fresh pieces biased toward `grid`
    pub fn reset(&mut self, ids: &mut PieceIds, grid: &Grid) {
        self.projectile = None;
        self.loaded = None;
        self.next = Some(self.generate_piece(ids, grid));
        self.aim_dir = Vec2::NEG_Y;
        self.aim_power = 1.0;
        self.promote_next(ids, grid);
    }

    /// New normal piece. With the configured bias it takes a color already
    /// in the grid, otherwise any color.
    pub fn generate_piece(&mut self, ids: &mut PieceIds, grid: &Grid) -> Piece {
        let present = grid.colors_present();
        let color = if !present.is_empty() && self.rng.random::<f32>() < self.config.present_color_bias {
            present[self.rng.random_range(0..present.len())]
        } else {
            Color::ALL[self.rng.random_range(0..Color::ALL.len())]
        };
        let mut piece = Piece::new(ids.allocate(), PieceKind::Normal(color));
        piece.pos = self.muzzle;
        piece
    }

    fn promote_next(&mut self, ids: &mut PieceIds, grid: &Grid) {
        let mut loaded = match self.next.take() {
            Some(piece) => piece,
            None => self.generate_piece(ids, grid),
        };
        loaded.pos = self.muzzle;
        self.loaded = Some(loaded);
        self.next = Some(self.generate_piece(ids, grid));
        self.state = LauncherState::Idle;
        log::debug!("Next piece loaded");
    }

    pub fn state(&self) -> LauncherState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, LauncherState::Idle | LauncherState::Aiming) && self.loaded.is_some()
    }

    pub fn loaded(&self) -> Option<&Piece> {
        self.loaded.as_ref()
    }

    pub fn next_piece(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    pub fn projectile(&self) -> Option<&Projectile> {
        self.projectile.as_ref()
    }

    pub fn aim_direction(&self) -> Vec2 {
        self.aim_dir
    }

    pub fn aim_power(&self) -> f32 {
        self.aim_power
    }

    pub fn base(&self) -> Vec2 {
        self.base
    }

    /// True if a pointer at `target` may aim
    pub fn in_aiming_area(&self, target: Vec2) -> bool {
        target.y < self.aim_limit_y
    }

    /// Point the launcher at `target`. Ignored unless armed and the pointer
    /// is in the upper aiming half.
    pub fn aim(&mut self, target: Vec2) -> bool {
        if !self.is_armed() || !self.in_aiming_area(target) {
            return false;
        }

        let distance = target.distance(self.base);
        if let Some(dir) = direction_between(self.base, target) {
            // Never aim down into the launcher
            self.aim_dir = Vec2::new(dir.x, dir.y.min(self.config.max_aim_y));
        }
        self.aim_power = clamp_f32(
            distance / self.config.power_distance,
            self.config.min_power,
            self.config.max_power,
        );
        self.state = LauncherState::Aiming;
        log::debug!("Aiming at {target} with power {:.2}", self.aim_power);
        true
    }

    /// Launch the loaded piece along the current aim
    pub fn fire(&mut self) -> bool {
        if !self.is_armed() {
            log::warn!("Cannot fire: not ready");
            return false;
        }
        let Some(mut piece) = self.loaded.take() else {
            return false;
        };

        let vel = self.aim_dir * self.aim_power * self.physics.shoot_speed;
        piece.pos = self.muzzle;
        piece.grid_coord = None;
        self.projectile = Some(Projectile { piece, vel });
        self.state = LauncherState::InFlight;
        log::info!("Piece fired with velocity ({:.2}, {:.2})", vel.x, vel.y);
        true
    }

    /// Advance the projectile one fixed step and test it against `grid`
    pub fn step(&mut self, grid: &Grid, dt: f32) -> FlightStep {
        if self.state != LauncherState::InFlight {
            return FlightStep::Idle;
        }
        let Some(projectile) = self.projectile.as_mut() else {
            return FlightStep::Idle;
        };

        let radius = self.physics.piece_radius;
        let bounces = collision::integrate(
            &mut projectile.piece.pos,
            &mut projectile.vel,
            dt,
            radius,
            self.field.width,
            self.physics.bounce,
        );
        for surface in &bounces {
            log::debug!("Projectile bounced off {surface:?}");
        }

        let touching = collision::grid_contacts(
            grid,
            projectile.piece.pos,
            radius,
            self.physics.piece_radius,
            self.physics.collision_shrink,
        );
        if !touching.is_empty() {
            self.state = LauncherState::Resolving;
            return FlightStep::Contact { bounces, touching };
        }

        if projectile.vel.length() < self.physics.min_speed {
            log::debug!("Projectile stalled at {}", projectile.piece.pos);
            self.state = LauncherState::Resolving;
            return FlightStep::Stalled { bounces };
        }

        if projectile.piece.pos.y > self.field.height + radius {
            self.state = LauncherState::Resolving;
            return FlightStep::Lost;
        }

        FlightStep::Moving { bounces }
    }

    /// Hand the stopped projectile over for placement. Velocity is dropped.
    pub fn take_landing(&mut self) -> Option<Piece> {
        if self.state != LauncherState::Resolving {
            return None;
        }
        self.projectile.take().map(|p| p.piece)
    }

    /// Start reloading once the landing has been resolved
    pub fn begin_cooldown(&mut self) {
        self.projectile = None;
        self.state = LauncherState::Cooldown {
            ticks_left: self.config.reload_ticks,
        };
    }

    /// Count down the reload. Returns true on the tick a piece is armed.
    pub fn tick_cooldown(&mut self, ids: &mut PieceIds, grid: &Grid) -> bool {
        let LauncherState::Cooldown { ticks_left } = self.state else {
            return false;
        };
        if ticks_left > 1 {
            self.state = LauncherState::Cooldown {
                ticks_left: ticks_left - 1,
            };
            return false;
        }
        self.promote_next(ids, grid);
        true
    }

    /// Dashed aim guide: every other segment of `segments` slices over
    /// `max_distance`, stopping at the top or side of the field
    pub fn trajectory_preview(&self, segments: u32, max_distance: f32) -> Vec<(Vec2, Vec2)> {
        let mut dashes = Vec::new();
        if segments == 0 {
            return dashes;
        }
        let step = max_distance / segments as f32;
        for i in 0..segments {
            if i % 2 == 0 {
                continue;
            }
            let start = self.base + self.aim_dir * (i as f32 * step);
            let end = self.base + self.aim_dir * ((i + 1) as f32 * step);
            if start.y < 0.0 || start.x < 0.0 || start.x > self.field.width {
                break;
            }
            dashes.push((start, end));
        }
        dashes
    }
}
