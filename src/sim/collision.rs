//! Collision detection and response for the projectile
//!
//! Walls and ceiling are axis-aligned, pieces are circles. Response is a
//! single lossy reflection per axis per tick with no sub-stepping, so a large
//! overshoot is simply clamped back inside.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use super::piece::PieceId;

/// Which boundary was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    LeftWall,
    RightWall,
    Ceiling,
}

/// Result of a boundary check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    pub surface: Surface,
    /// Surface normal pointing back into the field
    pub normal: Vec2,
    /// How far past the boundary the piece went
    pub penetration: f32,
}

/// Side wall the circle touches, if any. Left wins when the field is
/// narrower than the piece.
pub fn side_wall_contact(pos: Vec2, radius: f32, field_width: f32) -> Option<WallContact> {
    if pos.x <= radius {
        Some(WallContact {
            surface: Surface::LeftWall,
            normal: Vec2::X,
            penetration: radius - pos.x,
        })
    } else if pos.x >= field_width - radius {
        Some(WallContact {
            surface: Surface::RightWall,
            normal: Vec2::NEG_X,
            penetration: pos.x - (field_width - radius),
        })
    } else {
        None
    }
}

/// Ceiling contact (y = 0 is the top of the field)
pub fn ceiling_contact(pos: Vec2, radius: f32) -> Option<WallContact> {
    (pos.y <= radius).then(|| WallContact {
        surface: Surface::Ceiling,
        normal: Vec2::Y,
        penetration: radius - pos.y,
    })
}

/// Reverse the velocity component along `normal` and keep `bounce` of it.
/// The tangential component is untouched.
#[inline]
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, bounce: f32) -> Vec2 {
    let along = velocity.dot(normal) * normal;
    velocity - along - along * bounce
}

/// Overlap test with the forgiving shrink factor
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32, shrink: f32) -> bool {
    a.distance(b) < (ra + rb) * shrink
}

/// Placed pieces overlapped by a projectile at `pos`, in row-major order
pub fn grid_contacts(grid: &Grid, pos: Vec2, radius: f32, piece_radius: f32, shrink: f32) -> Vec<PieceId> {
    grid.iter()
        .filter(|p| circles_overlap(pos, radius, p.pos, piece_radius, shrink))
        .map(|p| p.id)
        .collect()
}

/// Advance one fixed step: integrate, then resolve at most one side-wall and
/// one ceiling bounce. Returns the surfaces hit this tick.
pub fn integrate(
    pos: &mut Vec2,
    vel: &mut Vec2,
    dt: f32,
    radius: f32,
    field_width: f32,
    bounce: f32,
) -> Vec<Surface> {
    let mut hits = Vec::new();
    *pos += *vel * dt;

    if let Some(contact) = side_wall_contact(*pos, radius, field_width) {
        *vel = bounce_velocity(*vel, contact.normal, bounce);
        pos.x = pos.x.max(radius).min(field_width - radius);
        hits.push(contact.surface);
    }

    if let Some(contact) = ceiling_contact(*pos, radius) {
        *vel = bounce_velocity(*vel, contact.normal, bounce);
        pos.y = radius;
        hits.push(contact.surface);
    }

    hits
}
