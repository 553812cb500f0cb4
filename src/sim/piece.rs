//! Pieces and their colors

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hex::Coord;

/// Grape varieties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Aglianico,
    Fiano,
    Greco,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Aglianico, Color::Fiano, Color::Greco];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Aglianico => "aglianico",
            Color::Fiano => "fiano",
            Color::Greco => "greco",
        }
    }
}

/// What a piece is. Stained pieces keep their variety for display but can
/// never take part in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceKind {
    Normal(Color),
    Stained(Color),
}

impl PieceKind {
    /// Color used for matching, `None` for pieces that never match
    #[inline]
    pub fn matchable_color(&self) -> Option<Color> {
        match self {
            PieceKind::Normal(color) => Some(*color),
            PieceKind::Stained(_) => None,
        }
    }

    #[inline]
    pub fn is_stained(&self) -> bool {
        matches!(self, PieceKind::Stained(_))
    }

    /// Underlying variety, stained or not
    pub fn color(&self) -> Color {
        match self {
            PieceKind::Normal(color) | PieceKind::Stained(color) => *color,
        }
    }

    /// True when both pieces are matchable and share a color
    #[inline]
    pub fn matches(&self, other: &PieceKind) -> bool {
        match (self.matchable_color(), other.matchable_color()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Stable identity of a piece across its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

/// Hands out piece ids, shared by the level loader and the launcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieceIds {
    next: u32,
}

impl Default for PieceIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl PieceIds {
    pub fn allocate(&mut self) -> PieceId {
        let id = PieceId(self.next);
        self.next += 1;
        id
    }
}

/// A grape. Where it lives (launcher slot, flight, grid) decides its state;
/// `grid_coord` is set only while the grid owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    /// World position (cell center once placed)
    pub pos: Vec2,
    pub grid_coord: Option<Coord>,
}

impl Piece {
    pub fn new(id: PieceId, kind: PieceKind) -> Self {
        Self {
            id,
            kind,
            pos: Vec2::ZERO,
            grid_coord: None,
        }
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.grid_coord.is_some()
    }

    #[inline]
    pub fn is_stained(&self) -> bool {
        self.kind.is_stained()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stained_never_matches() {
        let stained = PieceKind::Stained(Color::Fiano);
        let normal = PieceKind::Normal(Color::Fiano);
        assert!(!stained.matches(&normal));
        assert!(!normal.matches(&stained));
        assert!(!stained.matches(&stained));
        assert_eq!(stained.matchable_color(), None);
        assert_eq!(stained.color(), Color::Fiano);
    }

    #[test]
    fn test_normal_matches_same_color_only() {
        let a = PieceKind::Normal(Color::Greco);
        assert!(a.matches(&PieceKind::Normal(Color::Greco)));
        assert!(!a.matches(&PieceKind::Normal(Color::Aglianico)));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids = PieceIds::default();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
