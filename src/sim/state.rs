//! Game state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Surface;
use super::grid::Grid;
use super::hex::Coord;
use super::launcher::Launcher;
use super::piece::{Piece, PieceId, PieceIds};
use crate::config::GameConfig;
use crate::level::{LevelData, PopulateReport};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Every stained piece is gone
    LevelComplete,
    /// A piece reached the danger row
    GameOver,
    /// The final level was cleared
    GameComplete,
}

/// Why a fired piece never reached the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardReason {
    /// No empty cell left to land in
    NoLandingSite,
    /// Dropped out of the bottom of the field
    LeftField,
}

/// Everything presentation needs to hear about
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PieceLoaded { piece: PieceId },
    Fired { piece: PieceId, velocity: Vec2 },
    Bounced { surface: Surface },
    PiecePlaced { coord: Coord, piece: Piece },
    MatchResolved { removed: Vec<Piece>, score_delta: u64 },
    ClusterDetached { pieces: Vec<Piece> },
    PieceDiscarded { piece: Piece, reason: DiscardReason },
    PieceFellOff { piece: PieceId },
    ScoreChanged { delta: u64, total: u64 },
    Paused,
    Resumed,
    LevelComplete { level: u32, bonus: u64 },
    GameOver,
    GameComplete { score: u64 },
}

/// A detached piece on its way off screen. Never touches the grid again.
#[derive(Debug, Clone, PartialEq)]
pub struct FallingPiece {
    pub piece: Piece,
    pub vel_y: f32,
}

/// Complete game state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub level: u32,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub grid: Grid,
    pub launcher: Launcher,
    /// Detached pieces still on screen (not gameplay-affecting)
    pub falling: Vec<FallingPiece>,
    /// Level currently loaded, kept for restarts
    pub level_data: LevelData,
    pub(crate) ids: PieceIds,
}

impl GameState {
    /// New run with an empty grid; call [`GameState::load_level`] next
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let grid = Grid::from_config(&config.grid);
        let launcher = Launcher::new(&config, seed);
        Self {
            config,
            seed,
            level: 0,
            score: 0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            grid,
            launcher,
            falling: Vec::new(),
            level_data: LevelData::default(),
            ids: PieceIds::default(),
        }
    }

    /// Replace the grid with `data` and re-arm the launcher. Score is kept.
    pub fn load_level(&mut self, data: LevelData) -> PopulateReport {
        self.grid.clear();
        self.falling.clear();
        let report = self.grid.populate(&data.pieces, &mut self.ids);
        self.launcher.reset(&mut self.ids, &self.grid);
        self.level = data.level;
        self.level_data = data;
        self.phase = GamePhase::Playing;
        log::info!(
            "Level {} loaded: {} pieces, {} stained, {} records skipped",
            self.level,
            self.grid.len(),
            self.grid.stained_count(),
            report.skipped
        );
        report
    }

    /// Load the following level, keeping the score
    pub fn next_level(&mut self, data: LevelData) -> PopulateReport {
        self.load_level(data)
    }

    /// Move on from a cleared level: load the next one through `load`, or
    /// finish the game after the final level
    pub fn advance<F>(&mut self, load: F) -> Vec<GameEvent>
    where
        F: FnOnce(u32) -> LevelData,
    {
        let mut events = Vec::new();
        if self.phase != GamePhase::LevelComplete {
            return events;
        }
        if self.level >= self.config.progression.total_levels {
            let bonus = self.config.progression.game_complete_bonus;
            self.add_score(bonus, &mut events);
            self.phase = GamePhase::GameComplete;
            events.push(GameEvent::GameComplete { score: self.score });
            log::info!("Game completed! Final score: {}", self.score);
        } else {
            self.next_level(load(self.level + 1));
        }
        events
    }

    /// Reload the current level at a score penalty
    pub fn restart_level(&mut self) -> PopulateReport {
        self.score = self.score.saturating_sub(self.config.scoring.restart_penalty);
        let data = self.level_data.clone();
        self.load_level(data)
    }

    /// Placed stained pieces remaining
    pub fn stained_remaining(&self) -> usize {
        self.grid.stained_count()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, GamePhase::Playing | GamePhase::Paused)
    }

    pub(crate) fn add_score(&mut self, delta: u64, events: &mut Vec<GameEvent>) {
        if delta == 0 {
            return;
        }
        self.score += delta;
        events.push(GameEvent::ScoreChanged {
            delta,
            total: self.score,
        });
        log::debug!("Score added: {delta}, Total: {}", self.score);
    }
}
