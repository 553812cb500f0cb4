//! Match resolution: what pops, what drops, how much it scores

use super::grid::Grid;
use super::hex::Coord;
use super::piece::Piece;
use crate::config::ScoringConfig;

/// Everything one placement caused
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementOutcome {
    /// Pieces popped by the match (empty below the threshold)
    pub matched: Vec<Piece>,
    /// Pieces detached because they lost their path to the ceiling
    pub dropped: Vec<Piece>,
    pub score_delta: u64,
    /// No stained pieces left after a successful match
    pub level_complete: bool,
    /// A piece rests in or below the danger row
    pub game_over: bool,
}

impl PlacementOutcome {
    pub fn popped(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// Points for a popped cluster of `size`
pub fn match_score(size: usize, scoring: &ScoringConfig) -> u64 {
    if size < scoring.min_match_size {
        return 0;
    }
    let mut score = size as u64 * scoring.points_per_piece;
    if size >= scoring.large_match_threshold {
        score += scoring.large_match_bonus;
    }
    score
}

/// Points for detached pieces
pub fn drop_score(dropped: &[Piece], scoring: &ScoringConfig) -> u64 {
    dropped
        .iter()
        .map(|piece| {
            if piece.is_stained() {
                scoring.points_per_drop + scoring.stained_drop_bonus
            } else {
                scoring.points_per_drop
            }
        })
        .sum()
}

/// True if any piece sits at or below `danger_row`
pub fn danger_reached(grid: &Grid, danger_row: i32) -> bool {
    grid.any_at_or_below(danger_row)
}

/// Resolve the piece just placed at `placed`. Runs to completion inside the
/// calling tick.
pub fn process_placement(grid: &mut Grid, placed: Coord, scoring: &ScoringConfig, danger_row: i32) -> PlacementOutcome {
    let mut outcome = PlacementOutcome::default();
    let matches = grid.find_matches(placed);

    if matches.len() >= scoring.min_match_size {
        outcome.matched = matches
            .iter()
            .filter_map(|&coord| grid.remove_at(coord))
            .collect();
        outcome.score_delta = match_score(outcome.matched.len(), scoring);

        outcome.dropped = grid.find_floating_clusters();
        outcome.score_delta += drop_score(&outcome.dropped, scoring);

        outcome.level_complete = grid.stained_count() == 0;
        log::info!(
            "Processed {} matches, {} drops. Score: {}",
            outcome.matched.len(),
            outcome.dropped.len(),
            outcome.score_delta
        );
    }

    outcome.game_over = danger_reached(grid, danger_row);
    outcome
}
