//! Demo mode - AI plays the game
//!
//! Used by the headless runner. Purely a function of the state, so runs stay
//! reproducible for a given seed.

use glam::Vec2;

use crate::sim::{GamePhase, GameState, TickInput};

/// Pick this tick's input: aim and fire whenever the launcher is armed
pub fn choose_input(state: &GameState) -> TickInput {
    if state.phase != GamePhase::Playing || !state.launcher.is_armed() {
        return TickInput::default();
    }
    let Some(loaded) = state.launcher.loaded() else {
        return TickInput::default();
    };

    // Lowest reachable piece of the same color
    let target = state
        .grid
        .iter()
        .filter(|p| p.kind.matches(&loaded.kind))
        .filter(|p| state.launcher.in_aiming_area(p.pos))
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|p| p.pos);

    let aim = target.unwrap_or_else(|| sweep_target(state));
    TickInput {
        aim: Some(aim),
        fire: true,
        ..Default::default()
    }
}

/// Deterministic side-to-side sweep when nothing matches
fn sweep_target(state: &GameState) -> Vec2 {
    let width = state.config.field.width;
    let time_factor = state.time_ticks as f32 * 0.01;
    // Oscillating offset to avoid perfect loops
    let sway = time_factor.sin() * 0.4 + (time_factor * 0.7).sin() * 0.1;
    let x = width * (0.5 + sway * 0.8);
    let y = state.config.aim_limit_y() * 0.5;
    Vec2::new(x.clamp(0.0, width), y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, LauncherConfig};
    use crate::level::{LevelData, PieceType, PlacementRecord};
    use crate::sim::{Color, tick};

    fn biased() -> GameConfig {
        GameConfig {
            launcher: LauncherConfig {
                present_color_bias: 1.0,
                ..LauncherConfig::default()
            },
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_targets_lowest_matching_piece() {
        let mut state = GameState::new(biased(), 9);
        state.load_level(LevelData {
            level: 1,
            pieces: vec![
                PlacementRecord::new(1, 0, Color::Greco, PieceType::Normal),
                PlacementRecord::new(5, 2, Color::Greco, PieceType::Normal),
                PlacementRecord::new(2, 4, Color::Greco, PieceType::Stained),
            ],
            narrative: None,
        });

        let input = choose_input(&state);
        assert!(input.fire);
        let expected = state.grid.geometry().cell_center(crate::sim::Coord::new(5, 2));
        assert_eq!(input.aim, Some(expected));
    }

    #[test]
    fn test_waits_while_not_armed() {
        let mut state = GameState::new(biased(), 9);
        state.load_level(LevelData {
            level: 1,
            pieces: vec![PlacementRecord::new(1, 0, Color::Greco, PieceType::Stained)],
            narrative: None,
        });
        let input = choose_input(&state);
        assert!(input.fire);
        tick(&mut state, &input, crate::consts::SIM_DT);

        let next = choose_input(&state);
        assert!(!next.fire);
        assert!(next.aim.is_none());
    }

    #[test]
    fn test_sweep_stays_in_aiming_area() {
        let mut state = GameState::new(GameConfig::default(), 9);
        state.load_level(LevelData::default());
        for t in (0..5000).step_by(37) {
            state.time_ticks = t;
            let aim = sweep_target(&state);
            assert!(state.launcher.in_aiming_area(aim));
            assert!(aim.x >= 0.0 && aim.x <= state.config.field.width);
        }
    }
}
