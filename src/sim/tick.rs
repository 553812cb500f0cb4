//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. One call is one
//! step of the launcher, the grid and the falling pieces; a placement and its
//! resolution always complete inside the tick that produced them.

use glam::Vec2;

use super::launcher::FlightStep;
use super::resolve::{self, PlacementOutcome};
use super::state::{DiscardReason, FallingPiece, GameEvent, GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position to aim at (world space)
    pub aim: Option<Vec2>,
    /// Fire the loaded piece
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                events.push(GameEvent::Paused);
                return events;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    if state.phase != GamePhase::Playing {
        return events;
    }
    state.time_ticks += 1;

    if let Some(target) = input.aim {
        state.launcher.aim(target);
    }

    if input.fire {
        let loaded = state.launcher.loaded().map(|p| p.id);
        if state.launcher.fire() {
            if let (Some(piece), Some(projectile)) = (loaded, state.launcher.projectile()) {
                events.push(GameEvent::Fired {
                    piece,
                    velocity: projectile.vel,
                });
            }
        }
    }

    if state.launcher.tick_cooldown(&mut state.ids, &state.grid) {
        if let Some(piece) = state.launcher.loaded() {
            events.push(GameEvent::PieceLoaded { piece: piece.id });
        }
    }

    match state.launcher.step(&state.grid, dt) {
        FlightStep::Idle => {}
        FlightStep::Moving { bounces } => {
            events.extend(bounces.into_iter().map(|surface| GameEvent::Bounced { surface }));
        }
        FlightStep::Contact { bounces, .. } | FlightStep::Stalled { bounces } => {
            events.extend(bounces.into_iter().map(|surface| GameEvent::Bounced { surface }));
            land_projectile(state, &mut events);
        }
        FlightStep::Lost => {
            if let Some(piece) = state.launcher.take_landing() {
                log::warn!("Piece {:?} left the field", piece.id);
                events.push(GameEvent::PieceDiscarded {
                    piece,
                    reason: DiscardReason::LeftField,
                });
            }
            state.launcher.begin_cooldown();
        }
    }

    update_falling(state, dt, &mut events);

    // Resting pieces are checked every frame, not only on placement
    if state.phase == GamePhase::Playing {
        if state.grid.stained_count() == 0 {
            enter_level_complete(state, &mut events);
        } else if resolve::danger_reached(&state.grid, state.config.grid.danger_row) {
            enter_game_over(state, &mut events);
        }
    }

    events
}

/// Snap the stopped projectile into the grid and resolve it
fn land_projectile(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let Some(piece) = state.launcher.take_landing() else {
        return;
    };

    let Some(coord) = state.grid.nearest_empty_cell(piece.pos) else {
        log::warn!("No landing site for piece {:?}, discarding", piece.id);
        events.push(GameEvent::PieceDiscarded {
            piece,
            reason: DiscardReason::NoLandingSite,
        });
        state.launcher.begin_cooldown();
        return;
    };

    match state.grid.place_at(piece, coord) {
        Ok(()) => {
            if let Some(placed) = state.grid.get(coord) {
                events.push(GameEvent::PiecePlaced {
                    coord,
                    piece: placed.clone(),
                });
            }
            let scoring = state.config.scoring;
            let outcome = resolve::process_placement(&mut state.grid, coord, &scoring, state.config.grid.danger_row);
            apply_outcome(state, outcome, events);
        }
        Err(rejected) => {
            events.push(GameEvent::PieceDiscarded {
                piece: rejected.piece,
                reason: DiscardReason::NoLandingSite,
            });
        }
    }

    state.launcher.begin_cooldown();
}

/// Turn a resolved placement into score, falling pieces and phase changes
fn apply_outcome(state: &mut GameState, outcome: PlacementOutcome, events: &mut Vec<GameEvent>) {
    if outcome.popped() {
        events.push(GameEvent::MatchResolved {
            removed: outcome.matched,
            score_delta: outcome.score_delta,
        });
    }
    if !outcome.dropped.is_empty() {
        state.falling.extend(outcome.dropped.iter().map(|piece| FallingPiece {
            piece: piece.clone(),
            vel_y: 0.0,
        }));
        events.push(GameEvent::ClusterDetached {
            pieces: outcome.dropped,
        });
    }
    state.add_score(outcome.score_delta, events);

    if outcome.level_complete {
        enter_level_complete(state, events);
    } else if outcome.game_over {
        enter_game_over(state, events);
    }
}

fn enter_level_complete(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let bonus = state.config.scoring.level_complete_bonus * u64::from(state.level);
    state.add_score(bonus, events);
    state.phase = GamePhase::LevelComplete;
    events.push(GameEvent::LevelComplete {
        level: state.level,
        bonus,
    });
    log::info!("Level {} complete! Score: {}", state.level, state.score);
}

fn enter_game_over(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.phase = GamePhase::GameOver;
    events.push(GameEvent::GameOver);
    log::info!("Game over at level {} with score {}", state.level, state.score);
}

/// Detached pieces accelerate downward until they leave the screen
fn update_falling(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    let gravity = state.config.physics.gravity;
    let floor = state.config.field.height + state.config.physics.fall_margin;

    for falling in &mut state.falling {
        falling.vel_y += gravity * dt;
        falling.piece.pos.y += falling.vel_y * dt;
    }

    state.falling.retain(|falling| {
        if falling.piece.pos.y > floor {
            events.push(GameEvent::PieceFellOff {
                piece: falling.piece.id,
            });
            false
        } else {
            true
        }
    });
}
