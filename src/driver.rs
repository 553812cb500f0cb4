//! Frame driver: turns variable frame time into fixed simulation steps
//!
//! The host calls [`FrameDriver::update`] once per rendered frame. Pointer
//! input is queued between frames and handed to the next tick only, so a
//! single click fires once no matter how many substeps the frame runs.

use glam::Vec2;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    accumulator: f32,
    input: TickInput,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer moved to `target`
    pub fn queue_aim(&mut self, target: Vec2) {
        self.input.aim = Some(target);
    }

    /// Pointer released
    pub fn queue_fire(&mut self) {
        self.input.fire = true;
    }

    pub fn queue_pause(&mut self) {
        self.input.pause = true;
    }

    /// Auto-pause when the host window is hidden
    pub fn visibility_changed(&mut self, hidden: bool, state: &GameState) {
        if hidden && state.phase == GamePhase::Playing {
            self.input.pause = true;
            log::info!("Auto-paused (window hidden)");
        }
    }

    /// Unsimulated time carried to the next frame
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Drop queued input and leftover time, e.g. after loading a level
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.input = TickInput::default();
    }

    /// Run simulation ticks for a frame lasting `frame_dt` seconds
    pub fn update(&mut self, state: &mut GameState, frame_dt: f32) -> Vec<GameEvent> {
        let dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = std::mem::take(&mut self.input);
            events.extend(tick(state, &input, SIM_DT));
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::level::{LevelData, PieceType, PlacementRecord};
    use crate::sim::piece::Color;

    fn state() -> GameState {
        let mut state = GameState::new(GameConfig::default(), 5);
        state.load_level(LevelData {
            level: 1,
            pieces: vec![PlacementRecord::new(0, 0, Color::Fiano, PieceType::Stained)],
            narrative: None,
        });
        state
    }

    #[test]
    fn test_accumulates_partial_frames() {
        let mut state = state();
        let mut driver = FrameDriver::new();
        driver.update(&mut state, 0.01);
        assert_eq!(state.time_ticks, 0);
        driver.update(&mut state, 0.01);
        assert_eq!(state.time_ticks, 1);
        driver.update(&mut state, 0.04);
        assert_eq!(state.time_ticks, 3);
        assert!(driver.accumulator() < SIM_DT);
    }

    #[test]
    fn test_long_frames_are_capped() {
        let mut state = state();
        let mut driver = FrameDriver::new();
        driver.update(&mut state, 5.0);
        driver.update(&mut state, 5.0);
        assert!(state.time_ticks <= 12);
        assert!(state.time_ticks as u32 <= 2 * MAX_SUBSTEPS);
    }

    #[test]
    fn test_fire_is_one_shot() {
        let mut state = state();
        let mut driver = FrameDriver::new();
        driver.queue_aim(Vec2::new(100.0, 100.0));
        driver.queue_fire();
        let events = driver.update(&mut state, 0.05);
        let fired = events.iter().filter(|e| matches!(e, GameEvent::Fired { .. })).count();
        assert_eq!(fired, 1);
        assert!(state.launcher.projectile().is_some());
    }

    #[test]
    fn test_hidden_window_pauses() {
        let mut state = state();
        let mut driver = FrameDriver::new();
        driver.visibility_changed(true, &state);
        let events = driver.update(&mut state, 0.02);
        assert_eq!(events, vec![GameEvent::Paused]);
        assert_eq!(state.phase, GamePhase::Paused);

        // Already paused: hiding again queues nothing
        driver.visibility_changed(true, &state);
        driver.update(&mut state, 0.02);
        assert_eq!(state.phase, GamePhase::Paused);

        driver.queue_pause();
        driver.update(&mut state, 0.02);
        assert_eq!(state.phase, GamePhase::Playing);
    }
}
