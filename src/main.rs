//! Vendemmia headless runner
//!
//! Plays levels with the demo AI through the frame driver and logs what
//! happens. Set `RUST_LOG=debug` for per-tick detail.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use vendemmia::consts::SIM_DT;
use vendemmia::sim::{GameEvent, GamePhase, GameState};
use vendemmia::{FrameDriver, GameConfig, autoplay, level};

#[derive(Debug, Parser)]
#[command(
    name = "vendemmia",
    version,
    about = "Hex-grid grape shooter simulation, played headless by the demo AI."
)]
struct Args {
    /// Run seed. Random if not set.
    #[arg(short, long)]
    seed: Option<u64>,

    /// First level to play.
    #[arg(short, long, default_value = "1", value_name = "N")]
    level: u32,

    /// Number of levels to play before stopping. Plays to the end of the
    /// game if not set.
    #[arg(long, value_name = "N")]
    levels: Option<u32>,

    /// Directory holding level_N.json files. Missing levels are generated.
    #[arg(long, default_value = "levels", value_name = "DIR")]
    levels_dir: PathBuf,

    /// JSON tuning file. Built-in defaults if not set.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Give up after this many simulation ticks.
    #[arg(long, default_value = "36000", value_name = "TICKS")]
    max_ticks: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(random_seed);
    log::info!("Vendemmia (native) starting with seed: {seed}");

    let mut state = GameState::new(config, seed);
    let mut driver = FrameDriver::new();
    let last_level = args
        .levels
        .map(|n| args.level.saturating_add(n.saturating_sub(1)))
        .unwrap_or(u32::MAX);
    state.load_level(level::load_or_generate(&args.levels_dir, args.level, seed, &config.grid));

    while state.time_ticks < args.max_ticks {
        let input = autoplay::choose_input(&state);
        if let Some(target) = input.aim {
            driver.queue_aim(target);
        }
        if input.fire {
            driver.queue_fire();
        }

        for event in driver.update(&mut state, SIM_DT) {
            log_event(&event);
        }

        match state.phase {
            GamePhase::LevelComplete
                if state.level < last_level || state.level >= config.progression.total_levels =>
            {
                driver.reset();
                let events = state.advance(|next| level::load_or_generate(&args.levels_dir, next, seed, &config.grid));
                events.iter().for_each(log_event);
            }
            GamePhase::LevelComplete | GamePhase::GameOver | GamePhase::GameComplete => break,
            GamePhase::Playing | GamePhase::Paused => {}
        }
    }

    if state.is_running() {
        log::warn!("Stopped after {} ticks", state.time_ticks);
    }
    println!(
        "level {} {:?}: score {} in {} ticks ({} stained left)",
        state.level,
        state.phase,
        state.score,
        state.time_ticks,
        state.stained_remaining()
    );
    Ok(())
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::PiecePlaced { coord, piece } => {
            log::debug!("Placed {:?} at {coord}", piece.kind);
        }
        GameEvent::MatchResolved { removed, score_delta } => {
            log::info!("Popped {} pieces for {score_delta}", removed.len());
        }
        GameEvent::ClusterDetached { pieces } => {
            log::info!("{} pieces dropped", pieces.len());
        }
        GameEvent::ScoreChanged { total, .. } => log::debug!("Score: {total}"),
        GameEvent::LevelComplete { level, bonus } => {
            log::info!("Level {level} cleared, bonus {bonus}");
        }
        GameEvent::GameComplete { score } => log::info!("All levels cleared, final score {score}"),
        other => log::trace!("{other:?}"),
    }
}

fn random_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
