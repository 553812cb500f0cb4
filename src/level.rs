//! Level data: placement records, JSON loading and fallback generation

use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GridConfig;
use crate::sim::grid::Grid;
use crate::sim::hex::Coord;
use crate::sim::piece::{Color, Piece, PieceIds, PieceKind};

/// Level loading failures
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid level JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Type flag of a placement record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PieceType {
    #[default]
    Normal,
    #[serde(alias = "MACCHIATO")]
    Stained,
}

/// One `(col, row, color, type)` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub col: i32,
    pub row: i32,
    pub color: Color,
    #[serde(rename = "type", default)]
    pub kind: PieceType,
}

impl PlacementRecord {
    pub fn new(col: i32, row: i32, color: Color, kind: PieceType) -> Self {
        Self { col, row, color, kind }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.col, self.row)
    }

    pub fn piece_kind(&self) -> PieceKind {
        match self.kind {
            PieceType::Normal => PieceKind::Normal(self.color),
            PieceType::Stained => PieceKind::Stained(self.color),
        }
    }
}

/// A level as supplied by the loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub level: u32,
    #[serde(alias = "grapes")]
    pub pieces: Vec<PlacementRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Outer shape only; records are decoded one at a time
#[derive(Deserialize)]
struct RawLevel {
    #[serde(default)]
    level: u32,
    #[serde(default, alias = "grapes")]
    pieces: Vec<serde_json::Value>,
    #[serde(default)]
    narrative: Option<String>,
}

impl LevelData {
    /// Parse level JSON. Malformed records are skipped with a warning; only
    /// a broken outer document is an error.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let raw: RawLevel = serde_json::from_str(json)?;
        let mut pieces = Vec::with_capacity(raw.pieces.len());
        for (i, value) in raw.pieces.into_iter().enumerate() {
            match serde_json::from_value::<PlacementRecord>(value) {
                Ok(record) => pieces.push(record),
                Err(e) => log::warn!("Skipping level {} record {i}: {e}", raw.level),
            }
        }
        Ok(Self {
            level: raw.level,
            pieces,
            narrative: raw.narrative,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn stained_count(&self) -> usize {
        self.pieces.iter().filter(|r| r.kind == PieceType::Stained).count()
    }
}

/// How a population pass went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopulateReport {
    pub placed: usize,
    /// Out-of-bounds or duplicate records
    pub skipped: usize,
}

impl Grid {
    /// Place every record in order. Bad records are skipped, never fatal.
    pub fn populate(&mut self, records: &[PlacementRecord], ids: &mut PieceIds) -> PopulateReport {
        let mut report = PopulateReport::default();
        for record in records {
            let piece = Piece::new(ids.allocate(), record.piece_kind());
            match self.place_at(piece, record.coord()) {
                Ok(()) => report.placed += 1,
                Err(_) => report.skipped += 1,
            }
        }
        report
    }

    /// Current contents as records, row-major
    pub fn to_records(&self) -> Vec<PlacementRecord> {
        self.iter()
            .filter_map(|piece| {
                let coord = piece.grid_coord?;
                let kind = if piece.is_stained() {
                    PieceType::Stained
                } else {
                    PieceType::Normal
                };
                Some(PlacementRecord::new(coord.col, coord.row, piece.kind.color(), kind))
            })
            .collect()
    }
}

/// Cell fill chance for generated levels
const FILL_CHANCE: f32 = 0.7;
/// Chance a filled cell is stained while under the cap
const STAINED_CHANCE: f32 = 0.1;
/// Rows kept free between generated pieces and the bottom of the grid
const FREE_ROWS: i32 = 5;

/// Story line shown before a level; the last one repeats past the end
const NARRATIVES: [&str; 10] = [
    "The harvest has begun, but some grapes are stained...",
    "A north wind has carried a strange blight into the rows...",
    "The highest bunches hide the secret of the stain...",
    "The leaves whisper about an old curse on the vineyard...",
    "Under the full moon the grapes show their true colors...",
    "The ground trembles beneath the weight of the mystery...",
    "Deep roots remember what the vines have seen...",
    "The setting sun paints every bunch red...",
    "Even the birds keep away from these bunches...",
    "The last stand against the stain has begun...",
];

/// Narrative for `level` (1-based)
pub fn narrative_for(level: u32) -> &'static str {
    let idx = (level.max(1) as usize - 1).min(NARRATIVES.len() - 1);
    NARRATIVES[idx]
}

/// Build a level when no file exists for it
pub fn generate(level: u32, seed: u64, grid: &GridConfig) -> LevelData {
    // Deterministic "randomness" based on level number AND game seed
    let level_seed = (level as u64).wrapping_mul(2654435761).wrapping_add(seed);
    let mut rng = Pcg32::seed_from_u64(level_seed);

    let rows_used = (5 + level as i32).min(grid.rows - FREE_ROWS).max(1).min(grid.rows);
    let stained_cap = (level as usize + 2).min(10);

    let mut pieces = Vec::new();
    let mut stained = 0;
    for row in 0..rows_used {
        for col in 0..grid.cols {
            if rng.random::<f32>() >= FILL_CHANCE {
                continue;
            }
            let color = Color::ALL[rng.random_range(0..Color::ALL.len())];
            let kind = if stained < stained_cap && rng.random::<f32>() < STAINED_CHANCE {
                stained += 1;
                PieceType::Stained
            } else {
                PieceType::Normal
            };
            pieces.push(PlacementRecord::new(col, row, color, kind));
        }
    }

    // Every level must be winnable
    if stained == 0 {
        match pieces.first_mut() {
            Some(first) => first.kind = PieceType::Stained,
            None => pieces.push(PlacementRecord::new(0, 0, Color::ALL[0], PieceType::Stained)),
        }
    }

    log::info!(
        "Generated level {level}: {} pieces over {rows_used} rows",
        pieces.len()
    );
    LevelData {
        level,
        pieces,
        narrative: Some(narrative_for(level).to_string()),
    }
}

/// `level_N.json` inside `dir`
pub fn level_path(dir: &Path, level: u32) -> PathBuf {
    dir.join(format!("level_{level}.json"))
}

/// Read `level_N.json` from `dir`, generating the level if it is missing
/// or unreadable
pub fn load_or_generate(dir: &Path, level: u32, seed: u64, grid: &GridConfig) -> LevelData {
    let path = level_path(dir, level);
    match LevelData::load(&path) {
        Ok(mut data) => {
            if data.level == 0 {
                data.level = level;
            }
            if data.narrative.is_none() {
                data.narrative = Some(narrative_for(data.level).to_string());
            }
            log::info!("Level {level} data loaded from {}", path.display());
            data
        }
        Err(e) => {
            log::warn!("Failed to load level {level} ({e}), using fallback");
            generate(level, seed, grid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL_JSON: &str = r#"{
        "level": 2,
        "grapes": [
            {"col": 0, "row": 0, "color": "aglianico", "type": "NORMAL"},
            {"col": 1, "row": 0, "color": "fiano", "type": "MACCHIATO"},
            {"col": 2, "row": 0, "color": "greco"},
            {"col": 3, "row": 0, "color": "barbera"},
            {"col": "x", "row": 0, "color": "greco"}
        ],
        "narrative": "La vendemmia"
    }"#;

    #[test]
    fn test_parse_grapes_layout() {
        let data = LevelData::from_json(LEVEL_JSON).unwrap();
        assert_eq!(data.level, 2);
        assert_eq!(data.narrative.as_deref(), Some("La vendemmia"));
        assert_eq!(
            data.pieces,
            vec![
                PlacementRecord::new(0, 0, Color::Aglianico, PieceType::Normal),
                PlacementRecord::new(1, 0, Color::Fiano, PieceType::Stained),
                PlacementRecord::new(2, 0, Color::Greco, PieceType::Normal),
            ]
        );
    }

    #[test]
    fn test_broken_document_is_an_error() {
        assert!(matches!(LevelData::from_json("{\"grapes\": 3"), Err(LevelError::Parse(_))));
    }

    #[test]
    fn test_populate_skips_bad_records() {
        let mut grid = Grid::from_config(&GridConfig::default());
        let mut ids = PieceIds::default();
        let records = [
            PlacementRecord::new(0, 0, Color::Greco, PieceType::Normal),
            PlacementRecord::new(0, 0, Color::Fiano, PieceType::Normal),
            PlacementRecord::new(8, 0, Color::Fiano, PieceType::Normal),
            PlacementRecord::new(0, -1, Color::Fiano, PieceType::Normal),
            PlacementRecord::new(1, 0, Color::Fiano, PieceType::Stained),
        ];
        let report = grid.populate(&records, &mut ids);
        assert_eq!(report, PopulateReport { placed: 2, skipped: 3 });
        assert_eq!(grid.get(Coord::new(0, 0)).map(|p| p.kind), Some(PieceKind::Normal(Color::Greco)));
        assert!(grid.check_invariants());
    }

    #[test]
    fn test_to_records_exports_row_major() {
        let mut grid = Grid::from_config(&GridConfig::default());
        let mut ids = PieceIds::default();
        let records = [
            PlacementRecord::new(3, 1, Color::Greco, PieceType::Stained),
            PlacementRecord::new(5, 0, Color::Fiano, PieceType::Normal),
        ];
        grid.populate(&records, &mut ids);
        assert_eq!(grid.to_records(), vec![records[1], records[0]]);
    }

    #[test]
    fn test_exported_grid_reloads_as_level() {
        let mut grid = Grid::from_config(&GridConfig::default());
        let mut ids = PieceIds::default();
        grid.populate(&generate(2, 9, &GridConfig::default()).pieces, &mut ids);

        let saved = LevelData {
            level: 2,
            pieces: grid.to_records(),
            narrative: None,
        };
        let json = saved.to_json().unwrap();
        assert!(!json.contains("narrative"));
        assert_eq!(LevelData::from_json(&json).unwrap(), saved);
    }

    #[test]
    fn test_generate_is_seeded_and_winnable() {
        let config = GridConfig::default();
        for level in 1..=12 {
            let a = generate(level, 77, &config);
            let b = generate(level, 77, &config);
            assert_eq!(a, b);
            assert!(a.stained_count() >= 1);
            assert!(a.stained_count() <= (level as usize + 2).min(10));
            assert!(a.pieces.iter().all(|r| r.row < config.rows - FREE_ROWS));
            assert!(a.pieces.iter().all(|r| r.col >= 0 && r.col < config.cols));
        }
        assert_ne!(generate(1, 1, &config), generate(1, 2, &config));
    }

    #[test]
    fn test_generated_levels_carry_narrative() {
        let config = GridConfig::default();
        assert_eq!(generate(1, 0, &config).narrative.as_deref(), Some(NARRATIVES[0]));
        assert_eq!(generate(4, 0, &config).narrative.as_deref(), Some(NARRATIVES[3]));
        assert_eq!(narrative_for(25), NARRATIVES[9]);
        assert_eq!(narrative_for(0), NARRATIVES[0]);
    }

    #[test]
    fn test_load_or_generate_falls_back() {
        let config = GridConfig::default();
        let dir = Path::new("/nonexistent/vendemmia/levels");
        assert_eq!(load_or_generate(dir, 3, 5, &config), generate(3, 5, &config));
    }

    #[test]
    fn test_load_or_generate_reads_file() {
        let dir = std::env::temp_dir().join(format!("vendemmia-levels-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(level_path(&dir, 4), r#"{"grapes": [{"col": 1, "row": 0, "color": "fiano"}]}"#).unwrap();

        let data = load_or_generate(&dir, 4, 0, &GridConfig::default());
        assert_eq!(data.level, 4);
        assert_eq!(data.pieces, vec![PlacementRecord::new(1, 0, Color::Fiano, PieceType::Normal)]);
        assert_eq!(data.narrative.as_deref(), Some(narrative_for(4)));

        std::fs::remove_dir_all(&dir).ok();
    }
}
