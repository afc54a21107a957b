pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod position;
pub mod scores;

pub use board::{Board, Cell, CellContent, RevealedCell, Visibility};
pub use config::{BoardConfig, Preset, MAX_CELLS};
pub use error::{GameError, ParsePresetError, ScoreError};
pub use game::{CellView, FlagResult, GameSession, GameState, RevealResult};
pub use position::Position;
pub use scores::{JsonScoreStore, MemoryScoreStore, ScoreEntry, ScoreStore, TOP_SCORES_LIMIT};
