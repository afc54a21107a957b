use crate::Position;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Position {0:?} is out of bounds")]
    OutOfBounds(Position),
    #[error("Board size {rows}x{cols} is not playable")]
    EmptyBoard { rows: u32, cols: u32 },
    #[error("Board size {rows}x{cols} exceeds {max} cells")]
    BoardTooLarge { rows: u32, cols: u32, max: u64 },
    #[error("Too many mines ({mines}) for board size {rows}x{cols}")]
    TooManyMines { rows: u32, cols: u32, mines: u32 },
    #[error("Invalid mine layout: {0}")]
    InvalidLayout(String),
}

impl GameError {
    /// True for errors raised by a board configuration that can never be played.
    pub fn is_invalid_config(&self) -> bool {
        matches!(
            self,
            Self::EmptyBoard { .. } | Self::BoardTooLarge { .. } | Self::TooManyMines { .. }
        )
    }
}

/// Failures of the score store. The game stays playable when these occur.
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Scores unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
    #[error("Scores unavailable, storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown preset '{0}', expected small, medium or large")]
pub struct ParsePresetError(pub String);
