use crate::error::ParsePresetError;
use crate::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest board, in cells, that the engine will allocate.
pub const MAX_CELLS: u64 = 1 << 20;

/// Board dimensions and mine count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    pub rows: u32,
    pub cols: u32,
    pub mine_count: u32,
}

impl BoardConfig {
    pub const fn new(rows: u32, cols: u32, mine_count: u32) -> Self {
        Self {
            rows,
            cols,
            mine_count,
        }
    }

    /// Rejects boards without cells, boards over [`MAX_CELLS`] and boards with
    /// no room for a safe first reveal.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::EmptyBoard {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let total = self.total_cells();
        if total > MAX_CELLS {
            return Err(GameError::BoardTooLarge {
                rows: self.rows,
                cols: self.cols,
                max: MAX_CELLS,
            });
        }

        if u64::from(self.mine_count) >= total {
            return Err(GameError::TooManyMines {
                rows: self.rows,
                cols: self.cols,
                mines: self.mine_count,
            });
        }

        Ok(())
    }

    pub fn total_cells(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Small,
    Medium,
    Large,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Small, Preset::Medium, Preset::Large];

    pub const fn config(self) -> BoardConfig {
        match self {
            Preset::Small => BoardConfig::new(8, 8, 10),
            Preset::Medium => BoardConfig::new(16, 16, 40),
            Preset::Large => BoardConfig::new(24, 24, 99),
        }
    }

    pub const fn id(self) -> &'static str {
        match self {
            Preset::Small => "small",
            Preset::Medium => "medium",
            Preset::Large => "large",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Preset {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePresetError(s.to_string()))
    }
}

impl From<Preset> for BoardConfig {
    fn from(preset: Preset) -> Self {
        preset.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(Preset::Small.config(), BoardConfig::new(8, 8, 10));
        assert_eq!(Preset::Medium.config(), BoardConfig::new(16, 16, 40));
        assert_eq!(Preset::Large.config(), BoardConfig::new(24, 24, 99));
        for preset in Preset::ALL {
            assert!(preset.config().validate().is_ok());
        }
    }

    #[test]
    fn test_validation_rejects_bad_configs() {
        assert_eq!(
            BoardConfig::new(0, 5, 0).validate(),
            Err(GameError::EmptyBoard { rows: 0, cols: 5 })
        );
        assert_eq!(
            BoardConfig::new(2, 2, 4).validate(),
            Err(GameError::TooManyMines {
                rows: 2,
                cols: 2,
                mines: 4
            })
        );
        assert!(BoardConfig::new(2, 2, 3).validate().is_ok());
        assert!(BoardConfig::new(3, 3, 0).validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_oversized_boards() {
        let huge = BoardConfig::new(i32::MAX as u32, i32::MAX as u32, 0);
        assert_eq!(
            huge.validate(),
            Err(GameError::BoardTooLarge {
                rows: i32::MAX as u32,
                cols: i32::MAX as u32,
                max: MAX_CELLS,
            })
        );
        assert!(huge.validate().unwrap_err().is_invalid_config());

        let wide = BoardConfig::new(1, u32::MAX, 1);
        assert!(matches!(
            wide.validate(),
            Err(GameError::BoardTooLarge { .. })
        ));

        assert!(BoardConfig::new(1024, 1024, 1).validate().is_ok());
        assert!(BoardConfig::new(1024, 1025, 1).validate().is_err());
    }

    #[test]
    fn test_preset_ids() {
        for preset in Preset::ALL {
            assert_eq!(preset.to_string().parse::<Preset>(), Ok(preset));
        }
        assert_eq!("LARGE".parse::<Preset>(), Ok(Preset::Large));
        assert!("huge".parse::<Preset>().is_err());
        assert_eq!(
            serde_json::to_string(&Preset::Medium).unwrap(),
            "\"medium\""
        );
    }
}
