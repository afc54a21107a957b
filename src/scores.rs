use crate::{Preset, ScoreError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// How many entries a high-score table holds.
pub const TOP_SCORES_LIMIT: usize = 10;

const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub elapsed_seconds: u32,
    pub preset: Preset,
}

impl ScoreEntry {
    pub fn new(name: &str, elapsed_seconds: u32, preset: Preset) -> Self {
        let name = name.trim();
        Self {
            name: if name.is_empty() { ANONYMOUS } else { name }.to_string(),
            elapsed_seconds,
            preset,
        }
    }
}

/// Where completed game times go.
pub trait ScoreStore {
    fn record_result(
        &mut self,
        name: &str,
        elapsed_seconds: u32,
        preset: Preset,
    ) -> Result<(), ScoreError>;

    /// Fastest times for `preset`, at most [`TOP_SCORES_LIMIT`] of them.
    fn top_scores(&self, preset: Preset) -> Result<Vec<ScoreEntry>, ScoreError>;
}

fn rank(entries: &[ScoreEntry], preset: Preset) -> Vec<ScoreEntry> {
    let mut ranked: Vec<ScoreEntry> = entries
        .iter()
        .filter(|entry| entry.preset == preset)
        .cloned()
        .collect();
    // Stable, so equal times keep the order they were recorded in.
    ranked.sort_by_key(|entry| entry.elapsed_seconds);
    ranked.truncate(TOP_SCORES_LIMIT);
    ranked
}

#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    entries: Vec<ScoreEntry>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn record_result(
        &mut self,
        name: &str,
        elapsed_seconds: u32,
        preset: Preset,
    ) -> Result<(), ScoreError> {
        self.entries
            .push(ScoreEntry::new(name, elapsed_seconds, preset));
        Ok(())
    }

    fn top_scores(&self, preset: Preset) -> Result<Vec<ScoreEntry>, ScoreError> {
        Ok(rank(&self.entries, preset))
    }
}

/// Keeps every recorded score in one JSON file.
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<ScoreEntry>, ScoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No score file at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&contents).map_err(|err| {
            warn!("Score file {} is unreadable: {}", self.path.display(), err);
            ScoreError::from(err)
        })
    }

    fn save(&self, entries: &[ScoreEntry]) -> Result<(), ScoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl ScoreStore for JsonScoreStore {
    fn record_result(
        &mut self,
        name: &str,
        elapsed_seconds: u32,
        preset: Preset,
    ) -> Result<(), ScoreError> {
        let mut entries = self.load()?;
        entries.push(ScoreEntry::new(name, elapsed_seconds, preset));
        self.save(&entries)?;
        debug!(
            "Recorded {}s on {} to {}",
            elapsed_seconds,
            preset,
            self.path.display()
        );
        Ok(())
    }

    fn top_scores(&self, preset: Preset) -> Result<Vec<ScoreEntry>, ScoreError> {
        Ok(rank(&self.load()?, preset))
    }
}
