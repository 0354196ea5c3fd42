use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snapshot::Snapshot;

const APP_DIR_NAME: &str = "snake-engine";
const SCORE_FILE_NAME: &str = "highscore.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScoreFile {
    high_score: u32,
}

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("high score file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("high score file {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Returns the platform-correct high score file path.
#[must_use]
pub fn default_scores_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SCORE_FILE_NAME);
    base
}

/// The single global high score, persisted as a small JSON document.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the high score.
    ///
    /// Returns `Ok(0)` when the file does not exist yet (first run).
    pub fn load(&self) -> Result<u32, ScoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(ScoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str::<ScoreFile>(&raw)
            .map(|file| file.high_score)
            .map_err(|source| ScoreError::Malformed {
                path: self.path.clone(),
                source,
            })
    }

    /// Loads the high score, falling back to zero when the file is unusable.
    #[must_use]
    pub fn load_or_default(&self) -> u32 {
        self.load().unwrap_or_else(|error| {
            warn!("{error}; starting from a high score of 0");
            0
        })
    }

    /// Saves the high score, creating parent directories when needed.
    pub fn save(&self, score: u32) -> Result<(), ScoreError> {
        let io_error = |source: io::Error| ScoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let payload = ScoreFile { high_score: score };
        let json = serde_json::to_string_pretty(&payload).map_err(|source| {
            ScoreError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;

        fs::write(&self.path, json).map_err(io_error)
    }
}

/// Follows snapshots and persists a new best once per finished round.
#[derive(Debug)]
pub struct HighScoreTracker {
    store: HighScoreStore,
    best: u32,
    round_recorded: bool,
}

impl HighScoreTracker {
    /// Creates a tracker seeded with the stored best.
    #[must_use]
    pub fn load(store: HighScoreStore) -> Self {
        let best = store.load_or_default();
        Self {
            store,
            best,
            round_recorded: false,
        }
    }

    #[must_use]
    pub fn best(&self) -> u32 {
        self.best
    }

    /// Records the score of a finished round. Returns true when a new best was reached.
    ///
    /// Save failures are logged; the in-memory best still advances.
    pub fn observe(&mut self, snapshot: &Snapshot) -> bool {
        if !snapshot.game_over {
            self.round_recorded = false;
            return false;
        }
        if self.round_recorded {
            return false;
        }
        self.round_recorded = true;

        if snapshot.score <= self.best {
            return false;
        }

        self.best = snapshot.score;
        info!("new high score {}", self.best);
        if let Err(error) = self.store.save(self.best) {
            warn!("failed to save high score: {error}");
        }
        true
    }
}

/// A tracker shared between the session worker and the front-end.
///
/// The worker feeds it every published frame; readers only ask for the best.
#[derive(Debug, Clone)]
pub struct SharedHighScore {
    tracker: Arc<Mutex<HighScoreTracker>>,
}

impl SharedHighScore {
    #[must_use]
    pub fn new(tracker: HighScoreTracker) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }

    pub fn observe(&self, snapshot: &Snapshot) -> bool {
        self.tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(snapshot)
    }

    #[must_use]
    pub fn best(&self) -> u32 {
        self.tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .best()
    }
}
