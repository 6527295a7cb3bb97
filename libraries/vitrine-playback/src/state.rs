//! Playback-state persistence
//!
//! One flat JSON record, overwritten on every save. The store never fails a
//! load: an absent or unreadable file reads as "nothing saved".

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The persisted playback record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackRecord {
    /// Path of the video the record belongs to
    pub video_path: PathBuf,

    /// Position in seconds
    pub position: f64,

    /// Volume level (0-100)
    pub volume: u8,
}

/// File-backed store for the single playback record
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store writing to the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved record
    ///
    /// Returns `None` when no file exists or its contents cannot be parsed;
    /// a corrupt file is logged and treated as absent.
    pub fn load(&self) -> Option<PlaybackRecord> {
        if !self.path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "error reading playback state");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring corrupt playback state file");
                None
            }
        }
    }

    /// Save a record, replacing any previous one
    ///
    /// Writes a temporary file and renames over the target so a crash
    /// mid-write never leaves a torn record behind.
    pub fn save(&self, record: &PlaybackRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
