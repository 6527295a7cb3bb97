//! Error types for video playback

use std::path::PathBuf;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The video file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// No video is currently loaded
    #[error("No video loaded")]
    NoVideoLoaded,

    /// Media pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// State record serialization error
    #[error("State serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
