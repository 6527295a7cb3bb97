//! Core types for video playback

use serde::{Deserialize, Serialize};

/// Player state machine
///
/// ```text
/// Empty -> Loading -> Paused (first frame) -> Playing <-> Paused
///                                  ^                        |
///                                  +--- stop returns to Empty
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No video loaded
    Empty,

    /// A video is being loaded into the pipeline
    Loading,

    /// Paused, showing a frame
    Paused,

    /// Playing
    Playing,
}
