//! Pipeline-agnostic transport trait
//!
//! Abstracts the media pipeline so `VideoPlayer` can drive a real
//! GStreamer backend on the kiosk and a fake in tests. All calls are
//! synchronous; `set_source` followed by the first `play`/`pause` pair is
//! the one intentionally blocking setup step in the system.

use crate::error::Result;
use std::path::Path;
use std::time::Duration;

/// Transport-control capability of a media pipeline
pub trait MediaPipeline: Send {
    /// Point the pipeline at a new media file, tearing down the old one
    fn set_source(&mut self, path: &Path) -> Result<()>;

    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause, keeping the current frame on screen
    fn pause(&mut self) -> Result<()>;

    /// Stop and release the media
    fn stop(&mut self) -> Result<()>;

    /// Jump to a position from the start of the media
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Set output volume as a linear fraction (0.0-1.0)
    fn set_volume(&mut self, volume: f64) -> Result<()>;

    /// Current playback position, if the pipeline can answer
    fn position(&self) -> Option<Duration>;

    /// Total media duration, if the pipeline can answer
    fn duration(&self) -> Option<Duration>;

    /// Drain one queued pipeline notification, if any
    fn poll_event(&mut self) -> Option<PipelineEvent>;
}

/// Notifications surfaced by the pipeline's message bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Playback reached the end of the media
    EndOfStream,

    /// The pipeline reported an error
    Error(String),
}

/// In-memory pipeline for unit tests
#[cfg(test)]
pub(crate) struct DummyPipeline {
    pub source: Option<std::path::PathBuf>,
    pub playing: bool,
    pub position: Duration,
    pub duration: Duration,
    pub volume: f64,
    pub events: std::collections::VecDeque<PipelineEvent>,
}

#[cfg(test)]
impl DummyPipeline {
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            source: None,
            playing: false,
            position: Duration::ZERO,
            duration,
            volume: 1.0,
            events: std::collections::VecDeque::new(),
        }
    }
}

#[cfg(test)]
impl MediaPipeline for DummyPipeline {
    fn set_source(&mut self, path: &Path) -> Result<()> {
        self.source = Some(path.to_path_buf());
        self.position = Duration::ZERO;
        self.playing = false;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.playing = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.playing = false;
        self.source = None;
        self.position = Duration::ZERO;
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.position = position;
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.volume = volume;
        Ok(())
    }

    fn position(&self) -> Option<Duration> {
        Some(self.position)
    }

    fn duration(&self) -> Option<Duration> {
        Some(self.duration)
    }

    fn poll_event(&mut self) -> Option<PipelineEvent> {
        self.events.pop_front()
    }
}
