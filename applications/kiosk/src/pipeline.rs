//! Headless stand-in for the GStreamer backend
//!
//! Used when the kiosk is built without the `gst` feature: transport
//! calls succeed, position advances with wall-clock time while playing,
//! and nothing is rendered. Lets the orchestrator run end to end on a
//! development machine.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use vitrine_playback::{MediaPipeline, PipelineEvent, Result};

/// Pipeline that plays nothing
pub struct NullPipeline {
    source: Option<PathBuf>,
    base_position: Duration,
    playing_since: Option<Instant>,
    volume: f64,
}

impl NullPipeline {
    /// Create an idle null pipeline
    pub fn new() -> Self {
        Self {
            source: None,
            base_position: Duration::ZERO,
            playing_since: None,
            volume: 1.0,
        }
    }
}

impl Default for NullPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaPipeline for NullPipeline {
    fn set_source(&mut self, path: &Path) -> Result<()> {
        self.source = Some(path.to_path_buf());
        self.base_position = Duration::ZERO;
        self.playing_since = None;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if let Some(started) = self.playing_since.take() {
            self.base_position += started.elapsed();
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.source = None;
        self.base_position = Duration::ZERO;
        self.playing_since = None;
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.base_position = position;
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.volume = volume;
        Ok(())
    }

    fn position(&self) -> Option<Duration> {
        let elapsed = self
            .playing_since
            .map_or(Duration::ZERO, |started| started.elapsed());
        Some(self.base_position + elapsed)
    }

    fn duration(&self) -> Option<Duration> {
        // No media is decoded, so there is nothing to report.
        None
    }

    fn poll_event(&mut self) -> Option<PipelineEvent> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_holds_still_while_paused() {
        let mut pipeline = NullPipeline::new();
        pipeline.set_source(Path::new("/media/a.mp4")).unwrap();
        pipeline.seek(Duration::from_secs(5)).unwrap();
        assert_eq!(pipeline.position(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn stop_resets_everything() {
        let mut pipeline = NullPipeline::new();
        pipeline.set_source(Path::new("/media/a.mp4")).unwrap();
        pipeline.play().unwrap();
        pipeline.stop().unwrap();
        assert_eq!(pipeline.position(), Some(Duration::ZERO));
    }
}
