//! Video player - transport orchestration
//!
//! Drives a `MediaPipeline` through the load/play/pause/stop lifecycle,
//! owns the volume and the persisted playback record, and queues events
//! for the UI layer to drain.

use crate::{
    error::{PlaybackError, Result},
    pipeline::{MediaPipeline, PipelineEvent},
    state::{PlaybackRecord, StateStore},
    types::PlayerState,
    volume::Volume,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Events queued by the player for UI synchronization
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Player state changed
    StateChanged {
        /// The new state
        state: PlayerState,
    },

    /// A video finished loading and is paused on its first frame
    VideoLoaded {
        /// Path of the loaded video
        path: PathBuf,
    },

    /// Playback reached the end and was reset to the first frame
    VideoEnded,

    /// Volume changed
    VolumeChanged {
        /// New level (0-100)
        level: u8,
    },

    /// Error surfaced by the pipeline
    Error {
        /// Error message
        message: String,
    },
}

/// Wraps a media pipeline with state tracking and persistence
///
/// Transport calls are idempotent: asking for the state the player is
/// already in is an `Ok` no-op. Loading replaces the current video; any
/// position it had is persisted first, so swapping back later resumes
/// through the state file.
pub struct VideoPlayer {
    pipeline: Box<dyn MediaPipeline>,
    store: StateStore,
    volume: Volume,
    state: PlayerState,
    current_video: Option<PathBuf>,

    // Event queue for UI synchronization
    pending_events: Vec<PlayerEvent>,
}

impl VideoPlayer {
    /// Create a player over the given pipeline
    pub fn new(pipeline: Box<dyn MediaPipeline>, store: StateStore, default_volume: u8) -> Self {
        Self {
            pipeline,
            store,
            volume: Volume::new(default_volume),
            state: PlayerState::Empty,
            current_video: None,
            pending_events: Vec::new(),
        }
    }

    // ===== Loading =====

    /// Load a video and leave it paused on its first frame
    ///
    /// Fails with `FileNotFound` before touching any state when the path
    /// does not exist. Otherwise the current video (if any) is persisted
    /// and torn down, the saved record is applied when it belongs to this
    /// exact path, and the pipeline is run just long enough to materialize
    /// the first frame.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PlaybackError::FileNotFound(path.to_path_buf()));
        }

        if self.current_video.is_some() {
            self.save_state();
        }

        match self.load_pipeline(path) {
            Ok(()) => {
                self.state = PlayerState::Paused;
                self.emit_state_changed(PlayerState::Paused);
                self.emit_video_loaded(path.to_path_buf());
                tracing::info!(path = %path.display(), "video loaded");
                Ok(())
            }
            Err(e) => {
                // A half-loaded pipeline is unusable; drop back to Empty.
                let _ = self.pipeline.stop();
                self.state = PlayerState::Empty;
                self.current_video = None;
                Err(e)
            }
        }
    }

    fn load_pipeline(&mut self, path: &Path) -> Result<()> {
        self.state = PlayerState::Loading;
        self.pipeline.stop()?;
        self.pipeline.set_source(path)?;
        self.current_video = Some(path.to_path_buf());

        self.pipeline.set_volume(self.volume.fraction())?;
        self.restore_state(path);

        // Start momentarily so the first frame is rendered, then hold.
        self.pipeline.play()?;
        self.pipeline.pause()?;
        Ok(())
    }

    fn restore_state(&mut self, path: &Path) {
        let Some(record) = self.store.load() else {
            return;
        };
        if record.video_path != path {
            return;
        }
        // try_from rejects NaN, negatives and values too large for a
        // Duration; a store load never fails, so a crafted file must not
        // take the player down here either.
        let Ok(position) = Duration::try_from_secs_f64(record.position) else {
            tracing::warn!(position = record.position, "ignoring bad saved position");
            return;
        };

        if let Err(e) = self.seek(position) {
            tracing::warn!(error = %e, "error restoring saved position");
        }
        if let Err(e) = self.set_volume(record.volume) {
            tracing::warn!(error = %e, "error restoring saved volume");
        }
        tracing::info!(position = record.position, "saved playback state restored");
    }

    // ===== Transport =====

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            PlayerState::Playing => Ok(()),
            PlayerState::Paused => {
                self.pipeline.play()?;
                self.state = PlayerState::Playing;
                self.emit_state_changed(PlayerState::Playing);
                Ok(())
            }
            PlayerState::Empty | PlayerState::Loading => Err(PlaybackError::NoVideoLoaded),
        }
    }

    /// Pause playback; a no-op unless currently playing
    pub fn pause(&mut self) -> Result<()> {
        if self.state != PlayerState::Playing {
            return Ok(());
        }
        self.pipeline.pause()?;
        self.state = PlayerState::Paused;
        self.emit_state_changed(PlayerState::Paused);
        Ok(())
    }

    /// Stop playback, persist the record, and unload the video
    pub fn stop(&mut self) -> Result<()> {
        if self.state == PlayerState::Empty {
            return Ok(());
        }
        self.save_state();
        self.pipeline.stop()?;
        self.state = PlayerState::Empty;
        self.current_video = None;
        self.emit_state_changed(PlayerState::Empty);
        Ok(())
    }

    /// Seek to a position, clamped to the media's duration
    ///
    /// The lower bound needs no clamping: a `Duration` cannot go below
    /// zero.
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        if self.current_video.is_none() {
            return Err(PlaybackError::NoVideoLoaded);
        }

        let clamped = match self.pipeline.duration() {
            Some(duration) => position.min(duration),
            None => position,
        };
        self.pipeline.seek(clamped)
    }

    /// Set the volume level (clamped to 0-100)
    pub fn set_volume(&mut self, level: u8) -> Result<()> {
        self.volume.set_level(level);
        self.pipeline.set_volume(self.volume.fraction())?;
        self.emit_volume_changed();
        Ok(())
    }

    // ===== Queries =====

    /// Current position; zero when the pipeline cannot answer
    pub fn position(&self) -> Duration {
        self.pipeline.position().unwrap_or_default()
    }

    /// Media duration; zero when the pipeline cannot answer
    pub fn duration(&self) -> Duration {
        self.pipeline.duration().unwrap_or_default()
    }

    /// Position as a fraction of duration (0.0-1.0)
    pub fn progress(&self) -> f64 {
        let duration = self.duration();
        if duration.is_zero() {
            return 0.0;
        }
        (self.position().as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Current player state
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Whether the player is currently playing
    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    /// Path of the loaded video, if any
    pub fn current_video(&self) -> Option<&Path> {
        self.current_video.as_deref()
    }

    /// Current volume level (0-100)
    pub fn volume_level(&self) -> u8 {
        self.volume.level()
    }

    // ===== Pipeline events =====

    /// Drain pipeline notifications into player events
    ///
    /// End of stream resets to the first frame and pauses; there is no
    /// auto-advance. Pipeline errors are logged and queued for the UI.
    pub fn handle_events(&mut self) {
        while let Some(event) = self.pipeline.poll_event() {
            match event {
                PipelineEvent::EndOfStream => self.on_video_end(),
                PipelineEvent::Error(message) => {
                    tracing::error!(error = %message, "pipeline error");
                    self.emit_error(message);
                }
            }
        }
    }

    fn on_video_end(&mut self) {
        if let Err(e) = self.seek(Duration::ZERO) {
            tracing::error!(error = %e, "error rewinding after end of stream");
        }
        if let Err(e) = self.pause() {
            tracing::error!(error = %e, "error pausing after end of stream");
        }
        self.pending_events.push(PlayerEvent::VideoEnded);
        tracing::info!("video ended, reset to first frame");
    }

    // ===== Persistence =====

    /// Persist the current path, position and volume
    ///
    /// Best effort: a failed save is logged and playback carries on. Does
    /// nothing when no video is loaded.
    pub fn save_state(&mut self) {
        let Some(video_path) = self.current_video.clone() else {
            return;
        };

        let record = PlaybackRecord {
            video_path,
            position: self.position().as_secs_f64(),
            volume: self.volume.level(),
        };
        match self.store.save(&record) {
            Ok(()) => tracing::info!("playback state saved"),
            Err(e) => tracing::error!(error = %e, "error saving playback state"),
        }
    }

    // ===== Events =====

    /// Take all pending events (clears the queue)
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn emit_state_changed(&mut self, state: PlayerState) {
        self.pending_events.push(PlayerEvent::StateChanged { state });
    }

    fn emit_video_loaded(&mut self, path: PathBuf) {
        self.pending_events.push(PlayerEvent::VideoLoaded { path });
    }

    fn emit_volume_changed(&mut self) {
        self.pending_events.push(PlayerEvent::VolumeChanged {
            level: self.volume.level(),
        });
    }

    fn emit_error(&mut self, message: String) {
        self.pending_events.push(PlayerEvent::Error { message });
    }
}
