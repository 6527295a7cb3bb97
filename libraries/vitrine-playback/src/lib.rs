//! Vitrine - Playback Management
//!
//! Pipeline-agnostic video playback management for the Vitrine kiosk.
//!
//! This crate provides:
//! - Video lifecycle (load, play, pause, stop)
//! - Seek with duration clamping
//! - Linear volume control (0-100%)
//! - Playback state persistence (path, position, volume)
//! - End-of-stream handling (rewind to first frame, no auto-advance)
//!
//! # Architecture
//!
//! `vitrine-playback` is completely pipeline-agnostic:
//! - No dependency on GStreamer
//! - No dependency on vitrine-hardware (GPIO, SPI)
//! - Runs headless in tests
//!
//! The actual media backend is supplied via the [`MediaPipeline`] trait;
//! on the kiosk that is a GStreamer `playbin`, in tests an in-memory fake.
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use vitrine_playback::{MediaPipeline, PipelineEvent, Result, StateStore, VideoPlayer};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! // Implement MediaPipeline for your backend
//! struct NullPipeline;
//!
//! impl MediaPipeline for NullPipeline {
//!     fn set_source(&mut self, _path: &Path) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn play(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn pause(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn stop(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn seek(&mut self, _position: Duration) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn set_volume(&mut self, _volume: f64) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn position(&self) -> Option<Duration> {
//!         None
//!     }
//!
//!     fn duration(&self) -> Option<Duration> {
//!         None
//!     }
//!
//!     fn poll_event(&mut self) -> Option<PipelineEvent> {
//!         None
//!     }
//! }
//!
//! // Use with the video player
//! let store = StateStore::new("playback_state.json");
//! let mut player = VideoPlayer::new(Box::new(NullPipeline), store, 80);
//!
//! player.load(Path::new("/videos/tag-0001.mp4")).ok();
//! player.play().ok();
//!
//! // Drain events for the UI layer
//! for event in player.take_events() {
//!     println!("{event:?}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod pipeline;
mod player;
mod state;
mod types;
mod volume;

// Public exports
pub use error::{PlaybackError, Result};
pub use pipeline::{MediaPipeline, PipelineEvent};
pub use player::{PlayerEvent, VideoPlayer};
pub use state::{PlaybackRecord, StateStore};
pub use types::PlayerState;
