//! Vitrine Kiosk
//!
//! The orchestrator binary for the Vitrine video kiosk: an RFID tag
//! selects a video, a touch overlay controls playback, and battery and
//! physical buttons are watched for status and shutdown events.
//!
//! # Architecture
//!
//! Everything runs on one cooperative timeline (`KioskApp::run`); the
//! hardware and OS sit behind injected traits so the whole scheduler is
//! testable with fakes:
//!
//! - `vitrine-hardware` supplies the battery monitor, button controller
//!   and RFID reader
//! - `vitrine-playback` supplies the video player over a `MediaPipeline`
//! - [`UiSink`]/[`UiEvent`] form the seam to the GUI layer
//! - [`SystemControl`] isolates shutdown and renice side effects

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod pipeline;
mod system;
mod ui;

pub use app::{KioskApp, SessionState};
pub use pipeline::NullPipeline;
pub use system::{OsControl, Priority, SystemControl};
pub use ui::{KeyCode, LoggingUi, UiEvent, UiSink};
