//! UI seam between the orchestrator and the GUI layer
//!
//! The core never draws anything: it emits status text, progress and
//! controls visibility through a `UiSink`, and receives touch/key input
//! as `UiEvent`s over a channel. The GUI toolkit stays an external
//! collaborator on the other side of this seam.

/// Key identifiers the kiosk reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// F10 activates test mode
    F10,
    /// Any other key, carried for logging
    Other(u32),
}

/// Input event forwarded from the GUI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Finger down on the screen
    TouchDown {
        /// Horizontal position as a fraction of the screen width (0.0-1.0)
        x_frac: f64,
        /// Vertical position in pixels from the bottom
        y: f64,
    },

    /// Finger lifted off the screen
    TouchUp {
        /// Horizontal position as a fraction of the screen width (0.0-1.0)
        x_frac: f64,
        /// Vertical position in pixels from the bottom
        y: f64,
    },

    /// The progress slider was dragged to a new value (0-100)
    SliderChanged(f64),

    /// A key was pressed
    Key(KeyCode),
}

/// Output surface of the orchestrator
///
/// One text sink carries both status and user-visible failures; there is
/// no separate error channel.
pub trait UiSink: Send {
    /// Display a status message and bring up the controls overlay
    fn show_message(&mut self, message: &str);

    /// Update the displayed progress as a fraction of duration (0.0-1.0)
    fn set_progress(&mut self, fraction: f64);

    /// Show or hide the controls overlay
    fn set_controls_visible(&mut self, visible: bool);
}

/// Headless UI writing everything to the log
///
/// Used when the kiosk runs without a display attached.
#[derive(Debug, Default)]
pub struct LoggingUi;

impl UiSink for LoggingUi {
    fn show_message(&mut self, message: &str) {
        tracing::info!(message, "status");
    }

    fn set_progress(&mut self, fraction: f64) {
        tracing::trace!(fraction, "progress");
    }

    fn set_controls_visible(&mut self, visible: bool) {
        tracing::debug!(visible, "controls overlay");
    }
}
