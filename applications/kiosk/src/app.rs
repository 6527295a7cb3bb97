//! The kiosk orchestrator
//!
//! One cooperative timeline drives everything: periodic tasks (tag scan,
//! battery check, resource throttle, progress/controls update) are
//! interval arms of a single `select!` loop, and touch/key/GPIO input
//! arrives over channels into the same loop. Session state has exactly
//! one writer, so none of it needs a lock.
//!
//! Every handler takes `now` explicitly, which keeps the whole scheduler
//! testable without a live timer.

use crate::system::{Priority, SystemControl};
use crate::ui::{KeyCode, UiEvent, UiSink};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use vitrine_core::KioskConfig;
use vitrine_hardware::{BatteryMonitor, ButtonAction, ButtonController, GpioEvent, RfidReader};
use vitrine_playback::{MediaPipeline, PlaybackError, PlayerEvent, StateStore, VideoPlayer};

/// How often the battery level is checked
const BATTERY_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// How often idle/active resource throttling is re-evaluated
const THROTTLE_INTERVAL: Duration = Duration::from_secs(300);

/// How often progress and controls visibility are refreshed
const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Time the critical-battery warning stays on screen before shutdown
const CRITICAL_BATTERY_GRACE: Duration = Duration::from_secs(5);

/// Time the power-button message stays on screen before shutdown
const POWER_BUTTON_GRACE: Duration = Duration::from_secs(2);

/// Seek step for the left/right touch zones
const TOUCH_SEEK_STEP: Duration = Duration::from_secs(10);

/// Volume change per button press
const VOLUME_STEP: u8 = 5;

/// Height in pixels of the progress-bar strip at the bottom of the screen
const PROGRESS_STRIP_HEIGHT: f64 = 50.0;

/// Mutable session state, owned by the orchestrator
///
/// Mutated only by the handlers on the scheduler timeline; nothing else
/// ever writes to it.
#[derive(Debug)]
pub struct SessionState {
    /// Path of the currently loaded video, if any
    pub current_video: Option<PathBuf>,
    /// Whether the controls overlay is on screen
    pub controls_visible: bool,
    /// When the screen was last touched (or a message shown)
    pub last_touch: Instant,
    /// Test mode suppresses tag scanning
    pub test_mode: bool,
    /// Progress polling, disabled by the throttle while idle
    pub progress_enabled: bool,
    /// One-shot latch: set when a shutdown has been armed
    pub shutdown_latched: bool,
}

impl SessionState {
    fn new(now: Instant) -> Self {
        Self {
            current_video: None,
            controls_visible: false,
            last_touch: now,
            test_mode: false,
            progress_enabled: true,
            shutdown_latched: false,
        }
    }
}

/// The kiosk application: owns every component and the session state
pub struct KioskApp {
    config: KioskConfig,
    session: SessionState,
    battery: BatteryMonitor,
    buttons: ButtonController,
    rfid: RfidReader,
    player: VideoPlayer,
    ui: Box<dyn UiSink>,
    system: Box<dyn SystemControl>,
    shutdown_at: Option<Instant>,
}

impl KioskApp {
    /// Assemble the application from its injected collaborators
    ///
    /// The button controller is built from the configured pin table; every
    /// button whose name maps to a known action gets that action bound.
    pub fn new(
        config: KioskConfig,
        battery: BatteryMonitor,
        rfid: RfidReader,
        pipeline: Box<dyn MediaPipeline>,
        ui: Box<dyn UiSink>,
        system: Box<dyn SystemControl>,
    ) -> Self {
        let mut buttons = ButtonController::new(
            &config.gpio_pins,
            config.player_settings.button_debounce(),
        );
        for name in config.gpio_pins.keys() {
            if let Some(action) = ButtonAction::from_name(name) {
                buttons.bind(name, action);
            }
        }

        let store = StateStore::new(config.player_settings.state_file.clone());
        let player = VideoPlayer::new(pipeline, store, config.player_settings.default_volume);

        Self {
            config,
            session: SessionState::new(Instant::now()),
            battery,
            buttons,
            rfid,
            player,
            ui,
            system,
            shutdown_at: None,
        }
    }

    /// Run the scheduler loop until shutdown or Ctrl-C
    pub async fn run(
        mut self,
        mut ui_events: UnboundedReceiver<UiEvent>,
        mut gpio_events: UnboundedReceiver<GpioEvent>,
    ) -> anyhow::Result<()> {
        let mut scan = tokio::time::interval(self.config.player_settings.scan_interval());
        let mut battery = tokio::time::interval(BATTERY_CHECK_INTERVAL);
        let mut throttle = tokio::time::interval(THROTTLE_INTERVAL);
        let mut progress = tokio::time::interval(PROGRESS_INTERVAL);
        for interval in [&mut scan, &mut battery, &mut throttle, &mut progress] {
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        }

        self.show_message("Insert Plate", Instant::now());
        tracing::info!("background tasks started");

        let mut ui_open = true;
        let mut gpio_open = true;

        loop {
            let deadline = self.shutdown_at.map(tokio::time::Instant::from_std);

            tokio::select! {
                _ = scan.tick() => self.scan_tick(Instant::now()),
                _ = battery.tick() => self.battery_tick(Instant::now()),
                _ = throttle.tick() => self.throttle_tick(),
                _ = progress.tick() => self.progress_tick(Instant::now()),

                event = ui_events.recv(), if ui_open => match event {
                    Some(event) => self.handle_ui_event(event, Instant::now()),
                    None => ui_open = false,
                },
                event = gpio_events.recv(), if gpio_open => match event {
                    Some(event) => self.handle_gpio_event(event, Instant::now()),
                    None => gpio_open = false,
                },

                () = async {
                    match deadline {
                        Some(at) => tokio::time::sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                } => {
                    self.execute_shutdown();
                    return Ok(());
                }

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupt received, saving playback state");
                    if let Err(e) = self.player.stop() {
                        tracing::error!(error = %e, "error during teardown");
                    }
                    return Ok(());
                }
            }
        }
    }

    // ===== Periodic tasks =====

    /// Poll the RFID reader and react to a newly presented tag
    pub fn scan_tick(&mut self, now: Instant) {
        if self.session.test_mode {
            return;
        }
        let Some(tag_id) = self.rfid.poll(now) else {
            return;
        };

        match self.config.video_for_tag(&tag_id) {
            Some(path) => {
                let path = path.to_path_buf();
                self.load_video(&path, now);
            }
            None => {
                // A running video is never interrupted by a stray tag.
                if self.session.current_video.is_none() {
                    tracing::warn!(tag_id = %tag_id, "tag has no video binding");
                    self.show_message("Unidentified Tag Detected", now);
                }
            }
        }
    }

    /// Check the battery level and arm the shutdown sequence if critical
    pub fn battery_tick(&mut self, now: Instant) {
        let level = self.battery.level();
        let settings = &self.config.player_settings;

        if level <= settings.critical_battery_threshold {
            if self.session.shutdown_latched {
                return;
            }
            self.session.shutdown_latched = true;
            tracing::error!(level, "critical battery level, shutdown armed");
            self.show_message("Critical Battery Level - Shutting Down in 5 seconds", now);
            // Delayed deadline on the scheduler timeline; polling continues
            // while the warning is on screen.
            self.shutdown_at = Some(now + CRITICAL_BATTERY_GRACE);
        } else if level <= settings.low_battery_threshold {
            let message = if self.battery.is_charging() {
                format!("Low Battery: {level}% (charging)")
            } else {
                format!("Low Battery: {level}%")
            };
            tracing::warn!(level, "low battery");
            self.show_message(&message, now);
        }
    }

    /// Throttle CPU usage while idle, restore it while a video is loaded
    pub fn throttle_tick(&mut self) {
        let (enabled, priority) = if self.session.current_video.is_none() {
            (false, Priority::Idle)
        } else {
            (true, Priority::Normal)
        };

        self.session.progress_enabled = enabled;
        if let Err(e) = self.system.set_priority(priority) {
            tracing::warn!(error = %e, "error adjusting process priority");
        }
        tracing::debug!(?priority, "resource throttle applied");
    }

    /// Refresh displayed progress and auto-hide the controls overlay
    pub fn progress_tick(&mut self, now: Instant) {
        if self.session.current_video.is_none() || !self.session.progress_enabled {
            return;
        }

        self.player.handle_events();
        for event in self.player.take_events() {
            if let PlayerEvent::Error { message } = event {
                self.show_message(&format!("Playback error: {message}"), now);
            }
        }

        self.ui.set_progress(self.player.progress());

        let idle = now.duration_since(self.session.last_touch);
        if self.session.controls_visible
            && self.player.is_playing()
            && idle > self.config.player_settings.controls_timeout()
        {
            // Never auto-hide while paused: a stopped frame with no
            // controls looks like a hang.
            self.hide_controls();
        }
    }

    // ===== Input events =====

    /// Dispatch a touch, slider or key event from the GUI layer
    pub fn handle_ui_event(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::TouchDown { x_frac, .. } => self.on_touch_down(x_frac, now),
            UiEvent::TouchUp { x_frac, y } => self.on_touch_up(x_frac, y),
            UiEvent::SliderChanged(value) => self.on_slider_changed(value),
            UiEvent::Key(KeyCode::F10) => self.activate_test_mode(now),
            UiEvent::Key(KeyCode::Other(code)) => {
                tracing::trace!(code, "ignored key");
            }
        }
    }

    fn on_touch_down(&mut self, x_frac: f64, now: Instant) {
        if self.session.current_video.is_none() {
            return;
        }
        self.show_controls(now);

        if x_frac < 0.33 {
            self.seek_relative(-1);
        } else if x_frac > 0.66 {
            self.seek_relative(1);
        } else {
            self.toggle_playback();
        }
    }

    fn on_touch_up(&mut self, x_frac: f64, y: f64) {
        if self.session.current_video.is_none() {
            return;
        }
        // Only touches inside the progress-bar strip scrub.
        if y < PROGRESS_STRIP_HEIGHT {
            self.seek_to_fraction(x_frac);
        }
    }

    fn on_slider_changed(&mut self, value: f64) {
        if self.session.current_video.is_none() {
            return;
        }
        self.seek_to_fraction(value / 100.0);
    }

    /// Handle a raw edge forwarded from the GPIO interrupt context
    pub fn handle_gpio_event(&mut self, event: GpioEvent, now: Instant) {
        match event {
            GpioEvent::ButtonEdge { button, released } => {
                if let Some(event) = self.buttons.handle_edge(&button, released, now) {
                    if event.pressed {
                        self.dispatch_button(event.action, now);
                    }
                }
            }
            GpioEvent::PowerButton => {
                if self.session.shutdown_latched {
                    return;
                }
                self.session.shutdown_latched = true;
                tracing::info!("power button pressed, shutdown armed");
                self.show_message("Shutting Down...", now);
                self.shutdown_at = Some(now + POWER_BUTTON_GRACE);
            }
        }
    }

    fn dispatch_button(&mut self, action: ButtonAction, now: Instant) {
        match action {
            ButtonAction::PlayPause => {
                if self.session.current_video.is_some() {
                    self.show_controls(now);
                    self.toggle_playback();
                }
            }
            ButtonAction::Stop => {
                if let Err(e) = self.player.stop() {
                    tracing::error!(error = %e, "error stopping playback");
                }
                self.session.current_video = None;
                self.show_message("Insert Plate", now);
            }
            ButtonAction::VolumeUp => self.step_volume(VOLUME_STEP as i16),
            ButtonAction::VolumeDown => self.step_volume(-(VOLUME_STEP as i16)),
        }
    }

    fn step_volume(&mut self, delta: i16) {
        let level = (i16::from(self.player.volume_level()) + delta).clamp(0, 100) as u8;
        match self.player.set_volume(level) {
            Ok(()) => self.ui.show_message(&format!("Volume: {level}%")),
            Err(e) => tracing::error!(error = %e, "error setting volume"),
        }
    }

    // ===== Playback =====

    /// Load a video, keeping the session in step with the player on failure
    pub fn load_video(&mut self, path: &Path, now: Instant) {
        match self.player.load(path) {
            Ok(()) => {
                self.session.current_video = Some(path.to_path_buf());
                self.session.progress_enabled = true;
                self.show_message("Video Loaded - Press Play", now);
            }
            Err(PlaybackError::FileNotFound(missing)) => {
                // The player never touched the running video; neither do we.
                tracing::error!(path = %missing.display(), "video file not found");
                self.show_message(&format!("File not found: {}", missing.display()), now);
            }
            Err(e) => {
                tracing::error!(error = %e, "error loading video");
                // A mid-load pipeline failure tears the previous video down
                // as well, so the session has to follow the player here.
                self.session.current_video = self.player.current_video().map(Path::to_path_buf);
                self.session.progress_enabled = self.session.current_video.is_some();
                self.show_message(&format!("Error loading video: {e}"), now);
            }
        }
    }

    fn toggle_playback(&mut self) {
        if self.player.is_playing() {
            match self.player.pause() {
                Ok(()) => self.ui.show_message("Paused"),
                Err(e) => tracing::error!(error = %e, "error pausing"),
            }
        } else {
            match self.player.play() {
                Ok(()) => self.ui.show_message("Playing"),
                Err(e) => tracing::error!(error = %e, "error starting playback"),
            }
        }
    }

    fn seek_relative(&mut self, direction: i64) {
        let position = self.player.position();
        let target = if direction < 0 {
            position.saturating_sub(TOUCH_SEEK_STEP)
        } else {
            position + TOUCH_SEEK_STEP
        };
        if let Err(e) = self.player.seek(target) {
            tracing::error!(error = %e, "seek failed");
        }
    }

    fn seek_to_fraction(&mut self, fraction: f64) {
        let duration = self.player.duration();
        if duration.is_zero() {
            return;
        }
        let target = duration.mul_f64(fraction.clamp(0.0, 1.0));
        if let Err(e) = self.player.seek(target) {
            tracing::error!(error = %e, "seek failed");
        }
    }

    /// Enter test mode: stop reacting to tags and load the test video
    pub fn activate_test_mode(&mut self, now: Instant) {
        self.session.test_mode = true;
        tracing::info!("test mode activated");

        let test_video = self.config.test_video.clone();
        if test_video.exists() {
            self.load_video(&test_video, now);
        } else {
            self.show_message("Test video not found", now);
        }
    }

    // ===== Controls overlay =====

    fn show_controls(&mut self, now: Instant) {
        self.session.controls_visible = true;
        self.session.last_touch = now;
        self.ui.set_controls_visible(true);
    }

    fn hide_controls(&mut self) {
        self.session.controls_visible = false;
        self.ui.set_controls_visible(false);
    }

    fn show_message(&mut self, message: &str, now: Instant) {
        self.ui.show_message(message);
        self.show_controls(now);
    }

    // ===== Shutdown =====

    /// When the armed shutdown fires, if one has been armed
    pub fn shutdown_deadline(&self) -> Option<Instant> {
        self.shutdown_at
    }

    /// Persist playback state, release the pipeline and power off
    ///
    /// Terminal: there is no abort path once this runs.
    pub fn execute_shutdown(&mut self) {
        tracing::info!("shutdown sequence started");
        if let Err(e) = self.player.stop() {
            tracing::error!(error = %e, "error releasing playback during shutdown");
        }
        if let Err(e) = self.system.shutdown() {
            tracing::error!(error = %e, "shutdown command failed");
        }
    }

    // ===== Accessors =====

    /// Session state, for inspection in tests
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// The video player, for inspection in tests
    pub fn player(&self) -> &VideoPlayer {
        &self.player
    }
}
