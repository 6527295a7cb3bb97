/// Kiosk configuration
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration, loaded once at startup and immutable afterwards.
///
/// Keys without a default are required; a missing or malformed required key
/// aborts startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KioskConfig {
    /// Screen geometry and windowing.
    pub display_settings: DisplaySettings,

    /// Playback, scanning and battery-threshold tunables.
    pub player_settings: PlayerSettings,

    /// Logical button name -> BCM pin number.
    pub gpio_pins: BTreeMap<String, u8>,

    #[serde(default = "default_battery")]
    pub battery_settings: BatterySettings,

    #[serde(default = "default_power_button_pin")]
    pub power_button_pin: u8,

    /// Ordered tag bindings; on lookup the first matching entry wins.
    pub rfid_tags: Vec<TagBinding>,

    /// Video loaded when test mode is toggled (F10).
    pub test_video: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplaySettings {
    /// Target screen resolution.
    pub resolution: Resolution,
    /// Run borderless fullscreen.
    pub fullscreen: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSettings {
    /// RFID scan period in seconds.
    pub scan_interval: f64,

    /// Software debounce window for buttons, in seconds.
    pub button_debounce_time: f64,

    /// Startup volume, 0-100.
    pub default_volume: u8,

    /// Controls overlay opacity, 0.0-1.0.
    pub overlay_transparency: f64,

    /// Battery percentage at or below which a warning is shown.
    pub low_battery_threshold: u8,

    /// Battery percentage at or below which the kiosk shuts down.
    pub critical_battery_threshold: u8,

    /// Idle seconds before the controls overlay auto-hides.
    #[serde(default = "default_controls_timeout")]
    pub controls_timeout: f64,

    /// Where the last playback position is persisted.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct BatterySettings {
    /// Digital pin carrying the battery level signal.
    #[serde(default = "default_level_pin")]
    pub level_pin: u8,

    /// Digital pin carrying the charging signal.
    #[serde(default = "default_charging_pin")]
    pub charging_pin: u8,

    /// Raw reading mapped to 0%.
    #[serde(default = "default_raw_min")]
    pub raw_min: u16,

    /// Raw reading mapped to 100%.
    #[serde(default = "default_raw_max")]
    pub raw_max: u16,
}

/// Configured association between an RFID tag id and a video file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TagBinding {
    /// Tag UID as lowercase hex.
    pub tag_id: String,
    /// Video played when this tag is presented.
    pub video_path: PathBuf,
}

/// Upper bound for the seconds-based tunables
///
/// Anything above an hour is a config typo, and oversized values would
/// overflow the `Duration` conversions downstream.
const MAX_SECONDS_SETTING: f64 = 3600.0;

impl KioskConfig {
    /// Load configuration from a file, with environment overrides.
    ///
    /// The file format is detected from the extension (`.toml` and `.json`
    /// both work). Environment variables prefixed with `VITRINE__` override
    /// file values, e.g. `VITRINE__PLAYER_SETTINGS__SCAN_INTERVAL=0.5`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("VITRINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let player = &self.player_settings;

        if !player.scan_interval.is_finite()
            || player.scan_interval <= 0.0
            || player.scan_interval > MAX_SECONDS_SETTING
        {
            return Err(CoreError::config(
                "player_settings.scan_interval must be between 0 and 3600 seconds",
            ));
        }

        if !player.button_debounce_time.is_finite()
            || player.button_debounce_time < 0.0
            || player.button_debounce_time > MAX_SECONDS_SETTING
        {
            return Err(CoreError::config(
                "player_settings.button_debounce_time must be between 0 and 3600 seconds",
            ));
        }

        if player.default_volume > 100 {
            return Err(CoreError::config(
                "player_settings.default_volume must be between 0 and 100",
            ));
        }

        if !(0.0..=1.0).contains(&player.overlay_transparency) {
            return Err(CoreError::config(
                "player_settings.overlay_transparency must be between 0.0 and 1.0",
            ));
        }

        if player.critical_battery_threshold > player.low_battery_threshold {
            return Err(CoreError::config(
                "critical_battery_threshold must not exceed low_battery_threshold",
            ));
        }

        if !player.controls_timeout.is_finite()
            || player.controls_timeout <= 0.0
            || player.controls_timeout > MAX_SECONDS_SETTING
        {
            return Err(CoreError::config(
                "player_settings.controls_timeout must be between 0 and 3600 seconds",
            ));
        }

        if self.battery_settings.raw_max <= self.battery_settings.raw_min {
            return Err(CoreError::config(
                "battery_settings.raw_max must be greater than raw_min",
            ));
        }

        // Duplicate ids are allowed (first match wins) but almost always a
        // config mistake, so call them out.
        let mut seen = std::collections::HashSet::new();
        for binding in &self.rfid_tags {
            if !seen.insert(binding.tag_id.as_str()) {
                tracing::warn!(
                    tag_id = %binding.tag_id,
                    "duplicate tag binding; the first entry takes precedence"
                );
            }
        }

        Ok(())
    }

    /// Resolve a scanned tag id against the bindings.
    ///
    /// Linear scan in file order; the first matching entry wins.
    pub fn video_for_tag(&self, tag_id: &str) -> Option<&Path> {
        self.rfid_tags
            .iter()
            .find(|binding| binding.tag_id == tag_id)
            .map(|binding| binding.video_path.as_path())
    }
}

impl PlayerSettings {
    /// RFID scan period as a `Duration`.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs_f64(self.scan_interval)
    }

    /// Software button debounce window as a `Duration`.
    pub fn button_debounce(&self) -> Duration {
        Duration::from_secs_f64(self.button_debounce_time)
    }

    /// Controls auto-hide timeout as a `Duration`.
    pub fn controls_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.controls_timeout)
    }
}

// Default values
fn default_battery() -> BatterySettings {
    BatterySettings {
        level_pin: default_level_pin(),
        charging_pin: default_charging_pin(),
        raw_min: default_raw_min(),
        raw_max: default_raw_max(),
    }
}

fn default_level_pin() -> u8 {
    25
}

fn default_charging_pin() -> u8 {
    26
}

fn default_raw_min() -> u16 {
    0
}

fn default_raw_max() -> u16 {
    1023
}

fn default_power_button_pin() -> u8 {
    3
}

fn default_controls_timeout() -> f64 {
    3.0
}

fn default_state_file() -> PathBuf {
    PathBuf::from("playback_state.json")
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            display_settings: DisplaySettings {
                resolution: Resolution {
                    width: 800,
                    height: 480,
                },
                fullscreen: true,
            },
            player_settings: PlayerSettings {
                scan_interval: 1.0,
                button_debounce_time: 0.3,
                default_volume: 80,
                overlay_transparency: 0.8,
                low_battery_threshold: 20,
                critical_battery_threshold: 10,
                controls_timeout: default_controls_timeout(),
                state_file: default_state_file(),
            },
            gpio_pins: BTreeMap::new(),
            battery_settings: default_battery(),
            power_button_pin: default_power_button_pin(),
            rfid_tags: Vec::new(),
            test_video: PathBuf::from("test_video.mp4"),
        }
    }
}
