//! Battery level and charging status monitoring
//!
//! Wraps a `BatteryProbe` with the fail-to-last-known-good policy: a read
//! failure is logged and the previous successfully observed value is
//! returned, so a flaky UPS HAT never takes the kiosk down with it.

use crate::traits::BatteryProbe;

/// Monitors battery level and charging status
///
/// Raw readings are converted to a percentage through a linear mapping from
/// `raw_min..=raw_max` to 0..=100, clamped at both ends. Until a first
/// successful read the level reports 100 and charging reports false.
pub struct BatteryMonitor {
    probe: Box<dyn BatteryProbe>,
    raw_min: u16,
    raw_max: u16,
    level: u8,
    charging: bool,
}

impl BatteryMonitor {
    /// Create a new monitor over the given probe
    pub fn new(probe: Box<dyn BatteryProbe>, raw_min: u16, raw_max: u16) -> Self {
        Self {
            probe,
            raw_min,
            raw_max,
            // Defaults until the first successful read
            level: 100,
            charging: false,
        }
    }

    /// Current battery level as a percentage (0-100)
    ///
    /// Returns the last known value when the probe read fails.
    pub fn level(&mut self) -> u8 {
        match self.probe.read_level_raw() {
            Ok(raw) => {
                self.level = self.to_percentage(raw);
                self.level
            }
            Err(e) => {
                tracing::warn!(error = %e, "error reading battery level");
                self.level
            }
        }
    }

    /// Whether the battery is currently charging
    ///
    /// Returns the last known value when the probe read fails.
    pub fn is_charging(&mut self) -> bool {
        match self.probe.read_charging() {
            Ok(charging) => {
                self.charging = charging;
                self.charging
            }
            Err(e) => {
                tracing::warn!(error = %e, "error reading charging status");
                self.charging
            }
        }
    }

    fn to_percentage(&self, raw: u16) -> u8 {
        let span = f64::from(self.raw_max) - f64::from(self.raw_min);
        let percentage = (f64::from(raw) - f64::from(self.raw_min)) / span * 100.0;
        percentage.clamp(0.0, 100.0) as u8
    }
}
