//! Capability traits for hardware collaborators
//!
//! Each hardware-backed component takes its sensor through one of these
//! traits, so a real GPIO/SPI backend and a test fake are interchangeable.
//! Real implementations live in the `rpi` module (behind the `rpi` feature).

use crate::error::{HardwareError, Result};

/// Battery sensing capability
///
/// `read_level_raw` reports the raw sensor value that `BatteryMonitor` maps
/// to a percentage; `read_charging` reports the digital charge signal. Both
/// are allowed to fail on any call; callers keep the last good value.
pub trait BatteryProbe: Send {
    /// Read the raw battery level signal
    fn read_level_raw(&mut self) -> Result<u16>;

    /// Read the charging status signal
    fn read_charging(&mut self) -> Result<bool>;
}

/// RFID scanning capability
///
/// `poll_tag` must be non-blocking: it answers "is a tag in the field right
/// now", returning its id as lowercase hex when one is.
pub trait TagScanner: Send {
    /// Poll for a tag in the field
    ///
    /// # Returns
    /// * `Ok(Some(id))` - a tag is present and was read
    /// * `Ok(None)` - no tag in the field
    /// * `Err(_)` - a tag is present but could not be read
    fn poll_tag(&mut self) -> Result<Option<String>>;

    /// Attempt to reinitialize the scanner after a read error
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Battery probe used when the monitoring hardware is absent
///
/// Every read fails, which makes `BatteryMonitor` hold its initial
/// safe defaults (100%, not charging) for the whole session.
#[derive(Debug, Default)]
pub struct DisconnectedProbe;

impl BatteryProbe for DisconnectedProbe {
    fn read_level_raw(&mut self) -> Result<u16> {
        Err(HardwareError::read("battery monitor not available"))
    }

    fn read_charging(&mut self) -> Result<bool> {
        Err(HardwareError::read("battery monitor not available"))
    }
}
