//! Vitrine Hardware
//!
//! Hardware access for the Vitrine kiosk: battery monitoring, debounced
//! physical buttons, and RFID tag polling.
//!
//! # Architecture
//!
//! Every sensor sits behind a capability trait (`BatteryProbe`,
//! `TagScanner`), injected into the component that owns the policy:
//!
//! - `BatteryMonitor` - raw-to-percent mapping, fail-to-last-known-good
//! - `ButtonController` - software debounce ledger and action dispatch
//! - `RfidReader` - read debounce and same-tag suppression, fallback mode
//!
//! The real Raspberry Pi backends (rppal GPIO, MFRC522 over SPI) live in
//! the `rpi` module behind the `rpi` feature, so the crate builds and tests
//! anywhere. GPIO interrupts fire on their own thread and hand off through
//! a `GpioEvent` channel; nothing in this crate mutates shared state from
//! an interrupt context.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod battery;
mod buttons;
mod error;
mod rfid;
mod traits;

#[cfg(feature = "rpi")]
pub mod rpi;

// Public exports
pub use battery::BatteryMonitor;
pub use buttons::{ButtonAction, ButtonController, ButtonEvent, GpioEvent};
pub use error::{HardwareError, Result};
pub use rfid::RfidReader;
pub use traits::{BatteryProbe, DisconnectedProbe, TagScanner};
