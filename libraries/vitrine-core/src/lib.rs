//! Vitrine Core
//!
//! Configuration and shared error handling for the Vitrine video kiosk.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Configuration**: `KioskConfig` and its sections, loaded once at
//!   startup from a TOML/JSON file with environment overrides
//! - **Tag bindings**: the ordered `rfid_tags` table mapping tag ids to
//!   video files, resolved first-match-wins
//! - **Error Handling**: unified `CoreError` and `Result` types
//!
//! Everything hardware- or pipeline-specific lives in `vitrine-hardware`
//! and `vitrine-playback`; this crate stays dependency-light so both can
//! share it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{
    BatterySettings, DisplaySettings, KioskConfig, PlayerSettings, Resolution, TagBinding,
};
pub use error::{CoreError, Result};
