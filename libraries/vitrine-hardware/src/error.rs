//! Error types for hardware access

use thiserror::Error;

/// Hardware errors
#[derive(Debug, Error)]
pub enum HardwareError {
    /// Hardware initialization failed
    #[error("Initialization failed: {0}")]
    Init(String),

    /// A sensor read failed
    #[error("Read failed: {0}")]
    Read(String),

    /// GPIO access error
    #[error("GPIO error: {0}")]
    Gpio(String),
}

impl HardwareError {
    /// Create an initialization error
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Create a read error
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    /// Create a GPIO error
    pub fn gpio(msg: impl Into<String>) -> Self {
        Self::Gpio(msg.into())
    }
}

/// Result type for hardware operations
pub type Result<T> = std::result::Result<T, HardwareError>;
