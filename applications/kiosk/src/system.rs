//! OS-level side effects
//!
//! Shutting the machine down and renicing the kiosk process both go
//! through `SystemControl`, so tests can record the calls instead of
//! halting the test host.

use std::io;
use std::process::Command;

/// Process scheduling priority requested by the resource throttle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Normal priority while a video is loaded
    Normal,
    /// Lowered priority while the kiosk sits idle
    Idle,
}

/// Capability to shut down the host and adjust scheduling priority
pub trait SystemControl: Send {
    /// Power the machine off. Terminal and irreversible.
    fn shutdown(&mut self) -> io::Result<()>;

    /// Request a scheduling priority for the kiosk process
    ///
    /// Failures here are non-fatal; the caller logs and carries on.
    fn set_priority(&mut self, priority: Priority) -> io::Result<()>;
}

/// Real implementation shelling out to `shutdown` and `renice`
#[derive(Debug, Default)]
pub struct OsControl;

impl SystemControl for OsControl {
    fn shutdown(&mut self) -> io::Result<()> {
        tracing::warn!("issuing system shutdown");
        let status = Command::new("sudo")
            .args(["shutdown", "-h", "now"])
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("shutdown exited with {status}")))
        }
    }

    fn set_priority(&mut self, priority: Priority) -> io::Result<()> {
        let niceness = match priority {
            Priority::Normal => "0",
            Priority::Idle => "10",
        };
        let pid = std::process::id().to_string();
        let status = Command::new("renice")
            .args(["-n", niceness, "-p", &pid])
            .status()?;
        if status.success() {
            tracing::debug!(niceness, "process priority adjusted");
            Ok(())
        } else {
            Err(io::Error::other(format!("renice exited with {status}")))
        }
    }
}
