//! RFID tag polling with debounce and same-tag suppression
//!
//! A tag sitting on the reader is reported once; it has to leave the field
//! and come back (after the debounce window) before it triggers again. A
//! different tag triggers immediately. Constructed `disconnected()` when the
//! reader hardware is absent, in which case every poll reports nothing.

use crate::traits::TagScanner;
use std::time::{Duration, Instant};

/// Minimum time between two accepted reads of the same tag
const READ_DEBOUNCE: Duration = Duration::from_secs(1);

/// Polls a `TagScanner` and filters repeat reads
pub struct RfidReader {
    scanner: Option<Box<dyn TagScanner>>,
    last_accepted: Option<Instant>,
    last_tag: Option<String>,
    /// True while the last accepted tag has stayed in the field
    tag_present: bool,
}

impl RfidReader {
    /// Create a reader over a connected scanner
    pub fn new(scanner: Box<dyn TagScanner>) -> Self {
        Self {
            scanner: Some(scanner),
            last_accepted: None,
            last_tag: None,
            tag_present: false,
        }
    }

    /// Create a reader in fallback mode (no hardware)
    ///
    /// Every poll returns `None`.
    pub fn disconnected() -> Self {
        Self {
            scanner: None,
            last_accepted: None,
            last_tag: None,
            tag_present: false,
        }
    }

    /// Whether a scanner is attached
    pub fn is_connected(&self) -> bool {
        self.scanner.is_some()
    }

    /// Poll for a newly presented tag
    ///
    /// Returns a tag id only when it should trigger an action: a different
    /// tag than the last accepted one, or the same tag after it left the
    /// field and the debounce window elapsed. Scanner errors are logged; the
    /// scanner gets one reset attempt and the reader drops to fallback mode
    /// if that fails too.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let scanner = self.scanner.as_mut()?;

        match scanner.poll_tag() {
            Ok(Some(tag_id)) => {
                if self.last_tag.as_deref() == Some(tag_id.as_str()) {
                    let within_window = self
                        .last_accepted
                        .is_some_and(|last| now.duration_since(last) < READ_DEBOUNCE);
                    if self.tag_present || within_window {
                        self.tag_present = true;
                        return None;
                    }
                }

                self.tag_present = true;
                self.last_accepted = Some(now);
                self.last_tag = Some(tag_id.clone());
                tracing::info!(tag_id = %tag_id, "RFID tag detected");
                Some(tag_id)
            }
            Ok(None) => {
                self.tag_present = false;
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "error reading RFID tag");
                if let Err(reset_err) = scanner.reset() {
                    tracing::warn!(
                        error = %reset_err,
                        "RFID reader reinitialization failed, running in fallback mode"
                    );
                    self.scanner = None;
                }
                None
            }
        }
    }
}
