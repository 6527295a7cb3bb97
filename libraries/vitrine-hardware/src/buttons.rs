//! Physical button handling with two-layer debouncing
//!
//! The pin backend applies a hardware-level debounce before an edge ever
//! reaches this module; `ButtonController` then applies the configurable
//! software window on top and turns accepted edges into named actions.
//!
//! Edges are delivered from the GPIO interrupt context over a channel and
//! handed to `handle_edge` on the scheduler timeline, so button state has a
//! single writer.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Raw event forwarded from the GPIO interrupt context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpioEvent {
    /// A configured button changed level
    ButtonEdge {
        /// Logical button name from the `gpio_pins` config table
        button: String,
        /// New level; true = high (released, pins idle pulled up)
        released: bool,
    },

    /// The power button was pressed (falling edge)
    PowerButton,
}

/// Action bound to a button name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Toggle between play and pause
    PlayPause,
    /// Stop playback
    Stop,
    /// Raise the volume a step
    VolumeUp,
    /// Lower the volume a step
    VolumeDown,
}

impl ButtonAction {
    /// Map a configured button name to its action
    ///
    /// Names with no mapping stay unbound: their state is still tracked
    /// but accepted edges dispatch nothing.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "play_pause" => Some(Self::PlayPause),
            "stop" => Some(Self::Stop),
            "volume_up" => Some(Self::VolumeUp),
            "volume_down" => Some(Self::VolumeDown),
            _ => None,
        }
    }
}

/// An accepted, debounced button event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    /// The action bound to the button
    pub action: ButtonAction,
    /// True when the edge was a press (level went low)
    pub pressed: bool,
}

struct ButtonLedger {
    pin: u8,
    /// Last recorded stable level; true = released (pull-up idle)
    released: bool,
    /// When the last event for this button was accepted
    last_accepted: Option<Instant>,
}

/// Debounces raw button edges and dispatches bound actions
///
/// An edge is accepted only if the software debounce window has elapsed
/// since the last accepted event for that button AND the reported level
/// differs from the recorded stable level. Ledger entries are created at
/// construction from the pin table and never removed.
pub struct ButtonController {
    debounce: Duration,
    ledger: HashMap<String, ButtonLedger>,
    bindings: HashMap<String, ButtonAction>,
}

impl ButtonController {
    /// Create a controller for the configured buttons
    pub fn new(gpio_pins: &BTreeMap<String, u8>, debounce: Duration) -> Self {
        let ledger = gpio_pins
            .iter()
            .map(|(name, &pin)| {
                (
                    name.clone(),
                    ButtonLedger {
                        pin,
                        released: true,
                        last_accepted: None,
                    },
                )
            })
            .collect();

        Self {
            debounce,
            ledger,
            bindings: HashMap::new(),
        }
    }

    /// Bind an action to a button name
    pub fn bind(&mut self, name: &str, action: ButtonAction) {
        if !self.ledger.contains_key(name) {
            tracing::warn!(button = %name, "binding a button with no configured pin");
        }
        self.bindings.insert(name.to_string(), action);
        tracing::info!(button = %name, action = ?action, "button action bound");
    }

    /// Process a raw edge, returning the bound action if the edge is accepted
    ///
    /// Unbound buttons still have their ledger updated; unknown names are
    /// logged and dropped.
    pub fn handle_edge(&mut self, name: &str, released: bool, now: Instant) -> Option<ButtonEvent> {
        let Some(entry) = self.ledger.get_mut(name) else {
            tracing::warn!(button = %name, "edge for unconfigured button");
            return None;
        };

        if let Some(last) = entry.last_accepted {
            if now.duration_since(last) < self.debounce {
                return None;
            }
        }

        // Only trigger on a level change
        if released == entry.released {
            return None;
        }

        entry.released = released;
        entry.last_accepted = Some(now);
        tracing::debug!(button = %name, pin = entry.pin, released, "button edge accepted");

        self.bindings.get(name).map(|&action| ButtonEvent {
            action,
            pressed: !released,
        })
    }

    /// Current stable level of a button; true = released
    ///
    /// Unknown names report released, matching the pull-up idle level.
    pub fn state(&self, name: &str) -> bool {
        self.ledger.get(name).map_or(true, |entry| entry.released)
    }
}
