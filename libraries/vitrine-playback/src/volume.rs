//! Volume control
//!
//! Linear scaling: the 0-100 level maps straight onto the pipeline's
//! 0.0-1.0 volume property. Levels are clamped at 100.

/// Clamped volume level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    level: u8,
}

impl Volume {
    /// Create a volume at the given level (clamped to 100)
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(100),
        }
    }

    /// Set the level (clamped to 100)
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
    }

    /// Current level (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Linear fraction for the media pipeline (0.0-1.0)
    pub fn fraction(&self) -> f64 {
        f64::from(self.level) / 100.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(80)
    }
}
