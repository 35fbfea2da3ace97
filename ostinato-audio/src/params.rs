//! Tempo and pitch percentage controls and their signal-graph mappings
//!
//! Both user-facing controls are integer percentages in [50, 200] with a
//! default of 100. Mapping into the graph is pure: tempo scales the player's
//! playback rate directly, pitch converts to a semitone offset so the shift
//! stage stays independent of playback speed.

/// Lowest allowed control percentage
pub const PERCENT_MIN: i32 = 50;
/// Highest allowed control percentage
pub const PERCENT_MAX: i32 = 200;
/// Neutral control percentage (rate 1.0, no pitch shift)
pub const PERCENT_DEFAULT: i32 = 100;

/// A clamped tempo or pitch percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ControlPercent(i32);

impl Default for ControlPercent {
    fn default() -> Self {
        Self(PERCENT_DEFAULT)
    }
}

impl ControlPercent {
    /// Create a percentage, clamping into [50, 200]
    pub fn new(value: i32) -> Self {
        Self(value.clamp(PERCENT_MIN, PERCENT_MAX))
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// Apply an increment/decrement, clamping at the rails
    pub fn adjust(self, delta: i32) -> Self {
        Self::new(self.0 + delta)
    }
}

/// Map a tempo percentage to the player node's playback rate
pub fn tempo_rate(percent: ControlPercent) -> f64 {
    percent.get() as f64 / 100.0
}

/// Map a pitch percentage to the shift stage's semitone offset
///
/// 12 * log2(p/100): 100% -> 0, 200% -> +12 (octave up), 50% -> -12.
pub fn pitch_semitones(percent: ControlPercent) -> f64 {
    12.0 * (percent.get() as f64 / 100.0).log2()
}
