//! Resource tracks (health, focus, investiture).
//!
//! A track is a clamped numeric value with a min and max.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A numeric resource clamped between min and max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Current value.
    pub value: i64,
    /// Maximum value.
    pub max: i64,
    /// Minimum value (usually 0).
    #[serde(default)]
    pub min: i64,
}

impl Track {
    /// A track starting at its maximum value.
    pub fn new(max: i64) -> Self {
        Self {
            value: max,
            max,
            min: 0,
        }
    }

    /// A track with a custom starting value, clamped into `min..=max`.
    /// A max below min pins the value at min.
    pub fn with_range(value: i64, min: i64, max: i64) -> Self {
        Self {
            value: value.clamp(min, max.max(min)),
            max,
            min,
        }
    }

    /// Adjust the track by a delta, clamping to bounds. Returns the new value.
    pub fn adjust(&mut self, delta: i64) -> i64 {
        self.set(self.value.saturating_add(delta))
    }

    /// Set the track to `value`, clamping to bounds. Returns the new value.
    pub fn set(&mut self, value: i64) -> i64 {
        self.value = value.clamp(self.min, self.max.max(self.min));
        self.value
    }

    /// Returns true if the track is at its minimum value.
    pub fn is_empty(&self) -> bool {
        self.value <= self.min
    }

    /// Returns true if the track is at its maximum value.
    pub fn is_full(&self) -> bool {
        self.value >= self.max
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_starts_at_max() {
        let t = Track::new(10);
        assert_eq!(t.value, 10);
        assert_eq!(t.min, 0);
        assert!(t.is_full());
        assert!(!t.is_empty());
    }

    #[test]
    fn with_range_clamps_initial() {
        let t = Track::with_range(100, 0, 10);
        assert_eq!(t.value, 10);
    }

    #[test]
    fn with_range_below_min_pins_to_min() {
        let t = Track::with_range(3, 0, -2);
        assert_eq!(t.value, 0);
        assert_eq!(t.max, -2);
    }

    #[test]
    fn adjust_saturates() {
        let mut t = Track::with_range(0, i64::MIN, i64::MAX);
        assert_eq!(t.adjust(i64::MIN), i64::MIN);
        assert_eq!(t.adjust(i64::MIN), i64::MIN);
    }

    #[test]
    fn adjust_clamps_both_ways() {
        let mut t = Track::new(5);
        assert_eq!(t.adjust(10), 5);
        assert_eq!(t.adjust(-20), 0);
        assert!(t.is_empty());
        assert_eq!(t.adjust(3), 3);
    }

    #[test]
    fn set_clamps() {
        let mut t = Track::with_range(2, 0, 4);
        assert_eq!(t.set(-1), 0);
        assert_eq!(t.set(9), 4);
    }

    #[test]
    fn display() {
        assert_eq!(Track::with_range(3, 0, 5).to_string(), "3/5");
    }

    #[test]
    fn min_defaults_to_zero_in_json() {
        let t: Track = serde_json::from_str(r#"{ "value": 4, "max": 6 }"#).unwrap();
        assert_eq!(t, Track::with_range(4, 0, 6));
    }
}
