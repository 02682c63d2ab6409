//! The clip window of the colour scale.
//!
//! A [`DisplayRange`] only ever changes through
//! [`apply_range_event`], so a viewer can keep its two
//! slider controls in sync with the returned value.

use serde::{Deserialize, Deserializer};
use serde_derive::*;

pub const RANGE_MIN: f64 = 0.;
pub const RANGE_MAX: f64 = 100.;

/// Temperatures (°C) mapped to the ends of the colour scale.
/// Always ordered and within `[RANGE_MIN, RANGE_MAX]`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct DisplayRange {
    low: f64,
    high: f64,
}

impl Default for DisplayRange {
    fn default() -> Self {
        DisplayRange {
            low: RANGE_MIN,
            high: RANGE_MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeEvent {
    AdjustLow(f64),
    AdjustHigh(f64),
    Reset,
}

impl DisplayRange {
    /// Build an ordered, clamped range from two bounds.
    pub fn new(a: f64, b: f64) -> Self {
        let (a, b) = (clamp(a), clamp(b));
        DisplayRange {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn clip(&self, value: f64) -> f64 {
        value.max(self.low).min(self.high)
    }

    /// Position of `value` on the colour scale, in `[0, 1]`.
    /// A flat range maps everything to 0, as does NaN.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.high - self.low;
        if span <= 0. || value.is_nan() {
            return 0.;
        }
        (self.clip(value) - self.low) / span
    }
}

/// Deserialized bounds go through [`DisplayRange::new`].
impl<'de> Deserialize<'de> for DisplayRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Bounds {
            low: f64,
            high: f64,
        }

        let Bounds { low, high } = Bounds::deserialize(deserializer)?;
        Ok(DisplayRange::new(low, high))
    }
}

fn clamp(v: f64) -> f64 {
    v.max(RANGE_MIN).min(RANGE_MAX)
}

/// Next state of the range controller. Non-finite values
/// leave the range unchanged.
pub fn apply_range_event(range: DisplayRange, event: RangeEvent) -> DisplayRange {
    match event {
        RangeEvent::Reset => DisplayRange::default(),
        RangeEvent::AdjustLow(v) | RangeEvent::AdjustHigh(v) if !v.is_finite() => range,
        RangeEvent::AdjustLow(v) => DisplayRange::new(v, range.high),
        RangeEvent::AdjustHigh(v) => DisplayRange::new(range.low, v),
    }
}
