//! Conversion from raw sensor samples to temperature.
//!
//! The VarioCAM exports used here are linearly scaled: the
//! full `u16` range maps onto 0–100 °C. The same factor is
//! applied to `f32` captures. Whether float captures are
//! already in °C is unknown, so the factor is kept as is;
//! downstream comparisons with weather data were made with
//! this mapping.

use serde_derive::*;

/// Degrees per raw unit for the 16-bit sensor path.
pub const RAW_SCALE: f64 = 100.0 / 65535.0;

/// Linear raw-to-temperature mapping.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    scale: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration { scale: RAW_SCALE }
    }
}

impl Calibration {
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn temperature_transform(&self) -> impl Fn(f64) -> f64 {
        let scale = self.scale;
        move |raw| raw * scale
    }

    pub fn raw_to_temp(&self, raw: f64) -> f64 {
        self.temperature_transform()(raw)
    }
}
