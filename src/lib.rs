//! Library to decode `.irb` thermal captures from VarioCAM
//! cameras and pair them with weather-station records.
//!
//! `.irb` exports carry no dimension header that we can
//! rely on, so decoding happens in two steps:
//!
//! 1. [Infer the geometry](geometry::infer_geometry) of the
//! capture from its size, using a fixed
//! [catalog](geometry::CATALOG) of known sensor
//! configurations.
//!
//! 2. [Decode](image::decode_frame) the samples after the
//! header into a grid of calibrated temperatures.
//!
//! The capture is shown together with one day of weather
//! data: [`match_weather_record`] extracts that day from a
//! station export, and [`apply_range_event`] moves the clip
//! window of the colour scale.
//!
//! # Usage
//!
//! ```rust
//! # fn test_compile() -> thermal_irb::Result<()> {
//! use std::path::Path;
//! use thermal_irb::{ThermalImage, WeatherColumns, WeatherTable};
//!
//! let image = ThermalImage::from_capture_path(Path::new("capture.irb"))?;
//! let (height, width) = image.dim();
//!
//! let table = WeatherTable::from_path(Path::new("station.csv"))?;
//! let date = chrono::NaiveDate::from_ymd_opt(2025, 6, 6).unwrap();
//! let record = thermal_irb::match_weather_record(&table, &WeatherColumns::default(), date)?;
//! println!("{}x{}\n{}", width, height, record.summary());
//! # Ok(())
//! # }
//! ```
//!
//! [`Session`] ties these together the way the `irb-view`
//! binary uses them: load both inputs, render, adjust the
//! range, export a PNG.

pub mod error;
pub mod geometry;
pub mod temperature;
pub mod image;
pub mod stats;
pub mod weather;
pub mod range;
pub mod render;
pub mod config;
pub mod session;

pub mod cli;

pub use crate::config::ViewerConfig;
pub use crate::error::{Error, Result};
pub use crate::geometry::{infer_geometry, CaptureGeometry, SampleFormat, CATALOG};
pub use crate::image::{decode_frame, ThermalImage};
pub use crate::range::{apply_range_event, DisplayRange, RangeEvent};
pub use crate::session::{Rendering, Session, SessionState};
pub use crate::weather::{match_weather_record, WeatherColumns, WeatherRecord, WeatherTable};
