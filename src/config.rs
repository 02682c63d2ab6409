//! Viewer configuration, read from JSON.
//!
//! Every field is optional:
//!
//! ```json
//! {
//!   "target_date": "2025-06-06",
//!   "colorbar": true,
//!   "columns": { "date": "Tag", "date_format": "%d.%m.%Y" }
//! }
//! ```

use std::{fs::File, io::BufReader, path::Path};

use chrono::NaiveDate;
use serde_derive::*;

use crate::{
    error::{Error, Result},
    weather::WeatherColumns,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Day of the weather record shown next to the capture.
    pub target_date: NaiveDate,
    pub columns: WeatherColumns,
    /// Draw a colour bar next to exported images.
    pub colorbar: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            target_date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap_or(NaiveDate::MIN),
            columns: WeatherColumns::default(),
            colorbar: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::reading(path, e))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::io(format!("invalid config {}", path.display()), e))
    }
}
