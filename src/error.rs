//! Error kinds reported by the decode / match / render
//! pipeline.
//!
//! Geometry inference never fails; everything else returns
//! one of these.

use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::geometry::CaptureGeometry;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("capture holds {actual} bytes, but geometry {geometry} needs at least {expected}")]
    UnderfilledCapture {
        geometry: CaptureGeometry,
        expected: usize,
        actual: usize,
    },

    #[error("no weather record found for {0}")]
    WeatherRecordNotFound(NaiveDate),

    #[error("weather record for {date}: field `{field}` is missing or not numeric")]
    WeatherFieldMissing { date: NaiveDate, field: String },

    #[error("{context}: {source}")]
    IoFailure {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub(crate) fn io<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::IoFailure {
            context: context.into(),
            source: source.into(),
        }
    }

    pub(crate) fn reading<E>(path: &Path, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::io(format!("could not read {}", path.display()), source)
    }
}
