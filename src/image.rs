use std::{fs::read, path::Path};

use byteordered::ByteOrdered;
use ndarray::{Array2, Axis};
use tracing::debug;

use crate::{
    error::{Error, Result},
    geometry::{infer_geometry, CaptureGeometry, SampleFormat},
    stats::Stats,
    temperature::Calibration,
};

/// Calibrated temperatures (°C) of one capture, indexed as
/// `(row, col)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalImage {
    geometry: CaptureGeometry,
    temperatures: Array2<f64>,
}

impl ThermalImage {
    /// Read a capture from disk, infer its geometry from the
    /// file size and decode it.
    pub fn from_capture_path(path: &Path) -> Result<Self> {
        let raw = read(path).map_err(|e| Error::reading(path, e))?;
        let geometry = infer_geometry(raw.len());
        debug!(path = %path.display(), len = raw.len(), %geometry, "read capture");
        decode_frame(&raw, &geometry)
    }

    pub fn geometry(&self) -> &CaptureGeometry {
        &self.geometry
    }

    pub fn temperatures(&self) -> &Array2<f64> {
        &self.temperatures
    }

    /// `(height, width)`
    pub fn dim(&self) -> (usize, usize) {
        self.temperatures.dim()
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn height(&self) -> usize {
        self.geometry.height
    }

    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        for &t in self.temperatures.iter() {
            stats += t;
        }
        stats
    }
}

/// Decode a raw capture into calibrated temperatures.
///
/// The samples following the header are read row-major,
/// scaled by [`Calibration::default`], and mirrored
/// left-to-right to undo the sensor optics. Bytes beyond the
/// sample grid are ignored; a capture too short for the
/// geometry is an error.
pub fn decode_frame(raw: &[u8], geometry: &CaptureGeometry) -> Result<ThermalImage> {
    let expected = geometry.expected_len();
    if raw.len() < expected {
        return Err(Error::UnderfilledCapture {
            geometry: *geometry,
            expected,
            actual: raw.len(),
        });
    }
    if raw.len() > expected {
        debug!(excess = raw.len() - expected, "ignoring trailing capture bytes");
    }

    let temp_t = Calibration::default().temperature_transform();
    let samples = &raw[geometry.header_bytes..expected];
    let values = read_samples(samples, geometry.num_samples(), geometry.sample)
        .map_err(|e| Error::io("reading capture samples", e))?;

    let mut temperatures = Array2::from_shape_vec((geometry.height, geometry.width), values)
        .map_err(|e| Error::io("arranging capture samples", e))?;
    temperatures.mapv_inplace(temp_t);
    temperatures.invert_axis(Axis(1));

    Ok(ThermalImage {
        geometry: *geometry,
        temperatures: temperatures.as_standard_layout().into_owned(),
    })
}

fn read_samples(bytes: &[u8], count: usize, format: SampleFormat) -> std::io::Result<Vec<f64>> {
    let mut rdr = ByteOrdered::le(bytes);
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        let value = match format {
            SampleFormat::U16 => rdr.read_u16()? as f64,
            SampleFormat::F32 => rdr.read_f32()? as f64,
        };
        values.push(value);
    }
    Ok(values)
}
