//! Infer the layout of a capture from its size.
//!
//! `.irb` captures carry no usable dimension header, so the
//! geometry is picked from a fixed [`CATALOG`] of known
//! sensor configurations by comparing byte counts. An exact
//! hit wins; otherwise the closest entry is used. The order
//! of the catalog decides ties and must not change: existing
//! captures rely on it.

use std::fmt;

use serde_derive::*;
use tracing::{debug, warn};

/// Encoding of a single pixel sample.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Little-endian `u16`.
    U16,
    /// Little-endian IEEE `f32`.
    F32,
}

impl SampleFormat {
    pub const fn bytes(self) -> usize {
        match self {
            SampleFormat::U16 => 2,
            SampleFormat::F32 => 4,
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleFormat::U16 => f.write_str("u16"),
            SampleFormat::F32 => f.write_str("f32"),
        }
    }
}

/// How to slice a capture into a header and a grid of
/// samples.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureGeometry {
    pub width: usize,
    pub height: usize,
    pub header_bytes: usize,
    pub sample: SampleFormat,
}

impl CaptureGeometry {
    pub const fn new(width: usize, height: usize, header_bytes: usize, sample: SampleFormat) -> Self {
        CaptureGeometry {
            width,
            height,
            header_bytes,
            sample,
        }
    }

    pub const fn bytes_per_sample(&self) -> usize {
        self.sample.bytes()
    }

    pub const fn num_samples(&self) -> usize {
        self.width * self.height
    }

    /// Size of a capture with exactly this geometry.
    pub const fn expected_len(&self) -> usize {
        self.num_samples() * self.bytes_per_sample() + self.header_bytes
    }

    fn distance_to(&self, len: usize) -> usize {
        let expected = self.expected_len();
        if expected > len {
            expected - len
        } else {
            len - expected
        }
    }
}

impl fmt::Display for CaptureGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} {} ({}-byte header)",
            self.width, self.height, self.sample, self.header_bytes
        )
    }
}

const HEADER_BYTES: usize = 1024;

/// Known sensor configurations, in lookup order.
pub const CATALOG: [CaptureGeometry; 16] = [
    CaptureGeometry::new(640, 512, HEADER_BYTES, SampleFormat::U16),
    CaptureGeometry::new(512, 384, HEADER_BYTES, SampleFormat::U16),
    CaptureGeometry::new(384, 288, HEADER_BYTES, SampleFormat::U16),
    CaptureGeometry::new(320, 240, HEADER_BYTES, SampleFormat::U16),
    CaptureGeometry::new(240, 180, HEADER_BYTES, SampleFormat::U16),
    CaptureGeometry::new(160, 120, HEADER_BYTES, SampleFormat::U16),
    CaptureGeometry::new(128, 96, HEADER_BYTES, SampleFormat::U16),
    CaptureGeometry::new(80, 60, HEADER_BYTES, SampleFormat::U16),
    CaptureGeometry::new(640, 512, HEADER_BYTES, SampleFormat::F32),
    CaptureGeometry::new(512, 384, HEADER_BYTES, SampleFormat::F32),
    CaptureGeometry::new(384, 288, HEADER_BYTES, SampleFormat::F32),
    CaptureGeometry::new(320, 240, HEADER_BYTES, SampleFormat::F32),
    CaptureGeometry::new(240, 180, HEADER_BYTES, SampleFormat::F32),
    CaptureGeometry::new(160, 120, HEADER_BYTES, SampleFormat::F32),
    CaptureGeometry::new(128, 96, HEADER_BYTES, SampleFormat::F32),
    CaptureGeometry::new(80, 60, HEADER_BYTES, SampleFormat::F32),
];

/// Pick a geometry for a capture of `len` bytes from an
/// arbitrary catalog. Returns `None` only if the catalog is
/// empty.
pub fn infer_geometry_in(catalog: &[CaptureGeometry], len: usize) -> Option<CaptureGeometry> {
    if let Some(exact) = catalog.iter().find(|g| g.expected_len() == len) {
        return Some(*exact);
    }

    // first of equally close entries
    catalog.iter().min_by_key(|g| g.distance_to(len)).copied()
}

/// Pick a geometry from [`CATALOG`] for a capture of `len`
/// bytes. Never fails: unknown sizes map to the closest
/// known geometry.
pub fn infer_geometry(len: usize) -> CaptureGeometry {
    let geometry = match infer_geometry_in(&CATALOG, len) {
        Some(g) => g,
        None => unreachable!("catalog is non-empty"),
    };

    if geometry.expected_len() == len {
        debug!(len, %geometry, "capture size matches catalog");
    } else {
        warn!(
            len,
            %geometry,
            expected = geometry.expected_len(),
            "capture size not in catalog; using closest geometry"
        );
    }
    geometry
}

/// Whether `len` is exactly the size of a catalog entry.
pub fn is_exact_match(len: usize) -> bool {
    CATALOG.iter().any(|g| g.expected_len() == len)
}
