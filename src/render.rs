//! Colour rendering of a [`ThermalImage`] and PNG export.

use std::{fs, io::Write, path::Path};

use image::{Rgb, RgbImage};
use itertools::iproduct;
use tracing::info;

use crate::{
    error::{Error, Result},
    image::ThermalImage,
    range::DisplayRange,
};

const COLORBAR_GAP: u32 = 8;
const COLORBAR_WIDTH: u32 = 16;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

// Break points of matplotlib's `hot` map.
const HOT_RED_FULL: f64 = 0.365079;
const HOT_GREEN_FULL: f64 = 0.746032;
const HOT_RED_START: f64 = 0.0416;

/// `hot` colormap: black, red, yellow, white. `t` is
/// clamped to `[0, 1]`.
pub fn hot(t: f64) -> Rgb<u8> {
    let t = if t.is_nan() { 0. } else { t.max(0.).min(1.) };
    let ramp = |from: f64, to: f64, start: f64| {
        if t <= from {
            start
        } else if t >= to {
            1.
        } else {
            start + (1. - start) * (t - from) / (to - from)
        }
    };

    let r = ramp(0., HOT_RED_FULL, HOT_RED_START);
    let g = ramp(HOT_RED_FULL, HOT_GREEN_FULL, 0.);
    let b = ramp(HOT_GREEN_FULL, 1., 0.);
    Rgb([to_u8(r), to_u8(g), to_u8(b)])
}

fn to_u8(v: f64) -> u8 {
    (v * 255.).round() as u8
}

/// Map every temperature through `range` and the `hot`
/// colormap.
pub fn render_rgb(image: &ThermalImage, range: &DisplayRange) -> RgbImage {
    let (ht, wid) = image.dim();
    let temps = image.temperatures();

    let mut out = RgbImage::new(wid as u32, ht as u32);
    for (row, col) in iproduct!(0..ht, 0..wid) {
        let color = hot(range.normalize(temps[(row, col)]));
        out.put_pixel(col as u32, row as u32, color);
    }
    out
}

/// [`render_rgb`] with a vertical colour bar on the right:
/// `range.high()` at the top, `range.low()` at the bottom.
pub fn render_with_colorbar(image: &ThermalImage, range: &DisplayRange) -> RgbImage {
    let plot = render_rgb(image, range);
    let (wid, ht) = plot.dimensions();
    let bar_x = wid + COLORBAR_GAP;

    let mut out = RgbImage::from_pixel(bar_x + COLORBAR_WIDTH, ht, BACKGROUND);
    for (x, y, px) in plot.enumerate_pixels() {
        out.put_pixel(x, y, *px);
    }

    let span = range.high() - range.low();
    for y in 0..ht {
        let frac = if ht > 1 { 1. - y as f64 / (ht - 1) as f64 } else { 1. };
        let color = hot(range.normalize(range.low() + span * frac));
        for x in bar_x..bar_x + COLORBAR_WIDTH {
            out.put_pixel(x, y, color);
        }
    }
    out
}

/// Encode an 8-bit RGB PNG. The closing chunk is written
/// when the encoder is dropped, before this returns.
pub fn write_png<W: Write>(image: &RgbImage, writer: W) -> Result<()> {
    let (wid, ht) = image.dimensions();
    let mut encoder = png::Encoder::new(writer, wid, ht);
    encoder.set_color(png::ColorType::RGB);
    encoder.set_depth(png::BitDepth::Eight);

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| Error::io("writing png header", e))?;
    png_writer
        .write_image_data(image.as_raw())
        .map_err(|e| Error::io("writing png data", e))?;
    Ok(())
}

pub fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    let mut buf = vec![];
    write_png(image, &mut buf)?;
    fs::write(path, &buf)
        .map_err(|e| Error::io(format!("could not write {}", path.display()), e))?;
    info!(path = %path.display(), "saved image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{CaptureGeometry, SampleFormat},
        image::decode_frame,
        range::{apply_range_event, RangeEvent},
    };

    fn ramp_image() -> ThermalImage {
        // raw values 0, 1/3, 2/3 and full scale
        let geometry = CaptureGeometry::new(4, 1, 0, SampleFormat::U16);
        let raw: Vec<u8> = [0u16, 21845, 43690, 65535]
            .iter()
            .flat_map(|v| v.to_le_bytes().to_vec())
            .collect();
        decode_frame(&raw, &geometry).unwrap()
    }

    #[test]
    fn hot_endpoints() {
        assert_eq!(hot(0.), Rgb([11, 0, 0]));
        assert_eq!(hot(1.), Rgb([255, 255, 255]));
        assert_eq!(hot(HOT_RED_FULL), Rgb([255, 0, 0]));
        assert_eq!(hot(HOT_GREEN_FULL), Rgb([255, 255, 0]));
        assert_eq!(hot(-3.), hot(0.));
        assert_eq!(hot(f64::NAN), hot(0.));
    }

    #[test]
    fn render_follows_range() {
        let image = ramp_image();
        let full = render_rgb(&image, &DisplayRange::default());
        assert_eq!(full.dimensions(), (4, 1));
        // mirrored: hottest pixel is in column 0
        assert_eq!(*full.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*full.get_pixel(3, 0), hot(0.));

        let narrow = DisplayRange::new(40., 60.);
        let clipped = render_rgb(&image, &narrow);
        assert_eq!(*clipped.get_pixel(0, 0), hot(1.));
        assert_eq!(*clipped.get_pixel(1, 0), hot(1.));
        assert_eq!(*clipped.get_pixel(2, 0), hot(0.));
    }

    #[test]
    fn flat_range_renders_one_colour() {
        let image = ramp_image();
        let range = apply_range_event(
            apply_range_event(DisplayRange::default(), RangeEvent::AdjustLow(50.)),
            RangeEvent::AdjustHigh(50.),
        );
        let out = render_rgb(&image, &range);
        assert!(out.pixels().all(|p| *p == hot(0.)));
    }

    #[test]
    fn colorbar_runs_high_to_low() {
        let geometry = CaptureGeometry::new(2, 10, 0, SampleFormat::U16);
        let image = decode_frame(&vec![0u8; geometry.expected_len()], &geometry).unwrap();
        let out = render_with_colorbar(&image, &DisplayRange::default());
        assert_eq!(out.dimensions(), (2 + COLORBAR_GAP + COLORBAR_WIDTH, 10));

        let bar_x = 2 + COLORBAR_GAP;
        assert_eq!(*out.get_pixel(bar_x, 0), hot(1.));
        assert_eq!(*out.get_pixel(bar_x + COLORBAR_WIDTH - 1, 9), hot(0.));
        assert_eq!(*out.get_pixel(2, 5), BACKGROUND);
    }

    #[test]
    fn png_signature() -> Result<()> {
        let out = render_rgb(&ramp_image(), &DisplayRange::default());
        let mut buf: Vec<u8> = vec![];
        write_png(&out, &mut buf)?;
        assert_eq!(&buf[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(&buf[buf.len() - 8..buf.len() - 4], b"IEND");
        Ok(())
    }

    #[test]
    fn saved_png_reads_back() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.png");
        let out = render_rgb(&ramp_image(), &DisplayRange::default());
        save_png(&out, &path)?;
        assert_eq!(::image::open(&path)?.to_rgb8(), out);
        Ok(())
    }

    #[test]
    fn failed_write_is_reported() {
        let out = render_rgb(&ramp_image(), &DisplayRange::default());
        let missing = Path::new("/nonexistent-dir/out.png");
        assert!(matches!(save_png(&out, missing), Err(Error::IoFailure { .. })));

        // every write to /dev/full fails with ENOSPC
        let full = Path::new("/dev/full");
        if full.exists() {
            assert!(matches!(save_png(&out, full), Err(Error::IoFailure { .. })));
        }
    }
}
