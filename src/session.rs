//! Viewer session: the two input paths and the current
//! rendering.
//!
//! Loading either input re-runs the whole pipeline once both
//! are known. A failed run is reported to the caller and
//! leaves the previous rendering in place.

use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{info, warn};

use crate::{
    config::ViewerConfig,
    error::{Error, Result},
    image::ThermalImage,
    range::{apply_range_event, DisplayRange, RangeEvent},
    render::{render_rgb, render_with_colorbar, save_png},
    weather::{match_weather_record, WeatherRecord, WeatherTable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No capture loaded yet.
    AwaitingCapture,
    /// Capture loaded, weather file still missing.
    AwaitingWeather,
    Ready,
}

/// Result of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct Rendering {
    thermal: ThermalImage,
    weather: WeatherRecord,
    range: DisplayRange,
}

impl Rendering {
    pub fn thermal(&self) -> &ThermalImage {
        &self.thermal
    }

    pub fn weather(&self) -> &WeatherRecord {
        &self.weather
    }

    pub fn range(&self) -> DisplayRange {
        self.range
    }

    pub fn summary(&self) -> String {
        self.weather.summary()
    }

    pub fn to_rgb(&self, colorbar: bool) -> RgbImage {
        if colorbar {
            render_with_colorbar(&self.thermal, &self.range)
        } else {
            render_rgb(&self.thermal, &self.range)
        }
    }
}

/// Decode the capture, look up the weather record and build
/// a fresh rendering with the full display range.
pub fn render(capture: &Path, weather: &Path, config: &ViewerConfig) -> Result<Rendering> {
    let thermal = ThermalImage::from_capture_path(capture)?;
    let table = WeatherTable::from_path(weather)?;
    let weather = match_weather_record(&table, &config.columns, config.target_date)?;

    let (ht, wid) = thermal.dim();
    info!(
        capture = %capture.display(),
        weather = %weather.date,
        width = wid,
        height = ht,
        "rendered capture"
    );
    Ok(Rendering {
        thermal,
        weather,
        range: DisplayRange::default(),
    })
}

#[derive(Debug, Default)]
pub struct Session {
    config: ViewerConfig,
    capture_path: Option<PathBuf>,
    weather_path: Option<PathBuf>,
    current: Option<Rendering>,
}

impl Session {
    pub fn new(config: ViewerConfig) -> Self {
        Session {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        match (&self.capture_path, &self.weather_path) {
            (None, _) => SessionState::AwaitingCapture,
            (Some(_), None) => SessionState::AwaitingWeather,
            (Some(_), Some(_)) => SessionState::Ready,
        }
    }

    pub fn capture_path(&self) -> Option<&Path> {
        self.capture_path.as_deref()
    }

    pub fn weather_path(&self) -> Option<&Path> {
        self.weather_path.as_deref()
    }

    pub fn current(&self) -> Option<&Rendering> {
        self.current.as_ref()
    }

    /// Select a capture. Returns the new rendering, or `None`
    /// while the weather file is still missing.
    pub fn load_capture(&mut self, path: impl Into<PathBuf>) -> Result<Option<&Rendering>> {
        self.capture_path = Some(path.into());
        self.try_render()
    }

    /// Select a weather file. Returns the new rendering, or
    /// `None` while the capture is still missing.
    pub fn load_weather(&mut self, path: impl Into<PathBuf>) -> Result<Option<&Rendering>> {
        self.weather_path = Some(path.into());
        self.try_render()
    }

    fn try_render(&mut self) -> Result<Option<&Rendering>> {
        let (capture, weather) = match (&self.capture_path, &self.weather_path) {
            (Some(c), Some(w)) => (c, w),
            _ => return Ok(None),
        };

        match render(capture, weather, &self.config) {
            Ok(rendering) => Ok(Some(&*self.current.insert(rendering))),
            Err(e) => {
                warn!(error = %e, "render failed; keeping previous image");
                Err(e)
            }
        }
    }

    /// Feed a range event to the current rendering. Returns
    /// the new range, or `None` if nothing is rendered.
    pub fn apply_range_event(&mut self, event: RangeEvent) -> Option<DisplayRange> {
        let current = self.current.as_mut()?;
        current.range = apply_range_event(current.range, event);
        Some(current.range)
    }

    pub fn export_png(&self, path: &Path) -> Result<()> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| Error::io(format!("cannot save {}", path.display()), "no image rendered yet"))?;
        save_png(&current.to_rgb(self.config.colorbar), path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::geometry::CATALOG;

    const WEATHER: &str = "Tag;MIN_TA020;MAX_TA020;MIN_RH200;MAX_RH200;SUM_GS200;AVG_LWET200;AVG_WV200\n\
                           06.06.2025;12,0;23,5;41,0;97,0;25,0;3,0;1,5\n";

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> anyhow::Result<Self> {
            Ok(Fixture {
                dir: tempfile::tempdir()?,
            })
        }

        fn file(&self, name: &str, contents: &[u8]) -> anyhow::Result<PathBuf> {
            let path = self.dir.path().join(name);
            fs::write(&path, contents)?;
            Ok(path)
        }

        fn capture(&self, name: &str, index: usize) -> anyhow::Result<PathBuf> {
            self.file(name, &vec![0u8; CATALOG[index].expected_len()])
        }
    }

    #[test]
    fn renders_once_both_inputs_known() -> anyhow::Result<()> {
        let fx = Fixture::new()?;
        let mut session = Session::default();
        assert_eq!(session.state(), SessionState::AwaitingCapture);

        assert!(session.load_weather(fx.file("w.csv", WEATHER.as_bytes())?)?.is_none());
        assert_eq!(session.state(), SessionState::AwaitingCapture);

        let rendering = session
            .load_capture(fx.capture("a.irb", 7)?)?
            .expect("both inputs loaded");
        assert_eq!(rendering.thermal().dim(), (60, 80));
        assert_eq!(session.state(), SessionState::Ready);
        Ok(())
    }

    #[test]
    fn capture_first_then_weather() -> anyhow::Result<()> {
        let fx = Fixture::new()?;
        let mut session = Session::default();
        assert!(session.load_capture(fx.capture("a.irb", 7)?)?.is_none());
        assert_eq!(session.state(), SessionState::AwaitingWeather);
        assert!(session.load_weather(fx.file("w.csv", WEATHER.as_bytes())?)?.is_some());
        Ok(())
    }

    #[test]
    fn new_render_resets_range() -> anyhow::Result<()> {
        let fx = Fixture::new()?;
        let mut session = Session::default();
        session.load_weather(fx.file("w.csv", WEATHER.as_bytes())?)?;
        session.load_capture(fx.capture("a.irb", 7)?)?;

        let range = session.apply_range_event(RangeEvent::AdjustLow(70.));
        assert_eq!(range, Some(DisplayRange::new(70., 100.)));

        let rendering = session.load_capture(fx.capture("b.irb", 6)?)?.expect("rendered");
        assert_eq!(rendering.range(), DisplayRange::default());
        assert_eq!(rendering.thermal().dim(), (96, 128));
        Ok(())
    }

    #[test]
    fn failed_render_keeps_previous() -> anyhow::Result<()> {
        let fx = Fixture::new()?;
        let mut session = Session::default();
        session.load_weather(fx.file("w.csv", WEATHER.as_bytes())?)?;
        session.load_capture(fx.capture("a.irb", 7)?)?;
        session.apply_range_event(RangeEvent::AdjustHigh(40.));

        let other_day = WEATHER.replace("06.06.2025", "07.06.2025");
        let err = session
            .load_weather(fx.file("other.csv", other_day.as_bytes())?)
            .unwrap_err();
        assert!(matches!(err, Error::WeatherRecordNotFound(_)));

        let current = session.current().expect("previous rendering kept");
        assert_eq!(current.thermal().dim(), (60, 80));
        assert_eq!(current.range(), DisplayRange::new(0., 40.));

        let err = session
            .load_capture(fx.dir.path().join("missing.irb"))
            .unwrap_err();
        assert!(matches!(err, Error::IoFailure { .. }));
        assert!(session.current().is_some());
        Ok(())
    }

    #[test]
    fn range_events_need_a_rendering() {
        let mut session = Session::default();
        assert_eq!(session.apply_range_event(RangeEvent::Reset), None);
    }

    #[test]
    fn export_requires_rendering() -> anyhow::Result<()> {
        let fx = Fixture::new()?;
        let mut session = Session::default();
        let out = fx.dir.path().join("out.png");
        assert!(matches!(session.export_png(&out), Err(Error::IoFailure { .. })));

        session.load_weather(fx.file("w.csv", WEATHER.as_bytes())?)?;
        session.load_capture(fx.capture("a.irb", 7)?)?;
        session.export_png(&out)?;
        assert!(fs::metadata(&out)?.len() > 0);
        Ok(())
    }
}
