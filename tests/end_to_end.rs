use std::fs;

use anyhow::Result;
use thermal_irb::{DisplayRange, RangeEvent, Session, SessionState, ViewerConfig};

const WEATHER: &str = "\
Tag;MIN_TA020;MAX_TA020;MIN_RH200;MAX_RH200;SUM_GS200;AVG_LWET200;AVG_WV200
05.06.2025;10,1;19,9;50,0;90,0;20,0;2,0;2,5
06.06.2025;12,0;23,5;41,3;97,8;25,4;3,1;1,9
";

#[test]
fn capture_and_weather_render() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let capture = dir.path().join("field.irb");
    let weather = dir.path().join("station.csv");

    // 640x512 u16 samples after a 1024 byte header; every
    // sample is 0x8000
    let mut raw = vec![0u8; 1024];
    for _ in 0..640 * 512 {
        raw.extend_from_slice(&0x8000u16.to_le_bytes());
    }
    assert_eq!(raw.len(), 640 * 512 * 2 + 1024);
    fs::write(&capture, &raw)?;
    fs::write(&weather, WEATHER)?;

    let mut session = Session::new(ViewerConfig::default());
    assert!(session.load_capture(&capture)?.is_none());
    assert_eq!(session.state(), SessionState::AwaitingWeather);

    let rendering = session.load_weather(&weather)?.expect("rendered");
    assert_eq!(rendering.thermal().dim(), (512, 640));
    assert_eq!(rendering.range(), DisplayRange::default());
    assert!(rendering.summary().contains("12.0 … 23.5 °C"));
    assert!(rendering.summary().contains("41.3 … 97.8 %"));

    let expected = 32768. * 100. / 65535.;
    let stats = rendering.thermal().stats();
    assert_eq!(stats.count(), 640 * 512);
    assert!((stats.mean() - expected).abs() < 1e-9);

    assert_eq!(
        session.apply_range_event(RangeEvent::AdjustLow(70.)),
        Some(DisplayRange::new(70., 100.))
    );
    assert_eq!(
        session.apply_range_event(RangeEvent::AdjustHigh(30.)),
        Some(DisplayRange::new(30., 70.))
    );

    let png = dir.path().join("field.png");
    session.export_png(&png)?;
    let decoded = image::open(&png)?.to_rgb8();
    assert_eq!(decoded.dimensions().1, 512);
    assert!(decoded.dimensions().0 > 640);
    Ok(())
}

#[test]
fn configured_date_selects_row() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let capture = dir.path().join("small.irb");
    let weather = dir.path().join("station.csv");
    fs::write(&capture, vec![0u8; 80 * 60 * 2 + 1024])?;
    fs::write(&weather, WEATHER)?;

    let config: ViewerConfig = serde_json::from_str(r#"{ "target_date": "2025-06-05" }"#)?;
    let mut session = Session::new(config);
    session.load_weather(&weather)?;
    let rendering = session.load_capture(&capture)?.expect("rendered");
    assert_eq!(rendering.weather().min_temp, 10.1);
    assert!(rendering.summary().starts_with("Weather Station (05 Jun 2025)"));
    Ok(())
}

#[test]
fn underfilled_capture_is_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let capture = dir.path().join("short.irb");
    let weather = dir.path().join("station.csv");
    // closest to 640x512 u16, but one byte short of it
    fs::write(&capture, vec![0u8; 640 * 512 * 2 + 1023])?;
    fs::write(&weather, WEATHER)?;

    let mut session = Session::default();
    session.load_weather(&weather)?;
    match session.load_capture(&capture) {
        Err(thermal_irb::Error::UnderfilledCapture {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 640 * 512 * 2 + 1024);
            assert_eq!(actual, expected - 1);
        }
        other => panic!("unexpected {:?}", other.map(|r| r.is_some())),
    }
    assert!(session.current().is_none());
    Ok(())
}
