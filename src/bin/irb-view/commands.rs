use std::{
    io::{BufRead, Write},
    path::PathBuf,
    str::FromStr,
};

use anyhow::{anyhow, bail, Error, Result};
use thermal_irb::{RangeEvent, Rendering, Session, SessionState};

const HELP: &str = "\
commands:
  capture <path>   load a capture (.irb)
  weather <path>   load a weather station export
  low <°C>         set the lower end of the display range
  high <°C>        set the upper end of the display range
  reset            restore the full display range
  save <path>      save the current image as PNG
  status           show the loaded files and range
  quit";

#[derive(Debug, PartialEq)]
pub enum Command {
    Capture(PathBuf),
    Weather(PathBuf),
    Range(RangeEvent),
    Save(PathBuf),
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.find(char::is_whitespace) {
            Some(idx) => (&line[..idx], line[idx..].trim()),
            None => (line, ""),
        };

        let path = || -> Result<PathBuf> {
            if rest.is_empty() {
                bail!("`{}` needs a path", word);
            }
            Ok(PathBuf::from(rest))
        };
        let value = || -> Result<f64> {
            rest.replace(',', ".")
                .parse()
                .map_err(|_| anyhow!("`{}` needs a temperature, got {:?}", word, rest))
        };

        Ok(match word {
            "capture" => Command::Capture(path()?),
            "weather" => Command::Weather(path()?),
            "low" => Command::Range(RangeEvent::AdjustLow(value()?)),
            "high" => Command::Range(RangeEvent::AdjustHigh(value()?)),
            "reset" => Command::Range(RangeEvent::Reset),
            "save" => Command::Save(path()?),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command `{}` (try `help`)", other),
        })
    }
}

pub fn describe(rendering: &Rendering) -> String {
    let thermal = rendering.thermal();
    let range = rendering.range();
    format!(
        "{}\n\ncapture: {}\nrange:   {:.1} … {:.1} °C",
        rendering.weather().annotation(),
        thermal.geometry(),
        range.low(),
        range.high()
    )
}

fn status(session: &Session) -> String {
    let show = |p: Option<&std::path::Path>| {
        p.map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".into())
    };
    let state = match session.state() {
        SessionState::AwaitingCapture => "waiting for a capture",
        SessionState::AwaitingWeather => "waiting for a weather file",
        SessionState::Ready => "ready",
    };
    let mut out = format!(
        "capture: {}\nweather: {}\nstate:   {}",
        show(session.capture_path()),
        show(session.weather_path()),
        state
    );
    if let Some(r) = session.current() {
        out += &format!("\nrange:   {:.1} … {:.1} °C", r.range().low(), r.range().high());
    }
    out
}

fn execute<W: Write>(session: &mut Session, command: Command, out: &mut W) -> Result<()> {
    match command {
        Command::Capture(path) => {
            if let Some(r) = session.load_capture(path)? {
                writeln!(out, "{}", describe(r))?;
            }
        }
        Command::Weather(path) => {
            if let Some(r) = session.load_weather(path)? {
                writeln!(out, "{}", describe(r))?;
            }
        }
        Command::Range(event) => {
            let range = session
                .apply_range_event(event)
                .ok_or_else(|| anyhow!("nothing rendered yet"))?;
            writeln!(out, "range: {:.1} … {:.1} °C", range.low(), range.high())?;
        }
        Command::Save(path) => {
            session.export_png(&path)?;
            writeln!(out, "saved {}", path.display())?;
        }
        Command::Status => writeln!(out, "{}", status(session))?,
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Quit => unreachable!("handled by the caller"),
    }
    Ok(())
}

/// Load the files given on the command line before reading
/// commands. Failures are reported the same way as failed
/// commands.
pub fn preload<W: Write>(
    session: &mut Session,
    capture: Option<PathBuf>,
    weather: Option<PathBuf>,
    out: &mut W,
) -> Result<()> {
    let commands = capture
        .map(Command::Capture)
        .into_iter()
        .chain(weather.map(Command::Weather));
    for command in commands {
        if let Err(e) = execute(session, command, out) {
            writeln!(out, "error: {:#}", e)?;
        }
    }
    Ok(())
}

/// Run commands from `input` until it ends or `quit`. Failed
/// commands are reported and leave the session unchanged.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: R, mut out: W) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let result = line
            .parse::<Command>()
            .and_then(|command| match command {
                Command::Quit => Ok(false),
                command => execute(session, command, &mut out).map(|_| true),
            });
        match result {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => writeln!(out, "error: {:#}", e)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermal_irb::CATALOG;

    #[test]
    fn parse_commands() -> Result<()> {
        assert_eq!(
            "capture  /tmp/a b.irb ".parse::<Command>()?,
            Command::Capture("/tmp/a b.irb".into())
        );
        assert_eq!(
            "low 12,5".parse::<Command>()?,
            Command::Range(RangeEvent::AdjustLow(12.5))
        );
        assert_eq!("reset".parse::<Command>()?, Command::Range(RangeEvent::Reset));
        assert!("low".parse::<Command>().is_err());
        assert!("save".parse::<Command>().is_err());
        assert!("frobnicate".parse::<Command>().is_err());
        Ok(())
    }

    #[test]
    fn scripted_session() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let capture = dir.path().join("a.irb");
        std::fs::write(&capture, vec![0u8; CATALOG[7].expected_len()])?;
        let weather = dir.path().join("w.csv");
        std::fs::write(
            &weather,
            "Tag;MIN_TA020;MAX_TA020;MIN_RH200;MAX_RH200;SUM_GS200;AVG_LWET200;AVG_WV200\n\
             06.06.2025;12,0;23,5;41,0;97,0;25,0;3,0;1,5\n",
        )?;
        let png = dir.path().join("out.png");

        let script = format!(
            "low 10\ncapture {}\nweather {}\nlow 70\nhigh 30\nsave {}\nbogus\nquit\nreset\n",
            capture.display(),
            weather.display(),
            png.display()
        );

        let mut session = Session::default();
        let mut out = vec![];
        run(&mut session, script.as_bytes(), &mut out)?;
        let out = String::from_utf8(out)?;

        assert!(out.starts_with("error: nothing rendered yet"));
        assert!(out.contains("12.0 … 23.5 °C"));
        assert!(out.contains("range: 30.0 … 70.0 °C"));
        assert!(out.contains("error: unknown command `bogus`"));
        assert!(png.exists());

        // `reset` after `quit` was never run
        let range = session.current().expect("rendered").range();
        assert_eq!((range.low(), range.high()), (30., 70.));
        Ok(())
    }

    #[test]
    fn failed_preload_keeps_prompt_alive() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let capture = dir.path().join("a.irb");
        std::fs::write(&capture, vec![0u8; CATALOG[7].expected_len()])?;
        let weather = dir.path().join("w.csv");
        std::fs::write(
            &weather,
            "Tag;MIN_TA020;MAX_TA020;MIN_RH200;MAX_RH200;SUM_GS200;AVG_LWET200;AVG_WV200\n\
             06.06.2025;12,0;23,5;41,0;97,0;25,0;3,0;1,5\n",
        )?;

        let mut session = Session::default();
        let mut out = vec![];
        preload(
            &mut session,
            Some(capture),
            Some(dir.path().join("missing.csv")),
            &mut out,
        )?;
        assert!(String::from_utf8(out.clone())?.starts_with("error: could not read"));
        assert!(session.current().is_none());

        let script = format!("weather {}\nstatus\n", weather.display());
        run(&mut session, script.as_bytes(), &mut out)?;
        let out = String::from_utf8(out)?;
        assert!(out.contains("12.0 … 23.5 °C"));
        assert!(out.contains("state:   ready"));
        Ok(())
    }
}
