mod args;
mod commands;

use std::io;

use anyhow::{anyhow, Context, Result};
use thermal_irb::{cli::init_tracing, RangeEvent, Session, ViewerConfig};

use args::Args;

const ABOUT: &str = "\
Thermal image viewer for VarioCAM .irb captures.

Created by Khandoker Ahammad, University of Hohenheim,
Institute of Agricultural Engineering, Agricultural
Engineering in the Tropics and Subtropics.";

fn main() -> Result<()> {
    init_tracing();
    let args = Args::from_cmd_line()?;

    if args.about {
        println!("{}\n\nVersion: {}", ABOUT, clap::crate_version!());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_path(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(date) = args.date {
        config.target_date = date;
    }
    if args.no_colorbar {
        config.colorbar = false;
    }

    let mut session = Session::new(config);

    if args.interactive {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut out = stdout.lock();
        commands::preload(&mut session, args.capture, args.weather, &mut out)?;
        return commands::run(&mut session, stdin.lock(), out);
    }

    let capture = args.capture.ok_or_else(|| anyhow!("--capture is required"))?;
    let weather = args.weather.ok_or_else(|| anyhow!("--weather is required"))?;

    session.load_capture(&capture)?;
    session
        .load_weather(&weather)
        .with_context(|| format!("rendering {}", capture.display()))?;

    if let Some(low) = args.low {
        session.apply_range_event(RangeEvent::AdjustLow(low));
    }
    if let Some(high) = args.high {
        session.apply_range_event(RangeEvent::AdjustHigh(high));
    }

    let rendering = session
        .current()
        .ok_or_else(|| anyhow!("nothing rendered"))?;
    println!("{}", commands::describe(rendering));

    if let Some(output) = &args.output {
        session.export_png(output)?;
        eprintln!("Saved {}", output.display());
    }
    Ok(())
}
