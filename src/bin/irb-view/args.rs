use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::value_t_or_exit;
use std::path::PathBuf;
use thermal_irb::{args_parser, opt};

pub struct Args {
    pub capture: Option<PathBuf>,
    pub weather: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub date: Option<NaiveDate>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub output: Option<PathBuf>,
    pub no_colorbar: bool,
    pub interactive: bool,
    pub about: bool,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("irb-view")
            .about("Render a thermal capture next to the matching weather record.")
            .arg(
                opt!("capture")
                    .short("c")
                    .required_unless_one(&["interactive", "about"])
                    .help("Capture (.irb) to decode"),
            )
            .arg(
                opt!("weather")
                    .short("w")
                    .required_unless_one(&["interactive", "about"])
                    .help("Weather station export (.csv, .xls, .xlsx)"),
            )
            .arg(opt!("config").help("JSON viewer configuration"))
            .arg(
                opt!("date")
                    .short("d")
                    .help("Date of the weather record (YYYY-MM-DD); overrides the config"),
            )
            .arg(opt!("low").help("Lower end of the display range (°C)"))
            .arg(opt!("high").help("Upper end of the display range (°C)"))
            .arg(
                opt!("output")
                    .short("o")
                    .help("Save the rendered image as PNG"),
            )
            .arg(
                opt!("no colorbar")
                    .takes_value(false)
                    .help("Do not draw a colour bar in the saved image"),
            )
            .arg(
                opt!("interactive")
                    .short("i")
                    .takes_value(false)
                    .help("Read commands from stdin (type `help` for a list)"),
            )
            .arg(
                opt!("about")
                    .takes_value(false)
                    .help("Show authorship information and exit"),
            )
            .get_matches();

        let path = |name: &str| matches.value_of(name).map(PathBuf::from);
        let date = matches
            .value_of("date")
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
            .transpose()
            .context("invalid --date, expected YYYY-MM-DD")?;
        let low = matches
            .is_present("low")
            .then(|| value_t_or_exit!(matches.value_of("low"), f64));
        let high = matches
            .is_present("high")
            .then(|| value_t_or_exit!(matches.value_of("high"), f64));

        Ok(Args {
            capture: path("capture"),
            weather: path("weather"),
            config: path("config"),
            date,
            low,
            high,
            output: path("output"),
            no_colorbar: matches.is_present("no colorbar"),
            interactive: matches.is_present("interactive"),
            about: matches.is_present("about"),
        })
    }
}
