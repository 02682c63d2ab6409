use anyhow::Result;
use thermal_irb::{arg, args_parser, opt};

pub struct Args {
    pub paths: Vec<String>,
    pub keep_going: bool,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("irb-stats")
            .about("Compute temperature stats from captures.")
            .arg(
                opt!("keep going")
                    .short("k")
                    .takes_value(false)
                    .help("Report captures that fail to decode instead of aborting"),
            )
            .arg(
                arg!("paths")
                    .required(true)
                    .multiple(true)
                    .help("Capture (.irb) paths"),
            )
            .get_matches();

        let paths = matches
            .values_of("paths")
            .map(|v| v.map(String::from).collect())
            .unwrap_or_default();
        let keep_going = matches.is_present("keep going");

        Ok(Args { paths, keep_going })
    }
}
