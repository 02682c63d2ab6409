mod args;

use anyhow::Result;
use args::Args;
use rayon::iter::ParallelIterator;
use serde_derive::*;
use tracing::warn;

use thermal_irb::{
    cli::{process_paths_par, CaptureInput},
    geometry::is_exact_match,
    stats::Stats,
    CaptureGeometry,
};

#[derive(Serialize, Debug)]
pub struct CaptureStats {
    path: String,
    geometry: CaptureGeometry,
    exact_size: bool,
    stats: Stats,
}

impl CaptureStats {
    fn from_input(input: CaptureInput) -> Result<Self> {
        let len = std::fs::metadata(&input.filename)?.len() as usize;
        Ok(CaptureStats {
            geometry: *input.image.geometry(),
            exact_size: is_exact_match(len),
            stats: input.image.stats(),
            path: input.filename,
        })
    }
}

#[derive(Serialize, Debug)]
struct OutputJson {
    capture_stats: Vec<CaptureStats>,
    failed: Vec<String>,
    cumulative: Stats,
}

fn main() -> Result<()> {
    thermal_irb::cli::init_tracing();
    let Args { paths, keep_going } = Args::from_cmd_line()?;

    let (mut capture_stats, mut failed, cumulative) = process_paths_par(paths)
        .map(|try_input| -> Result<_> {
            match try_input {
                Ok(input) => CaptureStats::from_input(input).map(Ok),
                Err(e) if keep_going => {
                    warn!("{:#}", e);
                    Ok(Err(format!("{:#}", e)))
                }
                Err(e) => Err(e),
            }
        })
        .try_fold(
            || (vec![], vec![], Stats::default()),
            |mut acc, item| -> Result<_> {
                match item? {
                    Ok(stats) => {
                        acc.2 += &stats.stats;
                        acc.0.push(stats);
                    }
                    Err(msg) => acc.1.push(msg),
                }
                Ok(acc)
            },
        )
        .try_reduce(
            || (vec![], vec![], Stats::default()),
            |mut acc1, acc2| -> Result<_> {
                acc1.0.extend(acc2.0);
                acc1.1.extend(acc2.1);
                acc1.2 += &acc2.2;
                Ok(acc1)
            },
        )?;

    capture_stats.sort_by(|a, b| a.path.cmp(&b.path));
    failed.sort();
    eprintln!(
        "Processed {} captures ({} failed)",
        capture_stats.len(),
        failed.len()
    );

    serde_json::to_writer(
        std::io::stdout().lock(),
        &OutputJson {
            capture_stats,
            failed,
            cumulative,
        },
    )?;
    Ok(())
}
