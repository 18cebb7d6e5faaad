//! tsch-sweep — run a TSCH/RPL parameter sweep from a JSON config file.
//!
//! ```text
//! tsch-sweep configs/channels.json --out results/
//! RUST_LOG=debug tsch-sweep configs/channels.json --workers 1
//! ```
//!
//! Writes `<out>/<combination>.jsonl` and `<out>/<combination>_summaries.csv`
//! for every combination, then prints the delivery ratio per combination.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ts_batch::{BatchPlan, run_batch};
use ts_core::ConfigFile;

const DEFAULT_FILTER: &str = "warn,ts_batch=info,tsch_sweep=info";

#[derive(Parser, Debug)]
#[command(name = "tsch-sweep", version, about)]
struct Args {
    /// JSON config file with `regular` settings and `combination` axes.
    config: PathBuf,

    /// Output directory (created if missing).
    #[arg(short, long, default_value = "output")]
    out: PathBuf,

    /// Override `num_workers` for every combination.
    #[arg(short, long)]
    workers: Option<usize>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    let file = ConfigFile::from_path(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    let mut plan = BatchPlan::from_config(&file)?;
    if let Some(workers) = args.workers {
        anyhow::ensure!(workers > 0, "--workers must be at least 1");
        plan.num_workers = workers;
        for run in &mut plan.runs {
            run.settings.num_workers = workers;
        }
    }
    info!(
        config = %args.config.display(),
        combinations = plan.combinations.len(),
        runs = plan.len(),
        "plan ready"
    );

    let started = Instant::now();
    let report = run_batch(&plan, &args.out)?;

    println!("{:<40} {:>5} {:>10} {:>10} {:>8}", "combination", "runs", "generated", "delivered", "ratio");
    for id in &plan.combinations {
        let (mut runs, mut generated, mut delivered) = (0, 0u64, 0u64);
        for outcome in report.outcomes.iter().filter(|o| &o.combination == id) {
            runs += 1;
            generated += u64::from(outcome.summary.generated);
            delivered += u64::from(outcome.summary.delivered);
        }
        let ratio = if generated == 0 { 0.0 } else { delivered as f64 / generated as f64 };
        println!("{id:<40} {runs:>5} {generated:>10} {delivered:>10} {ratio:>8.3}");
    }
    println!();
    println!(
        "{} runs in {:.2}s, output in {}",
        report.outcomes.len(),
        started.elapsed().as_secs_f64(),
        args.out.display()
    );
    Ok(())
}
