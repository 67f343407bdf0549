//! Write a synthetic data root that every registered figure can be drawn from.
//!
//! ```text
//! generate_sample demo-data
//! MUTATION_AGE_FIGURES_CONFIG=demo.toml plot all
//! ```
//! where `demo.toml` sets `data_root = "demo-data"`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use mutation_age_figures::config::Config;
use mutation_age_figures::sample;

#[derive(Debug, Parser)]
#[command(version, about = "Write synthetic result files for every figure")]
struct Args {
    /// Directory to create `simulated-data/`, `all-data/` and `data/` in.
    #[arg(default_value = "sample-data")]
    output: PathBuf,
    /// Seed for the generated values.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    // The TMRCA matrix must match the panel layout the plots will use.
    let config = Config::discover()?;
    sample::write_sample_data(&args.output, &config.layout, args.seed)
}
