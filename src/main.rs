use anyhow::Result;
use clap::Parser;

use mutation_age_figures::cli::Args;
use mutation_age_figures::{figures, Config};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::discover()?;
    log::debug!("Data root {}", config.data_root.display());
    figures::run(&args.name, &config)
}
