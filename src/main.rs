use std::path::PathBuf;

use clap::Parser;

use simview::{run_viewer, ViewerConfig};

/// Viewer for PSS/E `.out` and PSCAD `.csv` simulation results.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Configuration file (defaults to ./simview.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Template to open at start-up.
    template: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = ViewerConfig::load(cli.config.as_deref())?;
    run_viewer(cfg, cli.template)?;
    Ok(())
}
