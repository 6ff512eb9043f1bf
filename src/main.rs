mod app;
mod config;
mod renderer;

use anyhow::Result;
use app::App;
use clap::Parser;
use config::AppConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Measures reaction time to a randomly delayed visual stimulus
#[derive(Parser, Debug)]
#[command(name = "reflex", version)]
struct Cli {
    /// JSON config file
    config: Option<PathBuf>,

    /// Write the session report to this JSON file on exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if cli.export.is_some() {
        config.export_path = cli.export;
    }

    App::new(config)?.run()
}
