mod anim;
mod app;
mod boot;
mod clock;
mod companion;
mod config;
mod hud;
mod input;
mod mascot;
mod render;
mod rng;
mod stage;
mod starfield;
mod timers;

use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::File, path::Path, sync::Mutex};
use tracing_subscriber::EnvFilter;

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = config::Cli::parse();
    // stdout belongs to the TUI, so logs only go to a file
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }
    let settings = config::resolve(&cli)?;
    tracing::info!(?settings, "starting");
    app::run(settings)
}
