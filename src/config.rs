use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::starfield::STAR_COUNT;

#[derive(Parser, Debug, Clone)]
#[command(name = "cybercat")]
#[command(about = "Boot screen, starfield and a moody companion cat for your terminal")]
pub(crate) struct Cli {
    /// Frame rate cap
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// Force monochrome (no colors)
    #[arg(long, default_value_t = false)]
    pub(crate) mono: bool,

    /// Seed for the starfield and the cat's random choices
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Go straight to the companion without the boot sequence
    #[arg(long, default_value_t = false)]
    pub(crate) skip_boot: bool,

    /// Number of background stars
    #[arg(long)]
    pub(crate) stars: Option<usize>,

    /// Settings file (JSON). Defaults to the platform config dir.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Write logs here; nothing is logged otherwise
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) seed: Option<u64>,
    pub(crate) skip_boot: bool,
    pub(crate) star_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            enable_color: true,
            seed: None,
            skip_boot: false,
            star_count: STAR_COUNT,
        }
    }
}

impl Settings {
    /// Command-line flags win over whatever the file said.
    pub(crate) fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(fps) = cli.fps {
            self.fps_cap = fps;
        }
        if cli.mono {
            self.enable_color = false;
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        if cli.skip_boot {
            self.skip_boot = true;
        }
        if let Some(n) = cli.stars {
            self.star_count = n;
        }
        self.fps_cap = self.fps_cap.clamp(10, 240);
        self
    }
}

pub(crate) fn default_settings_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "cybercat", "Cybercat")
        .context("could not resolve project directories")?;
    Ok(proj.config_dir().join("settings.json"))
}

/// Missing file means defaults. A file that exists but does not parse is
/// reported and then ignored.
pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    let raw = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("reading settings from {}", path.display()))
        }
    };
    match serde_json::from_str::<Settings>(&raw) {
        Ok(s) => Ok(s),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "bad settings file, using defaults");
            Ok(Settings::default())
        }
    }
}

pub(crate) fn resolve(cli: &Cli) -> Result<Settings> {
    let path = match &cli.config {
        Some(p) => p.clone(),
        None => default_settings_path()?,
    };
    Ok(load_settings(&path)?.with_cli(cli))
}
