mod branch;
mod camera;
mod canvas;
mod config;
mod cycle;
mod phase;
mod render;
mod seed;
mod settings;
mod state;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use config::CycleConfig;
use settings::Settings;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;
use tracing::Level;

#[derive(Parser)]
#[command(name = "treecycle")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "Animated tree life cycle: a seed sprouts, grows, flowers and scatters its own seed", long_about = None)]
struct Cli {
    /// Random seed for leaf placement
    #[arg(short, long)]
    seed: Option<u64>,

    /// Frames per second (1-120)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=120))]
    fps: Option<u32>,

    /// Hide the phase caption and key hints
    #[arg(long)]
    no_hud: bool,

    /// Write a log to this file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Log at debug level (with --log)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.log {
        init_logging(path, cli.verbose)?;
    }

    let settings = Settings::load();
    let config = CycleConfig::resolve(cli.seed, cli.fps, cli.no_hud, &settings);
    cycle::run(config)
}

/// Log to a file; the terminal itself is busy with the animation
fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}
