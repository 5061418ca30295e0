//! Command-line interface for the arena simulation

use clap::Parser;
use std::path::PathBuf;

/// Arena shooter match simulator
#[derive(Parser, Debug)]
#[command(name = "arenashooter")]
#[command(about = "Arena shooter match simulator")]
#[command(version)]
pub struct Args {
    /// Run with the specified JSON config file (defaults are used without one)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Output path for the JSON match report
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum simulated match duration in seconds
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed for a reproducible match
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
