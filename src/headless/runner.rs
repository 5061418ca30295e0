//! Headless match execution
//!
//! Loads the authored data, wires a `Simulation`, steps it at a fixed rate
//! until a team wins the match or the time budget runs out, and summarizes
//! the run as a `MatchReport`.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use serde::Serialize;
use std::path::Path;

use crate::combat::log::{BotStats, RoundResult};
use crate::data::{GameData, Team};
use crate::sim::{MatchPhase, Simulation};

use super::config::HeadlessMatchConfig;

/// Result of a headless match
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    /// Team that reached the rounds-to-win target, None on timeout
    pub winner: Option<Team>,
    /// Whether the match finished before the time budget ran out
    pub completed: bool,
    pub team_a_wins: u32,
    pub team_b_wins: u32,
    pub rounds_played: u32,
    /// Simulated seconds
    pub match_time: f32,
    pub final_phase: MatchPhase,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
    pub rounds: Vec<RoundResult>,
    pub phase_history: Vec<(f32, MatchPhase)>,
    /// Bots spawned during the match, in spawn order. On very long runs the
    /// earliest are dropped and counted in `dropped_bots`.
    pub bots: Vec<BotStats>,
    pub dropped_bots: usize,
}

impl MatchReport {
    fn from_simulation(sim: &Simulation, random_seed: Option<u64>) -> Self {
        let state = sim.match_state();
        let log = sim.match_log();
        Self {
            winner: state.is_complete().then(|| state.winner()),
            completed: state.is_complete(),
            team_a_wins: state.team_a_wins(),
            team_b_wins: state.team_b_wins(),
            rounds_played: state.rounds_played(),
            match_time: sim.elapsed(),
            final_phase: state.phase(),
            random_seed,
            rounds: log.rounds.clone(),
            phase_history: log.phase_history.clone(),
            bots: log.bots().to_vec(),
            dropped_bots: log.dropped_bots(),
        }
    }

    /// Write the report as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize match report: {}", e))?;
        std::fs::write(path, json)
            .map_err(|e| format!("Failed to write match report to {}: {}", path.display(), e))
    }
}

/// Run a headless match with the given configuration
pub fn run_headless_match(config: HeadlessMatchConfig) -> Result<MatchReport, String> {
    run(config, false)
}

/// Same as `run_headless_match`, with bevy's log output installed.
pub fn run_headless_match_with_logging(config: HeadlessMatchConfig) -> Result<MatchReport, String> {
    run(config, true)
}

fn run(config: HeadlessMatchConfig, with_logging: bool) -> Result<MatchReport, String> {
    config.validate()?;

    let mut data = GameData::load_from_dir(&config.data_dir).map_err(|e| e.to_string())?;
    let base = data.arena.settings.clone().unwrap_or_default();
    data.arena.settings = Some(config.settings.apply(&base));

    let mut builder =
        Simulation::builder_from_game_data(&data, config.random_seed).map_err(|e| e.to_string())?;
    if with_logging {
        builder.add_plugins(LogPlugin::default());
    }
    let mut sim = builder.build().map_err(|e| e.to_string())?;

    match config.random_seed {
        Some(seed) => info!("Using deterministic RNG with seed: {}", seed),
        None => info!("Using non-deterministic RNG (no seed provided)"),
    }

    if !sim.start_match() {
        return Err("Match could not start: no match settings".to_string());
    }

    let dt = config.step_seconds();
    let max_steps = (config.max_duration_secs * config.tick_rate as f32).ceil() as u64;
    for _ in 0..max_steps {
        sim.step(dt);
        if sim.match_state().is_complete() {
            break;
        }
    }

    let report = MatchReport::from_simulation(&sim, config.random_seed);
    if report.completed {
        info!(
            "Match finished after {:.1}s: {} - {}",
            report.match_time, report.team_a_wins, report.team_b_wins
        );
    } else {
        info!(
            "Match timed out after {:.1}s: {} - {}",
            report.match_time, report.team_a_wins, report.team_b_wins
        );
    }

    if let Some(path) = &config.output_path {
        report.save_to_file(Path::new(path))?;
    }
    Ok(report)
}
