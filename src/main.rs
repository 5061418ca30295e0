//! Arena Shooter - headless match simulator
//!
//! Runs a full bot-vs-bot match from the authored data and prints the final
//! score, optionally writing a JSON report.

use std::process::ExitCode;

use arenashooter::cli;
use arenashooter::headless::{run_headless_match_with_logging, HeadlessMatchConfig};

fn main() -> ExitCode {
    let args = cli::parse_args();

    let mut config = match &args.headless {
        Some(path) => match HeadlessMatchConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => HeadlessMatchConfig::default(),
    };

    // Command-line flags win over the config file
    if let Some(output) = &args.output {
        config.output_path = Some(output.display().to_string());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if args.seed.is_some() {
        config.random_seed = args.seed;
    }

    println!("Starting headless match simulation...");
    println!("  Data: {}", config.data_dir);
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    match run_headless_match_with_logging(config.clone()) {
        Ok(report) => {
            match report.winner {
                Some(winner) => println!(
                    "{} wins {} - {} after {} rounds",
                    winner, report.team_a_wins, report.team_b_wins, report.rounds_played
                ),
                None => println!(
                    "Match timed out at {} - {} after {} rounds",
                    report.team_a_wins, report.team_b_wins, report.rounds_played
                ),
            }
            if let Some(path) = &config.output_path {
                println!("Match report saved to: {}", path);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
