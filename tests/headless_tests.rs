//! Integration tests for headless match execution
//!
//! These tests verify that:
//! - Headless matches run against the shipped data
//! - Seeded runs are reproducible
//! - Reports are written as JSON
//! - Bad configs fail before anything runs

use arenashooter::headless::{run_headless_match, HeadlessMatchConfig, MatchReport, SettingsOverrides};
use arenashooter::sim::MatchPhase;
use arenashooter::Team;

/// Short match against the shipped data
fn quick_config(seed: Option<u64>) -> HeadlessMatchConfig {
    HeadlessMatchConfig {
        data_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/assets/config").to_string(),
        random_seed: seed,
        max_duration_secs: 60.0,
        tick_rate: 20,
        output_path: None,
        settings: SettingsOverrides {
            warmup_duration: Some(1.0),
            round_duration: Some(20.0),
            intermission_duration: Some(1.0),
            rounds_to_win: Some(2),
            bots_per_team: Some(2),
            ..Default::default()
        },
    }
}

fn report_json(report: &MatchReport) -> String {
    serde_json::to_string(report).unwrap()
}

#[test]
fn test_quick_match_plays_rounds() {
    let report = run_headless_match(quick_config(Some(7))).unwrap();

    assert!(report.rounds_played >= 2, "only {} rounds", report.rounds_played);
    assert_eq!(report.rounds.len() as u32, report.rounds_played);
    assert_eq!(report.phase_history[0].1, MatchPhase::Warmup);
    assert_eq!(report.random_seed, Some(7));
    // Two bots per side every time a round starts
    let rounds_started = report
        .phase_history
        .iter()
        .filter(|(_, phase)| *phase == MatchPhase::Active)
        .count();
    assert_eq!(report.bots.len(), rounds_started * 4);

    if report.completed {
        let winner = report.winner.unwrap();
        assert_ne!(winner, Team::None);
        let wins = match winner {
            Team::A => report.team_a_wins,
            _ => report.team_b_wins,
        };
        assert_eq!(wins, 2);
    } else {
        assert!(report.winner.is_none());
        assert!(report.match_time >= 59.9);
    }
}

#[test]
fn test_same_seed_same_report() {
    let first = run_headless_match(quick_config(Some(1234))).unwrap();
    let second = run_headless_match(quick_config(Some(1234))).unwrap();
    assert_eq!(report_json(&first), report_json(&second));
}

#[test]
fn test_report_written_to_output_path() {
    let path = std::env::temp_dir().join("arenashooter_headless_report.json");
    let _ = std::fs::remove_file(&path);

    let mut config = quick_config(Some(99));
    config.output_path = Some(path.to_string_lossy().into_owned());
    let report = run_headless_match(config).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["random_seed"], 99);
    assert_eq!(json["rounds_played"], report.rounds_played);
    assert_eq!(json["bots"].as_array().unwrap().len(), report.bots.len());
    assert!(json["phase_history"].is_array());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = quick_config(None);
    config.max_duration_secs = 0.0;
    assert!(run_headless_match(config).is_err());

    let mut config = quick_config(None);
    config.settings.rounds_to_win = Some(0);
    assert!(run_headless_match(config).is_err());
}

#[test]
fn test_missing_data_dir_is_an_error() {
    let mut config = quick_config(Some(1));
    config.data_dir = "no/such/dir".to_string();
    let err = run_headless_match(config).err().unwrap();
    assert!(err.contains("abilities.ron"), "unexpected error: {}", err);
}

#[test]
fn test_config_file_round_trip_through_loader() {
    let path = std::env::temp_dir().join("arenashooter_headless_config.json");
    std::fs::write(
        &path,
        r#"{ "random_seed": 5, "tick_rate": 30, "settings": { "bots_per_team": 3 } }"#,
    )
    .unwrap();

    let config = HeadlessMatchConfig::load_from_file(&path).unwrap();
    assert_eq!(config.random_seed, Some(5));
    assert_eq!(config.settings.bots_per_team, Some(3));
    assert!(config.settings.rounds_to_win.is_none());
    assert!((config.step_seconds() - 1.0 / 30.0).abs() < 1e-6);

    let _ = std::fs::remove_file(&path);
}
