//! JSON configuration parsing for headless mode
//!
//! A headless config points at the authored data directory and can override
//! the match settings found there, so short test matches do not need their
//! own copy of the data.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::MatchSettings;

/// One headless run: which data to load, how long to play and where to report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessMatchConfig {
    /// Directory holding the RON data files (default: "assets/config")
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Seed for the match RNG. Seeded from entropy when absent
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Maximum simulated time in seconds (default: 300)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Simulation ticks per simulated second (default: 60)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Where to write the JSON match report (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Overrides applied on top of the arena's match settings
    #[serde(default)]
    pub settings: SettingsOverrides,
}

/// Optional replacements for individual match settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsOverrides {
    #[serde(default)]
    pub warmup_duration: Option<f32>,
    #[serde(default)]
    pub round_duration: Option<f32>,
    #[serde(default)]
    pub intermission_duration: Option<f32>,
    #[serde(default)]
    pub rounds_to_win: Option<u32>,
    #[serde(default)]
    pub bots_per_team: Option<u32>,
    #[serde(default)]
    pub fill_with_bots: Option<bool>,
    #[serde(default)]
    pub xp_per_kill: Option<f32>,
}

impl SettingsOverrides {
    /// `base` with every set override applied.
    pub fn apply(&self, base: &MatchSettings) -> MatchSettings {
        MatchSettings {
            warmup_duration: self.warmup_duration.unwrap_or(base.warmup_duration),
            round_duration: self.round_duration.unwrap_or(base.round_duration),
            intermission_duration: self
                .intermission_duration
                .unwrap_or(base.intermission_duration),
            rounds_to_win: self.rounds_to_win.unwrap_or(base.rounds_to_win),
            bots_per_team: self.bots_per_team.unwrap_or(base.bots_per_team),
            fill_with_bots: self.fill_with_bots.unwrap_or(base.fill_with_bots),
            xp_per_kill: self.xp_per_kill.unwrap_or(base.xp_per_kill),
        }
    }
}

fn default_data_dir() -> String {
    "assets/config".to_string()
}

fn default_max_duration() -> f32 {
    300.0
}

fn default_tick_rate() -> u32 {
    60
}

impl Default for HeadlessMatchConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            random_seed: None,
            max_duration_secs: default_max_duration(),
            tick_rate: default_tick_rate(),
            output_path: None,
            settings: SettingsOverrides::default(),
        }
    }
}

impl HeadlessMatchConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_json(&contents)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: HeadlessMatchConfig =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }
        if self.tick_rate == 0 || self.tick_rate > 1000 {
            return Err("tick_rate must be between 1 and 1000".to_string());
        }
        if self.data_dir.trim().is_empty() {
            return Err("data_dir must not be empty".to_string());
        }

        let overrides = &self.settings;
        let durations = [
            ("warmup_duration", overrides.warmup_duration),
            ("round_duration", overrides.round_duration),
            ("intermission_duration", overrides.intermission_duration),
        ];
        for (name, value) in durations {
            if value.is_some_and(|v| v < 0.0) {
                return Err(format!("{} must not be negative", name));
            }
        }
        if overrides.rounds_to_win == Some(0) {
            return Err("rounds_to_win must be at least 1".to_string());
        }

        Ok(())
    }

    /// Seconds advanced per simulation step
    pub fn step_seconds(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}
