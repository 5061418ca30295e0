//! Headless mode for automated runs
//!
//! Runs full matches without any graphical output, suitable for automated
//! testing and balance experiments.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- --headless match_config.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "data_dir": "assets/config",
//!   "random_seed": 42,
//!   "max_duration_secs": 600,
//!   "tick_rate": 30,
//!   "settings": { "rounds_to_win": 3, "bots_per_team": 3 }
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::{HeadlessMatchConfig, SettingsOverrides};
pub use runner::{run_headless_match, run_headless_match_with_logging, MatchReport};
