//! Arena Shooter - gameplay simulation core
//!
//! Round-based bot matches in a small arena: hit-scan and projectile
//! weapons, a health/shield model, race abilities unlocked by XP, bot AI
//! with line-of-sight targeting, and the match phase machine.
//!
//! This library exposes the core modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod data;
pub mod headless;
pub mod sim;

// Re-export commonly used types
pub use combat::log::{MatchLog, MatchLogEventType};
pub use data::{GameData, Team};
pub use headless::HeadlessMatchConfig;
pub use sim::{Simulation, SimulationBuilder};
