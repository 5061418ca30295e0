//! Gameplay simulation
//!
//! Health, weapons, abilities, XP, bot AI, the bot roster and the match
//! phase machine, run as bevy systems inside a headless `App` that
//! `Simulation` steps explicitly.

pub mod abilities;
pub mod bot_ai;
pub mod components;
pub mod constants;
pub mod health;
pub mod match_flow;
pub mod navigation;
pub mod projectiles;
pub mod roster;
pub mod simulation;
pub mod systems;
pub mod timers;
pub mod weapons;
pub mod world_query;
pub mod xp;

pub use abilities::{AbilityLoadout, AbilitySlot};
pub use bot_ai::BotBrain;
pub use components::{Bot, Deactivated, GameRng, Hitbox, Motor};
pub use health::{Health, HealthChange};
pub use match_flow::{MatchPhase, MatchState};
pub use navigation::{Navigation, Navigator, OpenFloor};
pub use projectiles::Projectile;
pub use roster::{BotRoster, BotSpawner};
pub use simulation::{Simulation, SimulationBuilder, WiringError};
pub use systems::{SimPhase, SimulationPlugin};
pub use timers::{DeferredActions, TimedAction};
pub use weapons::{Combat, FireOutcome, Weapon};
pub use world_query::{ArenaGeometry, LayerMask, ObstacleField, RayHit, WorldGeometry};
pub use xp::{LevelProgress, XpService, XpUpdate};
