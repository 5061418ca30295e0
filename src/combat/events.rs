//! Gameplay events
//!
//! Everything observers (the match log, the headless report, tests) can see
//! happening in the simulation. Systems apply state changes first and send
//! these afterwards, so a reader always sees post-change values.

use bevy::prelude::*;

use crate::data::Team;
use crate::sim::match_flow::MatchPhase;
use crate::sim::xp::LevelProgress;

/// Event fired when damage lands on a living target
#[derive(Event, Debug, Clone)]
pub struct DamageEvent {
    /// Entity that fired the shot (None for unattributed damage)
    pub source: Option<Entity>,
    /// Entity receiving the damage
    pub target: Entity,
    /// Damage requested before shield absorption
    pub amount: f32,
    /// Whether this hit was the killing blow
    pub killed: bool,
}

/// Event fired whenever health or shield changes
#[derive(Event, Debug, Clone)]
pub struct HealthChangedEvent {
    pub entity: Entity,
    pub health: f32,
    pub shield: f32,
}

/// Event fired once when health first reaches zero
#[derive(Event, Debug, Clone)]
pub struct DeathEvent {
    pub entity: Entity,
    /// Entity credited with the kill
    pub killer: Option<Entity>,
}

/// Event fired for every shot that leaves a weapon
#[derive(Event, Debug, Clone)]
pub struct WeaponFiredEvent {
    pub shooter: Entity,
    pub weapon_id: String,
    /// Recoil feedback for whoever drives the shooter's view
    pub recoil: f32,
    /// Hit-scan target, if the ray struck a body
    pub hit: Option<Entity>,
}

/// A projectile struck a body. Sent whether or not the target could still
/// take damage.
#[derive(Event, Debug, Clone)]
pub struct ProjectileImpactEvent {
    pub source: Option<Entity>,
    pub target: Entity,
}

#[derive(Event, Debug, Clone)]
pub struct ReloadStartedEvent {
    pub entity: Entity,
    pub duration: f32,
}

#[derive(Event, Debug, Clone)]
pub struct ReloadFinishedEvent {
    pub entity: Entity,
}

/// Event fired when an ability slot becomes usable (unlock or cooldown end)
#[derive(Event, Debug, Clone)]
pub struct AbilityReadyEvent {
    pub entity: Entity,
    pub ability_id: String,
}

/// Event fired when an activated ability resolves
#[derive(Event, Debug, Clone)]
pub struct AbilityTriggeredEvent {
    pub entity: Entity,
    pub ability_id: String,
    pub target: Option<Entity>,
    pub value: f32,
}

#[derive(Event, Debug, Clone)]
pub struct XpProgressChangedEvent {
    pub entity: Entity,
    pub progress: LevelProgress,
}

#[derive(Event, Debug, Clone)]
pub struct LeveledUpEvent {
    pub entity: Entity,
    pub progress: LevelProgress,
}

#[derive(Event, Debug, Clone)]
pub struct PhaseChangedEvent {
    pub phase: MatchPhase,
    /// Countdown for the new phase (0 for phases without a timer)
    pub duration: f32,
}

#[derive(Event, Debug, Clone)]
pub struct RoundEndedEvent {
    pub round: u32,
    pub winner: Team,
}

#[derive(Event, Debug, Clone)]
pub struct ScoreChangedEvent {
    pub team_a_wins: u32,
    pub team_b_wins: u32,
}

#[derive(Event, Debug, Clone)]
pub struct MatchCompletedEvent {
    pub winner: Team,
    pub team_a_wins: u32,
    pub team_b_wins: u32,
}

/// Ask the roster to clear and respawn both teams
#[derive(Event, Debug, Clone, Default)]
pub struct SpawnTeamsRequest;
