//! Simulation Systems API
//!
//! Every gameplay system runs in `Update`, in six ordered phases per tick:
//!
//! 1. **Upkeep** - deferred actions, ability cooldowns, weapon timers
//! 2. **Decisions** - bot brains pick targets, movement, shots and abilities
//! 3. **Actions** - abilities, shots, movement and projectiles resolve
//! 4. **Resolution** - deaths, kill XP, level-ups
//! 5. **MatchFlow** - phase machine and team spawning
//! 6. **Record** - events are copied into the match log
//!
//! Systems inside a phase are chained, so a tick is fully deterministic
//! for a given seed and step size.

use bevy::prelude::*;

use crate::combat::events::*;
use crate::combat::log::record_notifications;

use super::abilities::{apply_ability_effects, dispatch_level_ups, tick_ability_cooldowns};
use super::bot_ai::{drive_motors, handle_deaths, update_bot_brains};
use super::match_flow::advance_match;
use super::projectiles::move_projectiles;
use super::roster::spawn_requested_teams;
use super::timers::run_deferred_actions;
use super::weapons::{fire_weapons, tick_weapons};
use super::xp::flush_xp_notifications;

/// System set labels for simulation ordering.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimPhase {
    Upkeep,
    Decisions,
    Actions,
    Resolution,
    MatchFlow,
    Record,
}

/// Configures the ordering between simulation phases.
pub fn configure_sim_phase_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SimPhase::Upkeep,
            SimPhase::Decisions,
            SimPhase::Actions,
            SimPhase::Resolution,
            SimPhase::MatchFlow,
            SimPhase::Record,
        )
            .chain(),
    );
}

fn add_events(app: &mut App) {
    app.add_event::<DamageEvent>()
        .add_event::<HealthChangedEvent>()
        .add_event::<DeathEvent>()
        .add_event::<WeaponFiredEvent>()
        .add_event::<ProjectileImpactEvent>()
        .add_event::<ReloadStartedEvent>()
        .add_event::<ReloadFinishedEvent>()
        .add_event::<AbilityReadyEvent>()
        .add_event::<AbilityTriggeredEvent>()
        .add_event::<XpProgressChangedEvent>()
        .add_event::<LeveledUpEvent>()
        .add_event::<PhaseChangedEvent>()
        .add_event::<RoundEndedEvent>()
        .add_event::<ScoreChangedEvent>()
        .add_event::<MatchCompletedEvent>()
        .add_event::<SpawnTeamsRequest>();
}

/// Adds every gameplay system and event to the app.
pub fn add_core_sim_systems(app: &mut App) {
    app.add_systems(
        Update,
        (run_deferred_actions, tick_ability_cooldowns, tick_weapons)
            .chain()
            .in_set(SimPhase::Upkeep),
    )
    .add_systems(Update, update_bot_brains.in_set(SimPhase::Decisions))
    .add_systems(
        Update,
        (apply_ability_effects, fire_weapons, drive_motors, move_projectiles)
            .chain()
            .in_set(SimPhase::Actions),
    )
    .add_systems(
        Update,
        (handle_deaths, flush_xp_notifications, dispatch_level_ups)
            .chain()
            .in_set(SimPhase::Resolution),
    )
    .add_systems(
        Update,
        (advance_match, spawn_requested_teams)
            .chain()
            .in_set(SimPhase::MatchFlow),
    )
    .add_systems(Update, record_notifications.in_set(SimPhase::Record));
}

/// Events, phase ordering and systems of the gameplay simulation. Resources
/// are provided by `SimulationBuilder`.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        add_events(app);
        configure_sim_phase_ordering(app);
        add_core_sim_systems(app);
    }
}
