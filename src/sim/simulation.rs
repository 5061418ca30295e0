//! Simulation facade
//!
//! A `Simulation` owns a headless bevy `App` and advances it with an
//! explicit `step(dt)`, so tests and the headless runner control time
//! exactly. Collaborators (world geometry, navigation, bot spawner, RNG)
//! are registered as resources through `SimulationBuilder`, which refuses
//! to register the same service twice and checks that every required one
//! is present before the first tick.

use bevy::app::Plugins;
use bevy::prelude::*;
use std::any::type_name;
use std::collections::HashSet;
use std::time::Duration;

use crate::combat::events::PhaseChangedEvent;
use crate::combat::log::MatchLog;
use crate::data::{GameData, MatchSettings, Team};

use super::abilities::AbilityLoadout;
use super::components::{Deactivated, GameRng};
use super::health::Health;
use super::match_flow::{MatchSignal, MatchState};
use super::navigation::{Navigation, OpenFloor};
use super::roster::{BotRoster, BotSpawner};
use super::systems::SimulationPlugin;
use super::timers::DeferredActions;
use super::world_query::{ArenaGeometry, ObstacleField};
use super::xp::{LevelProgress, XpService, XpUpdate};

/// Misuse of the service registry. Reported before the simulation runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WiringError {
    #[error("service `{service}` is already registered")]
    Duplicate { service: &'static str },
    #[error("service `{service}` is not registered")]
    Missing { service: &'static str },
}

pub struct SimulationBuilder {
    app: App,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    pub fn new() -> Self {
        let mut app = App::new();
        app.init_resource::<Time>();
        Self { app }
    }

    /// Register a service. Fails if one of the same type is already there.
    pub fn register<R: Resource>(&mut self, service: R) -> Result<&mut Self, WiringError> {
        if self.app.world().contains_resource::<R>() {
            return Err(WiringError::Duplicate {
                service: type_name::<R>(),
            });
        }
        self.app.insert_resource(service);
        Ok(self)
    }

    /// Register a service, replacing any existing one.
    pub fn register_overwrite<R: Resource>(&mut self, service: R) -> &mut Self {
        self.app.insert_resource(service);
        self
    }

    /// Extra plugins, e.g. `LogPlugin` for the CLI.
    pub fn add_plugins<M>(&mut self, plugins: impl Plugins<M>) -> &mut Self {
        self.app.add_plugins(plugins);
        self
    }

    pub fn build(mut self) -> Result<Simulation, WiringError> {
        require::<ArenaGeometry>(&self.app)?;
        require::<Navigation>(&self.app)?;
        require::<BotSpawner>(&self.app)?;
        require::<GameRng>(&self.app)?;

        self.app
            .init_resource::<XpService>()
            .init_resource::<DeferredActions>()
            .init_resource::<BotRoster>()
            .init_resource::<MatchState>()
            .init_resource::<MatchLog>()
            .add_plugins(SimulationPlugin);
        self.app.finish();
        self.app.cleanup();

        Ok(Simulation { app: self.app })
    }
}

fn require<R: Resource>(app: &App) -> Result<(), WiringError> {
    if app.world().contains_resource::<R>() {
        Ok(())
    } else {
        Err(WiringError::Missing {
            service: type_name::<R>(),
        })
    }
}

pub struct Simulation {
    app: App,
}

impl Simulation {
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    /// Wire a simulation from loaded game data. Without a seed the RNG is
    /// seeded from entropy.
    pub fn from_game_data(data: &GameData, seed: Option<u64>) -> Result<Self, WiringError> {
        Self::builder_from_game_data(data, seed)?.build()
    }

    /// Like `from_game_data`, but leaves the builder open for more plugins
    /// or overrides.
    pub fn builder_from_game_data(
        data: &GameData,
        seed: Option<u64>,
    ) -> Result<SimulationBuilder, WiringError> {
        let arena = &data.arena;
        let obstacles = ObstacleField::new(arena.obstacles.iter().map(|o| (o.min(), o.max())));

        let mut builder = SimulationBuilder::new();
        builder
            .register(ArenaGeometry(Box::new(obstacles.clone())))?
            .register(Navigation(Box::new(OpenFloor::new(arena.half_extent, obstacles))))?
            .register(BotSpawner {
                template: arena.bot_template.clone(),
                spawn_points: arena.spawn_points.clone(),
                loadouts: data.loadouts.clone(),
            })?
            .register(BotRoster::new(Vec3::from_array(arena.roster_origin)))?
            .register(data.races.clone())?
            .register(data.weapons.clone())?
            .register(match seed {
                Some(seed) => GameRng::from_seed(seed),
                None => GameRng::from_entropy(),
            })?;
        if let Some(settings) = arena.settings.clone() {
            builder.register(settings)?;
        }
        Ok(builder)
    }

    /// Move the match out of Bootstrapping. False when settings are missing
    /// or the match already started.
    pub fn start_match(&mut self) -> bool {
        let world = self.app.world_mut();
        let settings = world.get_resource::<MatchSettings>().cloned();
        let signals = world
            .resource_mut::<MatchState>()
            .initialize(settings.as_ref());

        let started = !signals.is_empty();
        for signal in signals {
            if let MatchSignal::PhaseChanged { phase, duration } = signal {
                info!("Match phase: {} ({:.0}s)", phase.name(), duration);
                world.send_event(PhaseChangedEvent { phase, duration });
            }
        }
        started
    }

    /// Advance simulated time by `dt` seconds and run one tick. Negative
    /// steps run a zero-length tick; NaN, infinite or overflowing steps are
    /// ignored.
    pub fn step(&mut self, dt: f32) {
        if dt.is_nan() {
            warn!("Ignoring NaN simulation step");
            return;
        }
        let Ok(delta) = Duration::try_from_secs_f32(dt.max(0.0)) else {
            warn!("Ignoring simulation step of {}s", dt);
            return;
        };
        self.app.world_mut().resource_mut::<Time>().advance_by(delta);
        self.app.update();
    }

    /// Seconds of simulated time so far.
    pub fn elapsed(&self) -> f32 {
        self.app.world().resource::<Time>().elapsed_secs()
    }

    pub fn service<R: Resource>(&self) -> Result<&R, WiringError> {
        self.app
            .world()
            .get_resource::<R>()
            .ok_or(WiringError::Missing {
                service: type_name::<R>(),
            })
    }

    pub fn service_mut<R: Resource>(&mut self) -> Result<Mut<'_, R>, WiringError> {
        self.app
            .world_mut()
            .get_resource_mut::<R>()
            .ok_or(WiringError::Missing {
                service: type_name::<R>(),
            })
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn match_state(&self) -> &MatchState {
        self.app.world().resource::<MatchState>()
    }

    pub fn match_log(&self) -> &MatchLog {
        self.app.world().resource::<MatchLog>()
    }

    /// Bots spawned for the current round on `team`.
    pub fn bots(&self, team: Team) -> Vec<Entity> {
        self.app.world().resource::<BotRoster>().bots(team).to_vec()
    }

    /// Team with more living bots right now.
    pub fn leading_team(&mut self) -> Team {
        let world = self.app.world_mut();
        let mut bots = world.query_filtered::<(Entity, &Health), Without<Deactivated>>();
        let living: HashSet<Entity> = bots
            .iter(world)
            .filter(|(_, health)| health.is_alive())
            .map(|(entity, _)| entity)
            .collect();
        world
            .resource::<BotRoster>()
            .leading_team(|entity| living.contains(&entity))
    }

    /// Activate an ability slot on `entity`. The effect lands on the next
    /// step.
    pub fn try_activate_ability(&mut self, entity: Entity, slot: usize) -> bool {
        self.app
            .world_mut()
            .get_mut::<AbilityLoadout>(entity)
            .is_some_and(|mut loadout| loadout.try_activate_ability(slot))
    }

    /// Award XP outside of kills. Level-up events go out on the next step.
    pub fn award_xp(&mut self, entity: Entity, amount: f32) -> Option<XpUpdate> {
        self.app
            .world_mut()
            .resource_mut::<XpService>()
            .award_xp(entity, amount)
    }

    pub fn progress(&self, entity: Entity) -> LevelProgress {
        self.app.world().resource::<XpService>().progress(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut builder = SimulationBuilder::new();
        builder.register(GameRng::from_seed(1)).unwrap();
        let err = builder.register(GameRng::from_seed(2)).err().unwrap();
        assert!(matches!(err, WiringError::Duplicate { .. }));
        builder.register_overwrite(GameRng::from_seed(3));
    }

    #[test]
    fn test_build_requires_collaborators() {
        let mut builder = SimulationBuilder::new();
        builder
            .register(ArenaGeometry::default())
            .unwrap()
            .register(GameRng::from_seed(1))
            .unwrap();
        let err = builder.build().err().unwrap();
        assert_eq!(
            err,
            WiringError::Missing {
                service: type_name::<Navigation>()
            }
        );
    }

    #[test]
    fn test_bad_step_sizes_do_not_advance_time() {
        let mut sim = Simulation::from_game_data(&GameData::default(), Some(2)).unwrap();
        sim.step(0.5);
        sim.step(f32::NAN);
        sim.step(f32::INFINITY);
        sim.step(f32::MAX);
        assert_eq!(sim.elapsed(), 0.5);

        sim.step(-3.0);
        assert_eq!(sim.elapsed(), 0.5);
    }

    #[test]
    fn test_start_match_needs_settings() {
        let data = GameData::default();
        let mut sim = Simulation::from_game_data(&data, Some(7)).unwrap();
        // Default arena config carries settings
        assert!(sim.start_match());
        assert!(!sim.start_match());

        let mut bare = GameData::default();
        bare.arena.settings = None;
        let mut sim = Simulation::from_game_data(&bare, Some(7)).unwrap();
        assert!(!sim.start_match());
        assert!(sim.service::<MatchSettings>().is_err());
    }
}
