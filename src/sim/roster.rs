//! Bot Roster
//!
//! Spawns a full set of bots for both teams when the match flow asks for
//! it, and remembers which entities belong to which team so round results
//! can be decided from living counts.
//!
//! Respawning always starts from a clean slate: the previous bots are
//! despawned, their XP registrations removed and their pending timers
//! cancelled before the new ones appear.

use bevy::prelude::*;
use std::sync::Arc;

use crate::combat::events::SpawnTeamsRequest;
use crate::combat::log::MatchLog;
use crate::data::{BotLoadoutSet, BotProfile, BotTemplate, MatchSettings, Team, TeamSpawnPoint};

use super::abilities::AbilityLoadout;
use super::bot_ai::BotBrain;
use super::components::{Bot, GameRng, Hitbox, Motor};
use super::health::{Health, HealthChange, HealthEvents};
use super::projectiles::Projectile;
use super::timers::DeferredActions;
use super::weapons::Combat;
use super::xp::XpService;

/// Bots spawned for the current round, per team.
#[derive(Resource, Clone, Debug, Default)]
pub struct BotRoster {
    team_a: Vec<Entity>,
    team_b: Vec<Entity>,
    /// Spawn position used when a team has no spawn points
    pub origin: Vec3,
}

impl BotRoster {
    pub fn new(origin: Vec3) -> Self {
        Self {
            origin,
            ..default()
        }
    }

    pub fn bots(&self, team: Team) -> &[Entity] {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
            Team::None => &[],
        }
    }

    pub fn all(&self) -> impl Iterator<Item = Entity> + '_ {
        self.team_a.iter().chain(self.team_b.iter()).copied()
    }

    pub fn len(&self) -> usize {
        self.team_a.len() + self.team_b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add(&mut self, team: Team, entity: Entity) {
        match team {
            Team::A => self.team_a.push(entity),
            Team::B => self.team_b.push(entity),
            Team::None => {}
        }
    }

    /// Forget every bot and return the entities that were tracked.
    fn take_all(&mut self) -> Vec<Entity> {
        let mut previous = std::mem::take(&mut self.team_a);
        previous.append(&mut self.team_b);
        previous
    }

    /// Living members of `team` according to `is_alive`.
    pub fn count_alive(&self, team: Team, is_alive: impl Fn(Entity) -> bool) -> usize {
        self.bots(team).iter().filter(|entity| is_alive(**entity)).count()
    }

    /// Team with strictly more living members, `Team::None` on a tie.
    pub fn leading_team(&self, is_alive: impl Fn(Entity) -> bool) -> Team {
        leading_team_from_counts(
            self.count_alive(Team::A, &is_alive),
            self.count_alive(Team::B, &is_alive),
        )
    }
}

pub fn leading_team_from_counts(alive_a: usize, alive_b: usize) -> Team {
    match alive_a.cmp(&alive_b) {
        std::cmp::Ordering::Greater => Team::A,
        std::cmp::Ordering::Less => Team::B,
        std::cmp::Ordering::Equal => Team::None,
    }
}

/// Everything needed to build a bot.
#[derive(Resource, Clone, Debug, Default)]
pub struct BotSpawner {
    pub template: Option<BotTemplate>,
    pub spawn_points: Vec<TeamSpawnPoint>,
    pub loadouts: BotLoadoutSet,
}

impl BotSpawner {
    /// Spawn transform for the `index`-th bot of `team`, cycling through
    /// that team's points. Falls back to `origin` when it has none.
    pub fn spawn_transform(&self, team: Team, index: usize, origin: Vec3) -> Transform {
        let points: Vec<&TeamSpawnPoint> = self
            .spawn_points
            .iter()
            .filter(|point| point.team == team)
            .collect();

        if points.is_empty() {
            return Transform::from_translation(origin);
        }
        points[index % points.len()].transform()
    }
}

/// Components for one bot, before it is spawned.
struct BotBlueprint {
    bot: Bot,
    health: Health,
    hitbox: Hitbox,
    motor: Motor,
    combat: Combat,
    loadout: AbilityLoadout,
    brain: BotBrain,
    profile: Option<Arc<BotProfile>>,
    /// Health after the last passive applied at spawn, announced once the
    /// entity exists
    passive_refill: Option<HealthChange>,
}

fn build_bot(
    template: &BotTemplate,
    profile: Option<Arc<BotProfile>>,
    team: Team,
    index: usize,
) -> Option<BotBlueprint> {
    let Some(brain) = template.brain else {
        error!("Bot template has no brain settings, cannot spawn bot");
        return None;
    };

    let mut health = Health::new(template.max_health, template.max_shield);
    let mut combat = Combat::default();
    let mut loadout = AbilityLoadout::default();
    let mut passive_refill = None;

    let display_name = match &profile {
        Some(profile) => {
            combat.equip_weapon(
                profile
                    .primary_weapon
                    .clone()
                    .or_else(|| profile.secondary_weapon.clone()),
            );

            if profile.race.is_none() {
                warn!("Bot profile '{}' has no race, abilities skipped", profile.id);
            }
            for unlocked in loadout.equip_race(profile.race.clone(), 1) {
                if unlocked.definition.is_passive() {
                    passive_refill = Some(health.apply_passive(unlocked.value()));
                }
            }
            format!("{} ({} #{})", profile.display_name, team, index + 1)
        }
        None => format!("Bot ({} #{})", team, index + 1),
    };

    Some(BotBlueprint {
        bot: Bot {
            profile_id: profile.as_ref().map(|p| p.id.clone()).unwrap_or_default(),
            display_name,
        },
        health,
        hitbox: Hitbox {
            radius: template.hit_radius,
        },
        motor: Motor::new(template.walk_speed, template.sprint_speed),
        combat,
        loadout,
        brain: BotBrain::new(brain),
        profile,
        passive_refill,
    })
}

/// Replace last round's bots with a fresh set for both teams.
#[allow(clippy::too_many_arguments)]
pub fn spawn_requested_teams(
    mut commands: Commands,
    mut requests: EventReader<SpawnTeamsRequest>,
    settings: Option<Res<MatchSettings>>,
    spawner: Res<BotSpawner>,
    mut roster: ResMut<BotRoster>,
    mut xp: ResMut<XpService>,
    mut deferred: ResMut<DeferredActions>,
    mut rng: ResMut<GameRng>,
    mut match_log: ResMut<MatchLog>,
    projectiles: Query<Entity, With<Projectile>>,
    mut health_events: HealthEvents,
) {
    // Several requests in one tick still produce a single roster
    if requests.read().count() == 0 {
        return;
    }

    for entity in roster.take_all() {
        xp.unregister(entity);
        deferred.cancel_owner(entity);
        commands.entity(entity).despawn();
    }
    for projectile in projectiles.iter() {
        commands.entity(projectile).despawn();
    }

    let Some(settings) = settings else {
        error!("Cannot spawn teams without match settings");
        return;
    };
    if !settings.fill_with_bots {
        debug!("Bot fill disabled, arena left empty");
        return;
    }
    let Some(template) = spawner.template.as_ref() else {
        error!("Cannot spawn teams without a bot template");
        return;
    };

    for team in [Team::A, Team::B] {
        for index in 0..settings.bots_per_team as usize {
            let profile = spawner.loadouts.random_profile(team, rng.rng_mut());
            let Some(blueprint) = build_bot(template, profile, team, index) else {
                continue;
            };

            let transform = spawner.spawn_transform(team, index, roster.origin);
            let entity = commands
                .spawn((
                    blueprint.bot.clone(),
                    team,
                    transform,
                    blueprint.health,
                    blueprint.hitbox,
                    blueprint.motor,
                    blueprint.combat,
                    blueprint.loadout,
                    blueprint.brain,
                ))
                .id();

            if let Some(change) = blueprint.passive_refill {
                health_events.changed(entity, change);
            }
            if let Some(race) = blueprint.profile.as_ref().and_then(|p| p.race.clone()) {
                xp.register(entity, race);
            }
            match_log.register_bot(entity, team, &blueprint.bot.display_name);
            roster.add(team, entity);
        }
    }

    info!(
        "Spawned {} bots for Team A and {} for Team B",
        roster.bots(Team::A).len(),
        roster.bots(Team::B).len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AbilityDefinition, AbilityEffectType, BrainSettings, RaceDefinition, RaceLevelTier};

    #[test]
    fn test_leading_team_from_counts() {
        assert_eq!(leading_team_from_counts(3, 1), Team::A);
        assert_eq!(leading_team_from_counts(0, 2), Team::B);
        assert_eq!(leading_team_from_counts(2, 2), Team::None);
        assert_eq!(leading_team_from_counts(0, 0), Team::None);
    }

    #[test]
    fn test_roster_counts_only_living_members() {
        let mut roster = BotRoster::default();
        for index in 0..3 {
            roster.add(Team::A, Entity::from_raw(index));
        }
        roster.add(Team::B, Entity::from_raw(10));
        roster.add(Team::B, Entity::from_raw(11));

        let dead = [Entity::from_raw(0), Entity::from_raw(11)];
        let alive = |entity: Entity| !dead.contains(&entity);
        assert_eq!(roster.count_alive(Team::A, alive), 2);
        assert_eq!(roster.leading_team(alive), Team::A);
        assert_eq!(roster.leading_team(|_| true), Team::A);
        assert_eq!(roster.take_all().len(), 5);
        assert!(roster.is_empty());
    }

    #[test]
    fn test_spawn_points_cycle_per_team() {
        let spawner = BotSpawner {
            spawn_points: vec![
                TeamSpawnPoint::new(Team::A, Vec3::new(-10.0, 0.0, 0.0)),
                TeamSpawnPoint::new(Team::B, Vec3::new(10.0, 0.0, 0.0)),
                TeamSpawnPoint::new(Team::A, Vec3::new(-10.0, 0.0, 5.0)),
            ],
            ..default()
        };

        let third = spawner.spawn_transform(Team::A, 2, Vec3::ZERO);
        assert_eq!(third.translation, Vec3::new(-10.0, 0.0, 0.0));
        let second = spawner.spawn_transform(Team::A, 1, Vec3::ZERO);
        assert_eq!(second.translation, Vec3::new(-10.0, 0.0, 5.0));

        let empty = BotSpawner::default();
        let origin = Vec3::new(1.0, 0.0, 2.0);
        assert_eq!(empty.spawn_transform(Team::B, 4, origin).translation, origin);
    }

    #[test]
    fn test_template_without_brain_is_rejected() {
        let template = BotTemplate {
            brain: None,
            ..default()
        };
        assert!(build_bot(&template, None, Team::A, 0).is_none());
    }

    #[test]
    fn test_passive_abilities_raise_shield_at_spawn() {
        let passive = Arc::new(AbilityDefinition::new("fortify", AbilityEffectType::Passive).with_base_value(25.0));
        let mut race = RaceDefinition::new("dwarf", "Dwarf");
        race.set_debug_levels(vec![RaceLevelTier::new(1, 0.0, vec![passive])]);

        let mut profile = BotProfile::new("rifleman", Team::A);
        profile.race = Some(Arc::new(race));

        let template = BotTemplate {
            brain: Some(BrainSettings::default()),
            ..default()
        };
        let blueprint = build_bot(&template, Some(Arc::new(profile)), Team::A, 0).unwrap();
        assert_eq!(blueprint.health.max_shield, 25.0);
        assert_eq!(blueprint.health.current_shield(), 25.0);
        assert_eq!(blueprint.loadout.slots().len(), 1);
        let refill = blueprint.passive_refill.unwrap();
        assert_eq!(refill.shield, 25.0);
        assert!(!refill.died);
    }
}
