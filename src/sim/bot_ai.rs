//! Bot Decision Loop
//!
//! Every tick a living bot:
//! 1. Rescans for a target every `vision_interval` seconds (nearest living
//!    enemy it can see)
//! 2. Patrols to random nearby points when it has no target
//! 3. Turns toward its target, closes to engage distance, then holds and
//!    fires while inside fire distance
//! 4. Uses at most one ready ability when the situation calls for it
//!
//! Bots never touch each other's components here. Targeting works on a
//! snapshot of positions taken at the start of the system, and all effects
//! (shots, abilities) are requests resolved by later systems.

use bevy::prelude::*;

use crate::combat::events::DeathEvent;
use crate::data::{AbilityEffectType, BrainSettings, MatchSettings, Team};

use super::abilities::AbilityLoadout;
use super::components::{Deactivated, GameRng, Hitbox, Motor};
use super::constants::{
    ARRIVAL_DISTANCE, DEATH_DEACTIVATION_DELAY, EYE_HEIGHT, HEAL_THRESHOLD, PATROL_RADIUS,
    TURN_RATE, VISION_RANGE_FACTOR,
};
use super::health::Health;
use super::navigation::Navigation;
use super::timers::{DeferredActions, TimedAction};
use super::weapons::Combat;
use super::world_query::{cast_ray, ArenaGeometry, Body, LayerMask, WorldGeometry};
use super::xp::XpService;

#[derive(Component, Clone, Debug)]
pub struct BotBrain {
    pub settings: BrainSettings,
    pub vision_mask: LayerMask,
    vision_timer: f32,
    target: Option<Entity>,
    destination: Option<Vec3>,
}

impl BotBrain {
    pub fn new(settings: BrainSettings) -> Self {
        Self {
            settings,
            vision_mask: LayerMask::ALL,
            vision_timer: 0.0,
            target: None,
            destination: None,
        }
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.destination = None;
    }
}

/// Another bot as seen by the targeting scan.
#[derive(Clone, Copy, Debug)]
pub struct TargetCandidate {
    pub entity: Entity,
    pub team: Team,
    pub position: Vec3,
    pub alive: bool,
}

/// True if a ray from `viewer`'s eyes to the target's eyes hits the target
/// before anything else.
#[allow(clippy::too_many_arguments)]
pub fn has_line_of_sight(
    geometry: &dyn WorldGeometry,
    bodies: &[Body],
    viewer: Entity,
    from: Vec3,
    target: Entity,
    target_position: Vec3,
    range: f32,
    mask: LayerMask,
) -> bool {
    let origin = from + Vec3::Y * EYE_HEIGHT;
    let direction = target_position + Vec3::Y * EYE_HEIGHT - origin;

    cast_ray(geometry, bodies, origin, direction, range, mask, Some(viewer))
        .and_then(|hit| hit.entity)
        .is_some_and(|hit| hit == target)
}

/// Nearest living enemy in clear line of sight. Candidates are scanned in
/// entity order and only a strictly closer one replaces the current pick.
#[allow(clippy::too_many_arguments)]
pub fn acquire_target(
    geometry: &dyn WorldGeometry,
    bodies: &[Body],
    viewer: Entity,
    team: Team,
    position: Vec3,
    candidates: &[TargetCandidate],
    settings: &BrainSettings,
    mask: LayerMask,
) -> Option<Entity> {
    let range = settings.fire_distance * VISION_RANGE_FACTOR;
    let mut ordered: Vec<&TargetCandidate> = candidates.iter().collect();
    ordered.sort_by_key(|candidate| candidate.entity);

    let mut closest = None;
    let mut closest_distance = f32::MAX;
    for candidate in ordered {
        if candidate.entity == viewer || candidate.team == team || !candidate.alive {
            continue;
        }

        let distance = position.distance(candidate.position);
        if distance < closest_distance
            && has_line_of_sight(
                geometry,
                bodies,
                viewer,
                position,
                candidate.entity,
                candidate.position,
                range,
                mask,
            )
        {
            closest = Some(candidate.entity);
            closest_distance = distance;
        }
    }
    closest
}

/// Run the decision loop for every active bot.
#[allow(clippy::type_complexity)]
pub fn update_bot_brains(
    time: Res<Time>,
    geometry: Res<ArenaGeometry>,
    navigation: Option<Res<Navigation>>,
    mut rng: ResMut<GameRng>,
    mut bots: Query<
        (
            Entity,
            &Team,
            &mut Transform,
            &Health,
            &Hitbox,
            &mut BotBrain,
            &mut Motor,
            &mut Combat,
            Option<&mut AbilityLoadout>,
        ),
        Without<Deactivated>,
    >,
) {
    let dt = time.delta_secs();

    let mut candidates = Vec::new();
    let mut bodies = Vec::new();
    for (entity, team, transform, health, hitbox, ..) in bots.iter() {
        candidates.push(TargetCandidate {
            entity,
            team: *team,
            position: transform.translation,
            alive: health.is_alive(),
        });
        bodies.push(hitbox.body(entity, transform.translation));
    }

    for (entity, team, mut transform, health, _, mut brain, mut motor, mut combat, loadout) in bots.iter_mut() {
        if !health.is_alive() {
            continue;
        }
        let position = transform.translation;

        brain.vision_timer -= dt;
        if brain.vision_timer <= 0.0 {
            brain.vision_timer = brain.settings.vision_interval;
            brain.target = acquire_target(
                geometry.0.as_ref(),
                &bodies,
                entity,
                *team,
                position,
                &candidates,
                &brain.settings,
                brain.vision_mask,
            );
        }

        // A target that died since the last scan is dropped right away
        let target = brain.target.and_then(|target| {
            candidates
                .iter()
                .find(|candidate| candidate.entity == target && candidate.alive)
        });
        if target.is_none() {
            brain.target = None;
        }

        let Some(target) = target else {
            patrol(&mut brain, &mut motor, position, navigation.as_deref(), &mut rng);
            let empty = combat.weapon().is_some_and(|weapon| weapon.ammo() == 0);
            if empty {
                combat.reload();
            }
            continue;
        };

        brain.destination = None;
        let to_target = target.position - position;
        let distance = to_target.length();

        let flat = Vec3::new(to_target.x, 0.0, to_target.z);
        if flat.length_squared() > 0.001 {
            let facing = Transform::IDENTITY.looking_to(flat, Vec3::Y).rotation;
            transform.rotation = transform.rotation.slerp(facing, (dt * TURN_RATE).min(1.0));
        }

        let closing = distance > brain.settings.preferred_engage_distance;
        if closing {
            let direction = match navigation.as_deref() {
                Some(navigation) => navigation.0.steer(position, target.position),
                None => flat.normalize_or_zero(),
            };
            motor.set_move_input(direction, false);
        } else {
            motor.halt();
        }

        let in_fire_range = distance <= brain.settings.fire_distance;
        if in_fire_range {
            combat.fire_primary();
        }

        if let Some(mut loadout) = loadout {
            let mut wanted = None;
            if health.health_fraction() < HEAL_THRESHOLD {
                wanted = loadout.ready_slot(AbilityEffectType::Heal);
            }
            if wanted.is_none() && in_fire_range {
                wanted = loadout.ready_slot(AbilityEffectType::DamageBoost);
            }
            if wanted.is_none() && closing {
                wanted = loadout.ready_slot(AbilityEffectType::SpeedBoost);
            }

            if let Some(slot) = wanted {
                loadout.try_activate_ability(slot);
            }
        }
    }
}

fn patrol(
    brain: &mut BotBrain,
    motor: &mut Motor,
    position: Vec3,
    navigation: Option<&Navigation>,
    rng: &mut GameRng,
) {
    let Some(navigation) = navigation else {
        motor.halt();
        return;
    };

    if let Some(destination) = brain.destination {
        let flat = Vec3::new(destination.x - position.x, 0.0, destination.z - position.z);
        if flat.length() <= ARRIVAL_DISTANCE {
            brain.destination = None;
        }
    }

    if brain.destination.is_none() {
        brain.destination = navigation.0.sample_position(position, PATROL_RADIUS, rng);
    }

    match brain.destination {
        Some(destination) => motor.set_move_input(navigation.0.steer(position, destination), false),
        None => motor.halt(),
    }
}

/// Apply movement input to positions.
pub fn drive_motors(time: Res<Time>, mut movers: Query<(&mut Transform, &Motor), Without<Deactivated>>) {
    let dt = time.delta_secs();
    for (mut transform, motor) in movers.iter_mut() {
        if motor.is_moving() {
            transform.translation += motor.velocity() * dt;
        }
    }
}

/// Halt dead bots, schedule their removal and credit the killer.
pub fn handle_deaths(
    time: Res<Time>,
    settings: Option<Res<MatchSettings>>,
    mut deaths: EventReader<DeathEvent>,
    mut deferred: ResMut<DeferredActions>,
    mut xp: ResMut<XpService>,
    mut bots: Query<(&Team, &mut Motor, Option<&mut BotBrain>)>,
) {
    let now = time.elapsed_secs();
    let xp_per_kill = settings.map(|s| s.xp_per_kill).unwrap_or(0.0);

    for death in deaths.read() {
        let Ok((team, mut motor, brain)) = bots.get_mut(death.entity) else {
            continue;
        };
        let victim_team = *team;
        motor.halt();
        if let Some(mut brain) = brain {
            brain.clear();
        }
        deferred.schedule(now, DEATH_DEACTIVATION_DELAY, death.entity, TimedAction::Deactivate);

        let Some(killer) = death.killer else {
            continue;
        };
        let enemy_kill = bots
            .get(killer)
            .is_ok_and(|(killer_team, ..)| *killer_team != victim_team);
        if enemy_kill {
            xp.award_xp(killer, xp_per_kill);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world_query::ObstacleField;

    fn candidate(index: u32, team: Team, position: Vec3) -> TargetCandidate {
        TargetCandidate {
            entity: Entity::from_raw(index),
            team,
            position,
            alive: true,
        }
    }

    fn bodies_for(candidates: &[TargetCandidate]) -> Vec<Body> {
        candidates
            .iter()
            .map(|c| Hitbox { radius: 0.8 }.body(c.entity, c.position))
            .collect()
    }

    #[test]
    fn test_picks_nearest_visible_enemy() {
        let candidates = [
            candidate(1, Team::A, Vec3::ZERO),
            candidate(2, Team::B, Vec3::new(0.0, 0.0, -20.0)),
            candidate(3, Team::B, Vec3::new(10.0, 0.0, 0.0)),
            candidate(4, Team::A, Vec3::new(3.0, 0.0, 3.0)),
        ];
        let bodies = bodies_for(&candidates);
        let picked = acquire_target(
            &ObstacleField::default(),
            &bodies,
            Entity::from_raw(1),
            Team::A,
            Vec3::ZERO,
            &candidates,
            &BrainSettings::default(),
            LayerMask::ALL,
        );
        assert_eq!(picked, Some(Entity::from_raw(3)));
    }

    #[test]
    fn test_teammate_in_the_line_blocks_the_view() {
        let candidates = [
            candidate(1, Team::A, Vec3::ZERO),
            candidate(2, Team::B, Vec3::new(0.0, 0.0, -20.0)),
            candidate(3, Team::B, Vec3::new(10.0, 0.0, 0.0)),
            candidate(4, Team::A, Vec3::new(3.0, 0.0, 0.0)),
        ];
        let bodies = bodies_for(&candidates);
        let picked = acquire_target(
            &ObstacleField::default(),
            &bodies,
            Entity::from_raw(1),
            Team::A,
            Vec3::ZERO,
            &candidates,
            &BrainSettings::default(),
            LayerMask::ALL,
        );
        // The eye ray clips the teammate's hit sphere before reaching x=10
        assert_eq!(picked, Some(Entity::from_raw(2)));
    }

    #[test]
    fn test_ignores_dead_and_out_of_range_enemies() {
        let mut dead = candidate(2, Team::B, Vec3::new(5.0, 0.0, 0.0));
        dead.alive = false;
        let candidates = [
            candidate(1, Team::A, Vec3::ZERO),
            dead,
            candidate(3, Team::B, Vec3::new(0.0, 0.0, 40.0)),
        ];
        let bodies = bodies_for(&candidates);
        let picked = acquire_target(
            &ObstacleField::default(),
            &bodies,
            Entity::from_raw(1),
            Team::A,
            Vec3::ZERO,
            &candidates,
            &BrainSettings::default(),
            LayerMask::ALL,
        );
        // 40m is beyond 22 * 1.5
        assert_eq!(picked, None);
    }

    #[test]
    fn test_equal_distance_goes_to_lower_entity() {
        let candidates = [
            candidate(9, Team::B, Vec3::new(-10.0, 0.0, 0.0)),
            candidate(1, Team::A, Vec3::ZERO),
            candidate(5, Team::B, Vec3::new(10.0, 0.0, 0.0)),
        ];
        let bodies = bodies_for(&candidates);
        let picked = acquire_target(
            &ObstacleField::default(),
            &bodies,
            Entity::from_raw(1),
            Team::A,
            Vec3::ZERO,
            &candidates,
            &BrainSettings::default(),
            LayerMask::ALL,
        );
        assert_eq!(picked, Some(Entity::from_raw(5)));
    }
}
