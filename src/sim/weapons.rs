//! Weapon State Machine
//!
//! A `Weapon` owns ammo, the fire-interval cooldown and the reload timer for
//! one equipped `WeaponDefinition`. The `Combat` component holds the active
//! weapon plus the shot requests made during the tick; `fire_weapons`
//! resolves those requests after the decision systems have run.

use bevy::prelude::*;
use std::sync::Arc;

use crate::combat::events::{ReloadFinishedEvent, ReloadStartedEvent, WeaponFiredEvent};
use crate::data::WeaponDefinition;

use super::components::{Deactivated, Hitbox};
use super::constants::MUZZLE_HEIGHT;
use super::health::{Health, HealthEvents};
use super::projectiles::Projectile;
use super::world_query::{cast_ray, ArenaGeometry, Body, LayerMask};

/// Runtime counters for the equipped weapon. Replaced wholesale on equip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponState {
    pub ammo: u32,
    pub reloading: bool,
    pub reload_remaining: f32,
    pub cooldown_remaining: f32,
}

/// Result of pulling the trigger once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireOutcome {
    Fired,
    /// Reloading or still cooling down
    Blocked,
    /// Magazine empty; a reload was started if one was not running
    Empty { reload_started: bool },
}

#[derive(Clone, Debug)]
pub struct Weapon {
    definition: Arc<WeaponDefinition>,
    state: WeaponState,
}

impl Weapon {
    pub fn new(definition: Arc<WeaponDefinition>) -> Self {
        let state = WeaponState {
            ammo: definition.magazine_size(),
            reloading: false,
            reload_remaining: 0.0,
            cooldown_remaining: 0.0,
        };
        Self { definition, state }
    }

    pub fn definition(&self) -> &Arc<WeaponDefinition> {
        &self.definition
    }

    pub fn state(&self) -> &WeaponState {
        &self.state
    }

    pub fn ammo(&self) -> u32 {
        self.state.ammo
    }

    pub fn is_reloading(&self) -> bool {
        self.state.reloading
    }

    /// Consume a round if the weapon can fire. An empty magazine starts a
    /// reload instead of firing.
    pub fn try_fire(&mut self) -> FireOutcome {
        if self.state.reloading || self.state.cooldown_remaining > 0.0 {
            return FireOutcome::Blocked;
        }

        if self.state.ammo == 0 {
            return FireOutcome::Empty {
                reload_started: self.reload(),
            };
        }

        self.state.ammo -= 1;
        self.state.cooldown_remaining = self.definition.fire_interval();
        FireOutcome::Fired
    }

    /// Start a reload. False if one is running or the magazine is full.
    pub fn reload(&mut self) -> bool {
        if self.state.reloading || self.state.ammo == self.definition.magazine_size() {
            return false;
        }

        self.state.reloading = true;
        self.state.reload_remaining = self.definition.reload_seconds();
        true
    }

    /// Advance timers. Returns true when a reload completes.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.state.cooldown_remaining > 0.0 {
            self.state.cooldown_remaining = (self.state.cooldown_remaining - dt).max(0.0);
        }

        if !self.state.reloading {
            return false;
        }

        self.state.reload_remaining -= dt;
        if self.state.reload_remaining > 0.0 {
            return false;
        }

        self.state.ammo = self.definition.magazine_size();
        self.state.reloading = false;
        self.state.reload_remaining = 0.0;
        true
    }
}

/// Weapon slot and per-tick shot requests for a character.
#[derive(Component, Clone, Debug)]
pub struct Combat {
    weapon: Option<Weapon>,
    /// Added to every shot while a DamageBoost is active
    pub damage_bonus: f32,
    pub hit_mask: LayerMask,
    trigger_pulled: bool,
    reload_requested: bool,
}

impl Default for Combat {
    fn default() -> Self {
        Self {
            weapon: None,
            damage_bonus: 0.0,
            hit_mask: LayerMask::ALL,
            trigger_pulled: false,
            reload_requested: false,
        }
    }
}

impl Combat {
    /// Replace the active weapon with a fresh one. No-op without a definition.
    pub fn equip_weapon(&mut self, definition: Option<Arc<WeaponDefinition>>) {
        if let Some(definition) = definition {
            self.weapon = Some(Weapon::new(definition));
        }
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    pub fn weapon_mut(&mut self) -> Option<&mut Weapon> {
        self.weapon.as_mut()
    }

    /// Request a shot this tick. Skipped without a weapon.
    pub fn fire_primary(&mut self) {
        if self.weapon.is_some() {
            self.trigger_pulled = true;
        }
    }

    /// Alternate fire currently behaves like primary fire.
    pub fn fire_secondary(&mut self) {
        self.fire_primary();
    }

    /// Request a reload this tick. Skipped without a weapon.
    pub fn reload(&mut self) {
        if self.weapon.is_some() {
            self.reload_requested = true;
        }
    }

    pub fn trigger_pulled(&self) -> bool {
        self.trigger_pulled
    }
}

/// Count down fire cooldowns and reloads.
pub fn tick_weapons(
    time: Res<Time>,
    mut combatants: Query<(Entity, &mut Combat)>,
    mut reload_finished: EventWriter<ReloadFinishedEvent>,
) {
    let dt = time.delta_secs();

    for (entity, mut combat) in combatants.iter_mut() {
        let Some(weapon) = combat.weapon.as_mut() else {
            continue;
        };
        if weapon.tick(dt) {
            reload_finished.send(ReloadFinishedEvent { entity });
        }
    }
}

/// Resolve reload and fire requests. Hit-scan hits are collected first and
/// applied after every shooter has fired.
pub fn fire_weapons(
    mut commands: Commands,
    geometry: Res<ArenaGeometry>,
    mut shooters: Query<(Entity, &Transform, &mut Combat), Without<Deactivated>>,
    mut targets: Query<
        (Entity, &Transform, &Hitbox, &mut Health, Has<Deactivated>),
        Without<Projectile>,
    >,
    mut fired_events: EventWriter<WeaponFiredEvent>,
    mut reload_started: EventWriter<ReloadStartedEvent>,
    mut health_events: HealthEvents,
) {
    let bodies: Vec<Body> = targets
        .iter()
        .filter(|(.., deactivated)| !deactivated)
        .map(|(entity, transform, hitbox, ..)| hitbox.body(entity, transform.translation))
        .collect();

    // (shooter, target, damage)
    let mut hits: Vec<(Entity, Entity, f32)> = Vec::new();

    for (shooter, transform, mut combat) in shooters.iter_mut() {
        let trigger = std::mem::take(&mut combat.trigger_pulled);
        let reload = std::mem::take(&mut combat.reload_requested);
        if !trigger && !reload {
            continue;
        }

        let alive = targets
            .get(shooter)
            .map(|(_, _, _, health, _)| health.is_alive())
            .unwrap_or(true);
        if !alive {
            continue;
        }

        let damage_bonus = combat.damage_bonus;
        let hit_mask = combat.hit_mask;
        let Some(weapon) = combat.weapon.as_mut() else {
            continue;
        };

        if reload && weapon.reload() {
            reload_started.send(ReloadStartedEvent {
                entity: shooter,
                duration: weapon.definition.reload_seconds(),
            });
        }

        if !trigger {
            continue;
        }

        match weapon.try_fire() {
            FireOutcome::Fired => {}
            FireOutcome::Blocked => continue,
            FireOutcome::Empty { reload_started: started } => {
                if started {
                    reload_started.send(ReloadStartedEvent {
                        entity: shooter,
                        duration: weapon.definition.reload_seconds(),
                    });
                }
                continue;
            }
        }

        let definition = Arc::clone(&weapon.definition);
        let damage = definition.damage() + damage_bonus;
        let origin = transform.translation + Vec3::Y * MUZZLE_HEIGHT;
        let direction = transform.forward();
        let mut hit = None;

        match definition.projectile() {
            Some(projectile) => {
                commands.spawn((
                    Projectile::new(
                        damage,
                        projectile.speed,
                        projectile.lifetime,
                        definition.max_range(),
                        hit_mask,
                        Some(shooter),
                        origin,
                    ),
                    Transform::from_translation(origin).looking_to(direction, Vec3::Y),
                ));
            }
            None => {
                let ray_hit = cast_ray(
                    geometry.0.as_ref(),
                    &bodies,
                    origin,
                    *direction,
                    definition.max_range(),
                    hit_mask,
                    Some(shooter),
                );
                if let Some(target) = ray_hit.and_then(|h| h.entity) {
                    hits.push((shooter, target, damage));
                    hit = Some(target);
                }
            }
        }

        fired_events.send(WeaponFiredEvent {
            shooter,
            weapon_id: definition.id.clone(),
            recoil: definition.recoil(),
            hit,
        });
    }

    for (shooter, target, damage) in hits {
        let Ok((_, _, _, mut health, _)) = targets.get_mut(target) else {
            continue;
        };
        if let Some(change) = health.apply_damage(damage) {
            health_events.damaged(target, Some(shooter), damage, change);
        }
    }
}
