//! Ability Loadouts
//!
//! Each bot owns an `AbilityLoadout`: the abilities its race has unlocked up
//! to its current level, each in a slot with an independent cooldown.
//!
//! Activation is split in two steps. `try_activate_ability` checks the slot,
//! starts the cooldown and queues the activation; `apply_ability_effects`
//! resolves queued activations later in the same tick (heal, speed boost,
//! damage boost) and announces them.

use bevy::prelude::*;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::combat::events::{AbilityReadyEvent, AbilityTriggeredEvent, LeveledUpEvent};
use crate::data::{AbilityDefinition, AbilityEffectType, AbilityTargetType, RaceDefinition, Team};

use super::components::{Deactivated, Motor};
use super::constants::BOOST_DURATION;
use super::health::{Health, HealthEvents};
use super::timers::{DeferredActions, TimedAction};
use super::weapons::Combat;

#[derive(Clone, Debug)]
pub struct AbilitySlot {
    pub definition: Arc<AbilityDefinition>,
    /// Level at which the slot was unlocked; scales the effect
    pub level: u32,
    pub cooldown_remaining: f32,
}

impl AbilitySlot {
    pub fn new(definition: Arc<AbilityDefinition>, level: u32) -> Self {
        Self {
            definition,
            level,
            cooldown_remaining: 0.0,
        }
    }

    pub fn is_on_cooldown(&self) -> bool {
        self.cooldown_remaining > 0.0
    }

    pub fn is_ready(&self) -> bool {
        !self.is_on_cooldown()
    }

    pub fn value(&self) -> f32 {
        self.definition.scaled_value(self.level)
    }
}

/// An ability that became available through equip or level-up.
#[derive(Clone, Debug)]
pub struct UnlockedAbility {
    pub definition: Arc<AbilityDefinition>,
    pub level: u32,
}

impl UnlockedAbility {
    pub fn value(&self) -> f32 {
        self.definition.scaled_value(self.level)
    }
}

/// A successful activation waiting for its effect to be applied.
#[derive(Clone, Debug)]
pub struct PendingActivation {
    pub definition: Arc<AbilityDefinition>,
    pub value: f32,
}

#[derive(Component, Clone, Debug)]
pub struct AbilityLoadout {
    race: Option<Arc<RaceDefinition>>,
    level: u32,
    slots: Vec<AbilitySlot>,
    pending: SmallVec<[PendingActivation; 2]>,
}

impl Default for AbilityLoadout {
    fn default() -> Self {
        Self {
            race: None,
            level: 1,
            slots: Vec::new(),
            pending: SmallVec::new(),
        }
    }
}

impl AbilityLoadout {
    pub fn race(&self) -> Option<&Arc<RaceDefinition>> {
        self.race.as_ref()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn slots(&self) -> &[AbilitySlot] {
        &self.slots
    }

    /// Reset to `race` at `starting_level` (at least 1), unlocking every tier
    /// up to it. Returns the unlocked abilities so the caller can apply
    /// passives.
    pub fn equip_race(&mut self, race: Option<Arc<RaceDefinition>>, starting_level: u32) -> Vec<UnlockedAbility> {
        self.slots.clear();
        self.pending.clear();
        self.level = starting_level.max(1);
        self.race = race;

        let Some(race) = self.race.clone() else {
            return Vec::new();
        };
        (1..=self.level)
            .flat_map(|level| self.unlock_level(&race, level))
            .collect()
    }

    /// Unlock every tier in (current, new_level]. No-op without a race.
    pub fn handle_level_up(&mut self, new_level: u32) -> Vec<UnlockedAbility> {
        let Some(race) = self.race.clone() else {
            return Vec::new();
        };

        let unlocked: Vec<UnlockedAbility> = (self.level + 1..=new_level)
            .flat_map(|level| self.unlock_level(&race, level))
            .collect();
        self.level = self.level.max(new_level);
        unlocked
    }

    fn unlock_level(&mut self, race: &RaceDefinition, level: u32) -> Vec<UnlockedAbility> {
        race.unlocked_abilities(level)
            .iter()
            .map(|definition| {
                self.slots.push(AbilitySlot::new(Arc::clone(definition), level));
                UnlockedAbility {
                    definition: Arc::clone(definition),
                    level,
                }
            })
            .collect()
    }

    /// Start the slot's cooldown and queue its effect. False without side
    /// effects if the index is out of range or the slot is cooling down.
    pub fn try_activate_ability(&mut self, slot_index: usize) -> bool {
        let Some(slot) = self.slots.get_mut(slot_index) else {
            return false;
        };
        if slot.is_on_cooldown() {
            return false;
        }

        slot.cooldown_remaining = slot.definition.cooldown_seconds.max(0.0);
        self.pending.push(PendingActivation {
            definition: Arc::clone(&slot.definition),
            value: slot.value(),
        });
        true
    }

    /// First ready slot with the given effect.
    pub fn ready_slot(&self, effect: AbilityEffectType) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.is_ready() && slot.definition.effect_type == effect)
    }

    /// Advance cooldowns; returns the abilities that became ready this tick.
    pub fn tick(&mut self, dt: f32) -> SmallVec<[Arc<AbilityDefinition>; 2]> {
        let mut ready = SmallVec::new();
        for slot in self.slots.iter_mut().filter(|slot| slot.is_on_cooldown()) {
            slot.cooldown_remaining -= dt;
            if slot.cooldown_remaining <= 0.0 {
                slot.cooldown_remaining = 0.0;
                ready.push(Arc::clone(&slot.definition));
            }
        }
        ready
    }

    pub fn take_pending(&mut self) -> SmallVec<[PendingActivation; 2]> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Count down ability cooldowns.
pub fn tick_ability_cooldowns(
    time: Res<Time>,
    mut loadouts: Query<(Entity, &mut AbilityLoadout)>,
    mut ready_events: EventWriter<AbilityReadyEvent>,
) {
    let dt = time.delta_secs();

    for (entity, mut loadout) in loadouts.iter_mut() {
        for definition in loadout.tick(dt) {
            ready_events.send(AbilityReadyEvent {
                entity,
                ability_id: definition.id.clone(),
            });
        }
    }
}

/// Resolve queued ability activations.
pub fn apply_ability_effects(
    time: Res<Time>,
    mut deferred: ResMut<DeferredActions>,
    mut casters: Query<(Entity, &Team, &mut AbilityLoadout, &mut Motor, &mut Combat), Without<Deactivated>>,
    mut healths: Query<(Entity, &Team, &mut Health)>,
    mut triggered: EventWriter<AbilityTriggeredEvent>,
    mut health_events: HealthEvents,
) {
    let now = time.elapsed_secs();
    // (caster, team, target type, value, ability id)
    let mut heals: Vec<(Entity, Team, AbilityTargetType, f32, String)> = Vec::new();

    for (entity, team, mut loadout, mut motor, mut combat) in casters.iter_mut() {
        if !loadout.has_pending() {
            continue;
        }
        let pending = loadout.take_pending();

        let alive = healths
            .get(entity)
            .map(|(_, _, health)| health.is_alive())
            .unwrap_or(true);
        if !alive {
            continue;
        }

        for activation in pending {
            let definition = &activation.definition;
            match definition.effect_type {
                AbilityEffectType::Heal => {
                    heals.push((
                        entity,
                        *team,
                        definition.target_type,
                        activation.value,
                        definition.id.clone(),
                    ));
                    continue;
                }
                AbilityEffectType::SpeedBoost => {
                    motor.speed_bonus += activation.value;
                    deferred.schedule(now, BOOST_DURATION, entity, TimedAction::EndSpeedBoost(activation.value));
                }
                AbilityEffectType::DamageBoost => {
                    combat.damage_bonus += activation.value;
                    deferred.schedule(now, BOOST_DURATION, entity, TimedAction::EndDamageBoost(activation.value));
                }
                AbilityEffectType::Passive => {}
            }

            triggered.send(AbilityTriggeredEvent {
                entity,
                ability_id: definition.id.clone(),
                target: Some(entity),
                value: activation.value,
            });
        }
    }

    for (caster, team, target_type, value, ability_id) in heals {
        let target = match target_type {
            AbilityTargetType::Ally => most_injured_ally(&healths, team).unwrap_or(caster),
            _ => caster,
        };

        if let Ok((_, _, mut health)) = healths.get_mut(target) {
            if let Some(change) = health.heal(value) {
                health_events.changed(target, change);
            }
        }

        triggered.send(AbilityTriggeredEvent {
            entity: caster,
            ability_id,
            target: Some(target),
            value,
        });
    }
}

/// Living teammate with the lowest health fraction; ties go to the lower
/// entity.
fn most_injured_ally(healths: &Query<(Entity, &Team, &mut Health)>, team: Team) -> Option<Entity> {
    healths
        .iter()
        .filter(|(_, member_team, health)| **member_team == team && health.is_alive())
        .min_by(|a, b| {
            a.2.health_fraction()
                .total_cmp(&b.2.health_fraction())
                .then_with(|| a.0.cmp(&b.0))
        })
        .map(|(entity, ..)| entity)
}

/// Unlock abilities for bots that leveled up. New passives apply at once.
pub fn dispatch_level_ups(
    mut level_ups: EventReader<LeveledUpEvent>,
    mut bots: Query<(&mut AbilityLoadout, &mut Health)>,
    mut ready_events: EventWriter<AbilityReadyEvent>,
    mut health_events: HealthEvents,
) {
    for event in level_ups.read() {
        let Ok((mut loadout, mut health)) = bots.get_mut(event.entity) else {
            continue;
        };

        for unlocked in loadout.handle_level_up(event.progress.level) {
            if unlocked.definition.is_passive() {
                let change = health.apply_passive(unlocked.value());
                health_events.changed(event.entity, change);
            }
            ready_events.send(AbilityReadyEvent {
                entity: event.entity,
                ability_id: unlocked.definition.id.clone(),
            });
        }
    }
}
