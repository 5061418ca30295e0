//! Health and Shield Model
//!
//! Shield absorbs damage before health. Death happens once, when health
//! first reaches zero, and is permanent: damage and healing on a dead
//! character are ignored.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::combat::events::{DamageEvent, DeathEvent, HealthChangedEvent};

#[derive(Component, Clone, Debug)]
pub struct Health {
    pub max_health: f32,
    pub max_shield: f32,
    current_health: f32,
    current_shield: f32,
}

/// Resulting values after a health mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthChange {
    pub health: f32,
    pub shield: f32,
    /// True only on the change that killed
    pub died: bool,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0, 0.0)
    }
}

impl Health {
    /// Starts full. Max health is at least 1, max shield at least 0.
    pub fn new(max_health: f32, max_shield: f32) -> Self {
        let max_health = max_health.max(1.0);
        let max_shield = max_shield.max(0.0);
        Self {
            max_health,
            max_shield,
            current_health: max_health,
            current_shield: max_shield,
        }
    }

    pub fn current_health(&self) -> f32 {
        self.current_health
    }

    pub fn current_shield(&self) -> f32 {
        self.current_shield
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0.0
    }

    pub fn health_fraction(&self) -> f32 {
        self.current_health / self.max_health
    }

    pub fn apply_damage(&mut self, amount: f32) -> Option<HealthChange> {
        if !self.is_alive() || amount <= 0.0 {
            return None;
        }

        let absorbed = self.current_shield.min(amount);
        self.current_shield -= absorbed;
        let remaining = amount - absorbed;

        let mut died = false;
        if remaining > 0.0 {
            self.current_health = (self.current_health - remaining).max(0.0);
            died = self.current_health <= 0.0;
        }

        Some(self.change(died))
    }

    pub fn heal(&mut self, amount: f32) -> Option<HealthChange> {
        if !self.is_alive() || amount <= 0.0 {
            return None;
        }

        self.current_health = (self.current_health + amount).clamp(0.0, self.max_health);
        Some(self.change(false))
    }

    /// Set both pools directly, clamped into range.
    pub fn refill(&mut self, health: f32, shield: f32) -> HealthChange {
        self.current_health = health.clamp(0.0, self.max_health);
        self.current_shield = shield.clamp(0.0, self.max_shield);
        self.change(false)
    }

    /// Raise max shield. Current shield is unchanged.
    pub fn grant_shield_capacity(&mut self, amount: f32) {
        if amount > 0.0 {
            self.max_shield += amount;
        }
    }

    /// Passive ability effect: widen the shield pool and fill the new part.
    pub fn apply_passive(&mut self, value: f32) -> HealthChange {
        self.grant_shield_capacity(value);
        self.refill(self.current_health, self.current_shield + value.max(0.0))
    }

    fn change(&self, died: bool) -> HealthChange {
        HealthChange {
            health: self.current_health,
            shield: self.current_shield,
            died,
        }
    }
}

/// Writers for everything a health mutation can announce.
#[derive(SystemParam)]
pub struct HealthEvents<'w> {
    changed: EventWriter<'w, HealthChangedEvent>,
    damage: EventWriter<'w, DamageEvent>,
    deaths: EventWriter<'w, DeathEvent>,
}

impl HealthEvents<'_> {
    pub fn damaged(&mut self, target: Entity, source: Option<Entity>, amount: f32, change: HealthChange) {
        self.damage.send(DamageEvent {
            source,
            target,
            amount,
            killed: change.died,
        });
        self.changed(target, change);
        if change.died {
            self.deaths.send(DeathEvent {
                entity: target,
                killer: source,
            });
        }
    }

    pub fn changed(&mut self, entity: Entity, change: HealthChange) {
        self.changed.send(HealthChangedEvent {
            entity,
            health: change.health,
            shield: change.shield,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shield_absorbs_before_health() {
        let mut health = Health::new(100.0, 30.0);
        let change = health.apply_damage(50.0).unwrap();
        assert_eq!(change.shield, 0.0);
        assert_eq!(change.health, 80.0);
        assert!(!change.died);
    }

    #[test]
    fn test_damage_formula_holds_across_values() {
        for &(h, s, a) in &[
            (100.0, 0.0, 10.0),
            (100.0, 50.0, 20.0),
            (40.0, 10.0, 75.0),
            (1.0, 0.0, 1.0),
            (60.0, 60.0, 60.0),
        ] {
            let mut health = Health::new(100.0, 100.0);
            health.refill(h, s);
            let change = health.apply_damage(a).unwrap();
            assert_eq!(change.shield, (s - a).max(0.0));
            assert_eq!(change.health, (h - (a - s).max(0.0)).max(0.0));
            assert_eq!(change.died, change.health == 0.0 && h > 0.0);
        }
    }

    #[test]
    fn test_death_is_reported_once_and_is_permanent() {
        let mut health = Health::new(50.0, 0.0);
        assert!(health.apply_damage(80.0).unwrap().died);
        assert!(!health.is_alive());
        assert!(health.apply_damage(10.0).is_none());
        assert!(health.heal(10.0).is_none());
        assert_eq!(health.current_health(), 0.0);
    }

    #[test]
    fn test_non_positive_amounts_are_ignored() {
        let mut health = Health::new(100.0, 10.0);
        assert!(health.apply_damage(0.0).is_none());
        assert!(health.apply_damage(-5.0).is_none());
        assert!(health.heal(0.0).is_none());
        assert_eq!(health.current_shield(), 10.0);
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut health = Health::new(100.0, 0.0);
        health.apply_damage(30.0);
        assert_eq!(health.heal(500.0).unwrap().health, 100.0);
    }

    #[test]
    fn test_refill_clamps_both_pools() {
        let mut health = Health::new(100.0, 20.0);
        let change = health.refill(250.0, -3.0);
        assert_eq!(change.health, 100.0);
        assert_eq!(change.shield, 0.0);
    }

    #[test]
    fn test_passive_grants_and_fills_shield() {
        let mut health = Health::new(100.0, 10.0);
        health.apply_damage(5.0);
        let change = health.apply_passive(25.0);
        assert_eq!(health.max_shield, 35.0);
        assert_eq!(change.shield, 30.0);
        assert_eq!(change.health, 100.0);
    }
}
