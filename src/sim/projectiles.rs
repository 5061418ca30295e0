//! Projectile Systems
//!
//! Projectiles fly in a straight line at constant speed from where they were
//! fired. They expire after their lifetime or once they have travelled the
//! weapon's max range, and on their first qualifying hit they deal damage
//! once and disappear.

use bevy::prelude::*;

use crate::combat::events::ProjectileImpactEvent;

use super::components::{Deactivated, Hitbox};
use super::health::{Health, HealthEvents};
use super::world_query::{cast_ray, ArenaGeometry, Body, LayerMask};

#[derive(Component, Clone, Debug)]
pub struct Projectile {
    pub damage: f32,
    pub speed: f32,
    pub lifetime: f32,
    pub max_range: f32,
    pub hit_mask: LayerMask,
    /// Shooter, never hit by its own projectile
    pub source: Option<Entity>,
    start: Vec3,
    elapsed: f32,
    spent: bool,
}

impl Projectile {
    pub fn new(
        damage: f32,
        speed: f32,
        lifetime: f32,
        max_range: f32,
        hit_mask: LayerMask,
        source: Option<Entity>,
        start: Vec3,
    ) -> Self {
        Self {
            damage,
            speed: speed.max(0.0),
            lifetime,
            max_range,
            hit_mask,
            source,
            start,
            elapsed: 0.0,
            spent: false,
        }
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    fn expired(&self, position: Vec3) -> bool {
        self.elapsed >= self.lifetime || self.start.distance(position) >= self.max_range
    }
}

/// Move projectiles and resolve their hits.
pub fn move_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    geometry: Res<ArenaGeometry>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
    mut targets: Query<
        (Entity, &Transform, &Hitbox, &mut Health, Has<Deactivated>),
        Without<Projectile>,
    >,
    mut health_events: HealthEvents,
    mut impacts: EventWriter<ProjectileImpactEvent>,
) {
    let dt = time.delta_secs();
    if projectiles.is_empty() {
        return;
    }

    let bodies: Vec<Body> = targets
        .iter()
        .filter(|(.., deactivated)| !deactivated)
        .map(|(entity, transform, hitbox, ..)| hitbox.body(entity, transform.translation))
        .collect();

    // (projectile source, target, damage)
    let mut hits: Vec<(Option<Entity>, Entity, f32)> = Vec::new();

    for (entity, mut projectile, mut transform) in projectiles.iter_mut() {
        if projectile.spent {
            continue;
        }

        projectile.elapsed += dt;
        if projectile.expired(transform.translation) {
            projectile.spent = true;
            commands.entity(entity).despawn();
            continue;
        }

        let step = projectile.speed * dt;
        let direction = *transform.forward();
        let hit = cast_ray(
            geometry.0.as_ref(),
            &bodies,
            transform.translation,
            direction,
            step,
            projectile.hit_mask,
            projectile.source,
        );

        match hit {
            Some(hit) => {
                projectile.spent = true;
                transform.translation = hit.point;
                if let Some(target) = hit.entity {
                    hits.push((projectile.source, target, projectile.damage));
                }
                commands.entity(entity).despawn();
            }
            None => transform.translation += direction * step,
        }
    }

    for (source, target, damage) in hits {
        impacts.send(ProjectileImpactEvent { source, target });
        let Ok((_, _, _, mut health, _)) = targets.get_mut(target) else {
            continue;
        };
        if let Some(change) = health.apply_damage(damage) {
            health_events.damaged(target, source, damage, change);
        }
    }
}
