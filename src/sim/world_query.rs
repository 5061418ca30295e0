//! World Queries
//!
//! Ray queries against static arena geometry and bot hit spheres. The
//! static side sits behind the `WorldGeometry` trait so a host can supply
//! its own physics; the default is a field of axis-aligned boxes.
//! Projectiles are triggers and never block a ray.

use bevy::math::bounding::{Aabb3d, BoundingSphere, RayCast3d};
use bevy::math::Vec3A;
use bevy::prelude::*;

/// Collision layers as a bit mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const WORLD: LayerMask = LayerMask(1 << 0);
    pub const BOTS: LayerMask = LayerMask(1 << 1);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn contains(self, layer: LayerMask) -> bool {
        self.0 & layer.0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    /// None when static geometry was hit
    pub entity: Option<Entity>,
}

/// Static collision provided by the host.
pub trait WorldGeometry: Send + Sync + 'static {
    /// Nearest static hit along a normalized direction.
    fn raycast(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<RayHit>;
}

/// Boxes standing on an open floor.
#[derive(Clone, Debug, Default)]
pub struct ObstacleField {
    obstacles: Vec<Aabb3d>,
}

impl ObstacleField {
    pub fn new(obstacles: impl IntoIterator<Item = (Vec3, Vec3)>) -> Self {
        Self {
            obstacles: obstacles
                .into_iter()
                .map(|(min, max)| {
                    let center = (min + max) * 0.5;
                    let half_size = (max - min).abs() * 0.5;
                    Aabb3d::new(center, half_size)
                })
                .collect(),
        }
    }

    pub fn obstacles(&self) -> &[Aabb3d] {
        &self.obstacles
    }

    /// True if `point` is inside any obstacle.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let point = Vec3A::from(point);
        self.obstacles
            .iter()
            .any(|aabb| point.cmpge(aabb.min).all() && point.cmple(aabb.max).all())
    }
}

impl WorldGeometry for ObstacleField {
    fn raycast(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<RayHit> {
        let ray = RayCast3d::new(origin, direction, max_distance);
        self.obstacles
            .iter()
            .filter_map(|aabb| ray.aabb_intersection_at(aabb))
            .min_by(|a, b| a.total_cmp(b))
            .map(|distance| RayHit {
                distance,
                point: origin + direction * distance,
                entity: None,
            })
    }
}

/// Static geometry the simulation raycasts against.
#[derive(Resource)]
pub struct ArenaGeometry(pub Box<dyn WorldGeometry>);

impl Default for ArenaGeometry {
    fn default() -> Self {
        Self(Box::new(ObstacleField::default()))
    }
}

/// Snapshot of a hittable body for the current tick.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub entity: Entity,
    pub center: Vec3,
    pub radius: f32,
    pub layer: LayerMask,
}

/// Nearest hit against geometry and bodies in `mask`, skipping `ignore`.
///
/// Returns None for a zero direction or non-positive range.
pub fn cast_ray(
    geometry: &dyn WorldGeometry,
    bodies: &[Body],
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    mask: LayerMask,
    ignore: Option<Entity>,
) -> Option<RayHit> {
    if max_distance <= 0.0 {
        return None;
    }
    let direction = Dir3::new(direction).ok()?;

    let world_hit = if mask.contains(LayerMask::WORLD) {
        geometry.raycast(origin, direction, max_distance)
    } else {
        None
    };

    let ray = RayCast3d::new(origin, direction, max_distance);
    let body_hit = bodies
        .iter()
        .filter(|body| mask.contains(body.layer) && Some(body.entity) != ignore)
        .filter_map(|body| {
            ray.sphere_intersection_at(&BoundingSphere::new(body.center, body.radius))
                .map(|distance| RayHit {
                    distance,
                    point: origin + direction * distance,
                    entity: Some(body.entity),
                })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance));

    match (world_hit, body_hit) {
        (Some(world), Some(body)) => Some(if body.distance < world.distance { body } else { world }),
        (hit, None) | (None, hit) => hit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(index: u32, center: Vec3) -> Body {
        Body {
            entity: Entity::from_raw(index),
            center,
            radius: 0.8,
            layer: LayerMask::BOTS,
        }
    }

    #[test]
    fn test_ray_hits_nearest_body() {
        let bodies = [body(1, Vec3::new(0.0, 0.0, -10.0)), body(2, Vec3::new(0.0, 0.0, -5.0))];
        let hit = cast_ray(&ObstacleField::default(), &bodies, Vec3::ZERO, Vec3::NEG_Z, 50.0, LayerMask::ALL, None)
            .unwrap();
        assert_eq!(hit.entity, Some(Entity::from_raw(2)));
        assert!((hit.distance - 4.2).abs() < 1e-3);
    }

    #[test]
    fn test_wall_blocks_body_behind_it() {
        let wall = ObstacleField::new([(Vec3::new(-2.0, -2.0, -6.0), Vec3::new(2.0, 2.0, -5.0))]);
        let bodies = [body(1, Vec3::new(0.0, 0.0, -10.0))];
        let hit = cast_ray(&wall, &bodies, Vec3::ZERO, Vec3::NEG_Z, 50.0, LayerMask::ALL, None).unwrap();
        assert_eq!(hit.entity, None);
        assert!((hit.distance - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_mask_and_ignore_filter_bodies() {
        let bodies = [body(1, Vec3::ZERO), body(2, Vec3::new(0.0, 0.0, -5.0))];
        // The shooter stands inside its own sphere
        let hit = cast_ray(
            &ObstacleField::default(),
            &bodies,
            Vec3::ZERO,
            Vec3::NEG_Z,
            50.0,
            LayerMask::ALL,
            Some(Entity::from_raw(1)),
        )
        .unwrap();
        assert_eq!(hit.entity, Some(Entity::from_raw(2)));

        let none = cast_ray(&ObstacleField::default(), &bodies, Vec3::ZERO, Vec3::NEG_Z, 50.0, LayerMask::WORLD, None);
        assert!(none.is_none());
    }

    #[test]
    fn test_range_limit_and_degenerate_direction() {
        let bodies = [body(1, Vec3::new(0.0, 0.0, -30.0))];
        assert!(cast_ray(&ObstacleField::default(), &bodies, Vec3::ZERO, Vec3::NEG_Z, 10.0, LayerMask::ALL, None).is_none());
        assert!(cast_ray(&ObstacleField::default(), &bodies, Vec3::ZERO, Vec3::ZERO, 50.0, LayerMask::ALL, None).is_none());
    }

    #[test]
    fn test_contains_point() {
        let field = ObstacleField::new([(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 3.0, 1.0))]);
        assert!(field.contains_point(Vec3::new(0.0, 1.0, 0.0)));
        assert!(!field.contains_point(Vec3::new(2.0, 1.0, 0.0)));
    }
}
