//! Navigation
//!
//! Pathfinding is a black box to the bots: they ask which way to steer and
//! for random walkable points. `OpenFloor` is the built-in navigator for a
//! flat square arena with box obstacles; hosts with a real navmesh plug in
//! their own `Navigator`.

use bevy::math::bounding::RayCast3d;
use bevy::prelude::*;

use super::components::GameRng;
use super::world_query::ObstacleField;

pub trait Navigator: Send + Sync + 'static {
    /// Unit direction on the XZ plane to move along from `from` toward `to`.
    /// Zero when already there.
    fn steer(&self, from: Vec3, to: Vec3) -> Vec3;

    /// A walkable point within `radius` of `around`, if one is found.
    fn sample_position(&self, around: Vec3, radius: f32, rng: &mut GameRng) -> Option<Vec3>;
}

/// Resource wrapper for the active navigator.
#[derive(Resource)]
pub struct Navigation(pub Box<dyn Navigator>);

/// Lookahead used to detect an obstacle in the steering direction.
const STEER_LOOKAHEAD: f32 = 1.5;
/// Height of the steering probe above the floor.
const PROBE_HEIGHT: f32 = 0.5;
/// Candidate turns (degrees) tried when the direct line is blocked.
const DETOUR_ANGLES: [f32; 6] = [30.0, -30.0, 60.0, -60.0, 90.0, -90.0];

/// Square floor centered on the origin, with obstacles to walk around.
#[derive(Clone, Debug)]
pub struct OpenFloor {
    half_extent: f32,
    obstacles: ObstacleField,
}

impl OpenFloor {
    pub fn new(half_extent: f32, obstacles: ObstacleField) -> Self {
        Self {
            half_extent: half_extent.abs(),
            obstacles,
        }
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    fn in_bounds(&self, point: Vec3) -> bool {
        point.x.abs() <= self.half_extent && point.z.abs() <= self.half_extent
    }

    fn blocked(&self, from: Vec3, direction: Dir3) -> bool {
        let ray = RayCast3d::new(from + Vec3::Y * PROBE_HEIGHT, direction, STEER_LOOKAHEAD);
        self.obstacles
            .obstacles()
            .iter()
            .any(|aabb| ray.aabb_intersection_at(aabb).is_some())
    }
}

impl Navigator for OpenFloor {
    fn steer(&self, from: Vec3, to: Vec3) -> Vec3 {
        let flat = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
        let Ok(direct) = Dir3::new(flat) else {
            return Vec3::ZERO;
        };

        if !self.blocked(from, direct) {
            return *direct;
        }

        DETOUR_ANGLES
            .iter()
            .map(|angle| Quat::from_rotation_y(angle.to_radians()) * direct)
            .find(|candidate| !self.blocked(from, *candidate))
            .map(|candidate| *candidate)
            .unwrap_or(*direct)
    }

    fn sample_position(&self, around: Vec3, radius: f32, rng: &mut GameRng) -> Option<Vec3> {
        let mut point = rng.point_in_sphere(around, radius);
        point.y = 0.0;
        point.x = point.x.clamp(-self.half_extent, self.half_extent);
        point.z = point.z.clamp(-self.half_extent, self.half_extent);

        let probe = point + Vec3::Y * PROBE_HEIGHT;
        if !self.in_bounds(point) || self.obstacles.contains_point(probe) {
            return None;
        }
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steer_goes_straight_on_open_floor() {
        let floor = OpenFloor::new(20.0, ObstacleField::default());
        let dir = floor.steer(Vec3::ZERO, Vec3::new(10.0, 3.0, 0.0));
        assert!((dir - Vec3::X).length() < 1e-5);
        assert_eq!(floor.steer(Vec3::ONE, Vec3::ONE), Vec3::ZERO);
    }

    #[test]
    fn test_steer_detours_around_obstacle() {
        let wall = ObstacleField::new([(Vec3::new(1.0, 0.0, -0.5), Vec3::new(2.0, 2.0, 0.5))]);
        let floor = OpenFloor::new(20.0, wall);
        let dir = floor.steer(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        assert!(dir.x > 0.0);
        assert!(dir.z.abs() > 0.1);
        assert!((dir.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_samples_stay_on_floor_and_out_of_obstacles() {
        let block = ObstacleField::new([(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0))]);
        let floor = OpenFloor::new(5.0, block.clone());
        let mut rng = GameRng::from_seed(11);
        let mut found = 0;
        for _ in 0..200 {
            if let Some(point) = floor.sample_position(Vec3::new(4.0, 0.0, 4.0), 8.0, &mut rng) {
                found += 1;
                assert_eq!(point.y, 0.0);
                assert!(point.x.abs() <= 5.0 && point.z.abs() <= 5.0);
                assert!(!block.contains_point(point + Vec3::Y * 0.5));
            }
        }
        assert!(found > 0);
    }
}
