//! Shared components and resources
//!
//! Bot identity, body and movement components plus the simulation RNG.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::constants::BODY_CENTER_HEIGHT;
use super::world_query::{Body, LayerMask};

/// Identity of a spawned bot.
#[derive(Component, Clone, Debug)]
pub struct Bot {
    pub profile_id: String,
    pub display_name: String,
}

/// Hit sphere used by ray and projectile queries.
#[derive(Component, Clone, Copy, Debug)]
pub struct Hitbox {
    pub radius: f32,
}

impl Hitbox {
    /// Query body for a character standing at `feet`.
    pub fn body(&self, entity: Entity, feet: Vec3) -> Body {
        Body {
            entity,
            center: feet + Vec3::Y * BODY_CENTER_HEIGHT,
            radius: self.radius,
            layer: LayerMask::BOTS,
        }
    }
}

/// Marker for bots taken out of the world after death. They keep their
/// components but no longer collide, move or count as alive.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Deactivated;

/// Movement input for a character. Input is a world-space direction on the
/// XZ plane whose length is clamped to 1.
#[derive(Component, Clone, Debug)]
pub struct Motor {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    move_input: Vec3,
    sprinting: bool,
    /// Added to the base speed while a SpeedBoost is active
    pub speed_bonus: f32,
}

impl Default for Motor {
    fn default() -> Self {
        Self::new(4.5, 6.5)
    }
}

impl Motor {
    pub fn new(walk_speed: f32, sprint_speed: f32) -> Self {
        Self {
            walk_speed: walk_speed.max(0.0),
            sprint_speed: sprint_speed.max(0.0),
            move_input: Vec3::ZERO,
            sprinting: false,
            speed_bonus: 0.0,
        }
    }

    pub fn set_move_input(&mut self, direction: Vec3, sprint: bool) {
        let flat = Vec3::new(direction.x, 0.0, direction.z);
        self.move_input = flat.clamp_length_max(1.0);
        self.sprinting = sprint;
    }

    pub fn halt(&mut self) {
        self.move_input = Vec3::ZERO;
        self.sprinting = false;
    }

    pub fn move_input(&self) -> Vec3 {
        self.move_input
    }

    pub fn is_moving(&self) -> bool {
        self.move_input.length_squared() > 0.0
    }

    pub fn speed(&self) -> f32 {
        let base = if self.sprinting {
            self.sprint_speed
        } else {
            self.walk_speed
        };
        (base + self.speed_bonus).max(0.0)
    }

    pub fn velocity(&self) -> Vec3 {
        self.move_input * self.speed()
    }
}

/// Shared RNG for spawning, wandering and weighted picks. Two simulations
/// built with the same seed play out identically.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// `None` when seeded from entropy
    pub seed: Option<u64>,
}

impl GameRng {
    /// Reproducible generator.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Uniform in `[0, 1)`.
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// Uniform point inside a sphere of `radius` around `center`
    pub fn point_in_sphere(&mut self, center: Vec3, radius: f32) -> Vec3 {
        loop {
            let candidate = Vec3::new(
                self.random_range(-1.0, 1.0),
                self.random_range(-1.0, 1.0),
                self.random_range(-1.0, 1.0),
            );
            if candidate.length_squared() <= 1.0 {
                return center + candidate * radius;
            }
        }
    }

    /// Access the underlying generator for `rand` APIs
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motor_clamps_and_flattens_input() {
        let mut motor = Motor::new(4.0, 6.0);
        motor.set_move_input(Vec3::new(3.0, 5.0, 4.0), false);
        let input = motor.move_input();
        assert_eq!(input.y, 0.0);
        assert!((input.length() - 1.0).abs() < 1e-5);
        assert!((motor.velocity().length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_motor_speed_bonus_and_sprint() {
        let mut motor = Motor::new(4.0, 6.0);
        motor.set_move_input(Vec3::X, true);
        motor.speed_bonus = 2.0;
        assert_eq!(motor.speed(), 8.0);
        motor.halt();
        assert!(!motor.is_moving());
        assert_eq!(motor.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = GameRng::from_seed(42);
        let mut b = GameRng::from_seed(42);
        for _ in 0..10 {
            assert_eq!(a.random_f32(), b.random_f32());
        }
        assert_eq!(a.seed, Some(42));
    }

    #[test]
    fn test_point_in_sphere_stays_inside() {
        let mut rng = GameRng::from_seed(5);
        let center = Vec3::new(3.0, 0.0, -2.0);
        for _ in 0..100 {
            assert!(rng.point_in_sphere(center, 8.0).distance(center) <= 8.0 + 1e-4);
        }
    }
}
