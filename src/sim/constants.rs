//! Gameplay Constants
//!
//! Tuning values shared by several systems.

/// Eye height above a bot's feet, used for line-of-sight rays.
pub const EYE_HEIGHT: f32 = 1.6;

/// Height of the weapon muzzle above a bot's feet.
pub const MUZZLE_HEIGHT: f32 = 1.4;

/// Height of a bot's hit sphere center above its feet.
pub const BODY_CENTER_HEIGHT: f32 = 1.0;

/// Fixed length of the round-end phase in seconds.
pub const ROUND_END_DURATION: f32 = 3.0;

/// How long SpeedBoost and DamageBoost last.
pub const BOOST_DURATION: f32 = 5.0;

/// Delay between a bot dying and it being taken out of the world.
pub const DEATH_DEACTIVATION_DELAY: f32 = 2.0;

/// Radius around a bot in which patrol points are sampled.
pub const PATROL_RADIUS: f32 = 8.0;

/// Slerp factor per second when turning toward a target.
pub const TURN_RATE: f32 = 5.0;

/// A patrol destination closer than this counts as reached.
pub const ARRIVAL_DISTANCE: f32 = 0.5;

/// Bots heal themselves below this fraction of max health.
pub const HEAL_THRESHOLD: f32 = 0.5;

/// LOS range is the fire distance times this.
pub const VISION_RANGE_FACTOR: f32 = 1.5;
