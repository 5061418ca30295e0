//! Arena Layout and Match Settings
//!
//! Everything the match needs that is not a race, ability, weapon or
//! loadout: round timings, the bot template, team spawn points and the
//! static obstacles bots have to see around.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::Team;

/// Round flow and bot spawning parameters.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSettings {
    #[serde(default = "default_warmup")]
    pub warmup_duration: f32,
    #[serde(default = "default_round")]
    pub round_duration: f32,
    #[serde(default = "default_intermission")]
    pub intermission_duration: f32,
    #[serde(default = "default_rounds_to_win")]
    pub rounds_to_win: u32,
    #[serde(default = "default_bots_per_team")]
    pub bots_per_team: u32,
    #[serde(default = "default_true")]
    pub fill_with_bots: bool,
    /// XP awarded to the bot that lands a killing blow
    #[serde(default = "default_xp_per_kill")]
    pub xp_per_kill: f32,
}

fn default_warmup() -> f32 {
    15.0
}
fn default_round() -> f32 {
    180.0
}
fn default_intermission() -> f32 {
    10.0
}
fn default_rounds_to_win() -> u32 {
    15
}
fn default_bots_per_team() -> u32 {
    5
}
fn default_true() -> bool {
    true
}
fn default_xp_per_kill() -> f32 {
    50.0
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            warmup_duration: default_warmup(),
            round_duration: default_round(),
            intermission_duration: default_intermission(),
            rounds_to_win: default_rounds_to_win(),
            bots_per_team: default_bots_per_team(),
            fill_with_bots: default_true(),
            xp_per_kill: default_xp_per_kill(),
        }
    }
}

/// Decision loop tuning carried by the bot template.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct BrainSettings {
    #[serde(default = "default_engage_distance")]
    pub preferred_engage_distance: f32,
    #[serde(default = "default_fire_distance")]
    pub fire_distance: f32,
    #[serde(default = "default_vision_interval")]
    pub vision_interval: f32,
}

fn default_engage_distance() -> f32 {
    18.0
}
fn default_fire_distance() -> f32 {
    22.0
}
fn default_vision_interval() -> f32 {
    0.3
}

impl Default for BrainSettings {
    fn default() -> Self {
        Self {
            preferred_engage_distance: default_engage_distance(),
            fire_distance: default_fire_distance(),
            vision_interval: default_vision_interval(),
        }
    }
}

/// Shared body for every spawned bot.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BotTemplate {
    #[serde(default = "default_max_health")]
    pub max_health: f32,
    #[serde(default)]
    pub max_shield: f32,
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f32,
    #[serde(default = "default_sprint_speed")]
    pub sprint_speed: f32,
    #[serde(default = "default_hit_radius")]
    pub hit_radius: f32,
    /// A template without brain settings cannot drive a bot
    #[serde(default)]
    pub brain: Option<BrainSettings>,
}

fn default_max_health() -> f32 {
    100.0
}
fn default_walk_speed() -> f32 {
    4.5
}
fn default_sprint_speed() -> f32 {
    6.5
}
fn default_hit_radius() -> f32 {
    0.8
}

impl Default for BotTemplate {
    fn default() -> Self {
        Self {
            max_health: default_max_health(),
            max_shield: 0.0,
            walk_speed: default_walk_speed(),
            sprint_speed: default_sprint_speed(),
            hit_radius: default_hit_radius(),
            brain: Some(BrainSettings::default()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct TeamSpawnPoint {
    pub team: Team,
    pub position: [f32; 3],
    /// Degrees around +Y
    #[serde(default)]
    pub yaw: f32,
}

impl TeamSpawnPoint {
    pub fn new(team: Team, position: Vec3) -> Self {
        Self {
            team,
            position: position.to_array(),
            yaw: 0.0,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(Vec3::from_array(self.position))
            .with_rotation(Quat::from_rotation_y(self.yaw.to_radians()))
    }
}

/// Axis-aligned static obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct ObstacleConfig {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl ObstacleConfig {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max).to_array(),
            max: max.max(min).to_array(),
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::from_array(self.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::from_array(self.max)
    }
}

fn default_half_extent() -> f32 {
    40.0
}

/// Root structure for arena.ron
#[derive(Clone, Debug, Deserialize)]
pub struct ArenaConfig {
    #[serde(default)]
    pub settings: Option<MatchSettings>,
    #[serde(default)]
    pub bot_template: Option<BotTemplate>,
    #[serde(default)]
    pub spawn_points: Vec<TeamSpawnPoint>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
    /// Walkable floor is the square [-half_extent, half_extent] on X and Z
    #[serde(default = "default_half_extent")]
    pub half_extent: f32,
    /// Where bots spawn when their team has no spawn points
    #[serde(default)]
    pub roster_origin: [f32; 3],
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            settings: Some(MatchSettings::default()),
            bot_template: Some(BotTemplate::default()),
            spawn_points: Vec::new(),
            obstacles: Vec::new(),
            half_extent: default_half_extent(),
            roster_origin: [0.0; 3],
        }
    }
}
