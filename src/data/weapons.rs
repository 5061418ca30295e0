//! Weapon and Projectile Definitions
//!
//! Loaded from `assets/config/weapons.ron`. Timing values are clamped on
//! access so a bad config entry can never stall the weapon state machine.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::DataError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum FireMode {
    SemiAuto,
    Burst,
    #[default]
    FullAuto,
}

fn default_projectile_speed() -> f32 {
    50.0
}

fn default_projectile_lifetime() -> f32 {
    5.0
}

/// Travel parameters for projectile weapons.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ProjectileDefinition {
    pub id: String,
    #[serde(default = "default_projectile_speed")]
    pub speed: f32,
    #[serde(default = "default_projectile_lifetime")]
    pub lifetime: f32,
}

impl ProjectileDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            speed: default_projectile_speed(),
            lifetime: default_projectile_lifetime(),
        }
    }
}

/// Weapon entry as written in weapons.ron (projectile by id).
#[derive(Clone, Debug, Deserialize)]
pub struct WeaponConfig {
    pub id: String,
    pub display_name: String,
    #[serde(default = "default_damage")]
    pub damage: f32,
    #[serde(default = "default_fire_interval")]
    pub fire_interval: f32,
    #[serde(default = "default_magazine")]
    pub magazine_size: u32,
    #[serde(default = "default_reload")]
    pub reload_seconds: f32,
    #[serde(default)]
    pub fire_mode: FireMode,
    #[serde(default)]
    pub projectile: Option<String>,
    #[serde(default = "default_recoil")]
    pub recoil: f32,
    #[serde(default = "default_max_range")]
    pub max_range: f32,
}

fn default_damage() -> f32 {
    12.0
}
fn default_fire_interval() -> f32 {
    0.1
}
fn default_magazine() -> u32 {
    30
}
fn default_reload() -> f32 {
    2.2
}
fn default_recoil() -> f32 {
    1.0
}
fn default_max_range() -> f32 {
    120.0
}

/// Root structure for weapons.ron
#[derive(Debug, Deserialize)]
pub struct WeaponsConfig {
    #[serde(default)]
    pub projectiles: Vec<ProjectileDefinition>,
    pub weapons: Vec<WeaponConfig>,
}

#[derive(Clone, Debug)]
pub struct WeaponDefinition {
    pub id: String,
    pub display_name: String,
    damage: f32,
    fire_interval: f32,
    magazine_size: u32,
    reload_seconds: f32,
    fire_mode: FireMode,
    projectile: Option<Arc<ProjectileDefinition>>,
    recoil: f32,
    max_range: f32,
}

impl WeaponDefinition {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            damage: default_damage(),
            fire_interval: default_fire_interval(),
            magazine_size: default_magazine(),
            reload_seconds: default_reload(),
            fire_mode: FireMode::default(),
            projectile: None,
            recoil: default_recoil(),
            max_range: default_max_range(),
        }
    }

    pub fn from_config(
        config: WeaponConfig,
        projectiles: &HashMap<String, Arc<ProjectileDefinition>>,
    ) -> Result<Self, DataError> {
        let projectile = match &config.projectile {
            Some(id) => Some(projectiles.get(id).cloned().ok_or_else(|| {
                DataError::UnknownReference {
                    kind: "projectile",
                    id: id.clone(),
                    owner: config.id.clone(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            id: config.id,
            display_name: config.display_name,
            damage: config.damage,
            fire_interval: config.fire_interval,
            magazine_size: config.magazine_size,
            reload_seconds: config.reload_seconds,
            fire_mode: config.fire_mode,
            projectile,
            recoil: config.recoil,
            max_range: config.max_range,
        })
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_fire_interval(mut self, seconds: f32) -> Self {
        self.fire_interval = seconds;
        self
    }

    pub fn with_magazine_size(mut self, rounds: u32) -> Self {
        self.magazine_size = rounds;
        self
    }

    pub fn with_reload_seconds(mut self, seconds: f32) -> Self {
        self.reload_seconds = seconds;
        self
    }

    pub fn with_fire_mode(mut self, mode: FireMode) -> Self {
        self.fire_mode = mode;
        self
    }

    pub fn with_projectile(mut self, projectile: ProjectileDefinition) -> Self {
        self.projectile = Some(Arc::new(projectile));
        self
    }

    pub fn with_max_range(mut self, range: f32) -> Self {
        self.max_range = range;
        self
    }

    pub fn with_recoil(mut self, recoil: f32) -> Self {
        self.recoil = recoil;
        self
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }

    pub fn fire_interval(&self) -> f32 {
        self.fire_interval.max(0.01)
    }

    pub fn magazine_size(&self) -> u32 {
        self.magazine_size.max(1)
    }

    pub fn reload_seconds(&self) -> f32 {
        self.reload_seconds.max(0.1)
    }

    pub fn fire_mode(&self) -> FireMode {
        self.fire_mode
    }

    pub fn projectile(&self) -> Option<&ProjectileDefinition> {
        self.projectile.as_deref()
    }

    pub fn recoil(&self) -> f32 {
        self.recoil
    }

    pub fn max_range(&self) -> f32 {
        self.max_range.max(0.0)
    }
}

/// Loaded weapons, looked up by id or display name.
#[derive(Resource, Clone, Debug, Default)]
pub struct WeaponCatalog {
    weapons: Vec<Arc<WeaponDefinition>>,
}

impl WeaponCatalog {
    pub fn new(weapons: Vec<Arc<WeaponDefinition>>) -> Self {
        Self { weapons }
    }

    pub fn weapons(&self) -> &[Arc<WeaponDefinition>] {
        &self.weapons
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Arc<WeaponDefinition>> {
        self.weapons.iter().find(|weapon| weapon.id == id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Arc<WeaponDefinition>> {
        self.weapons.iter().find(|weapon| weapon.display_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_values_are_clamped() {
        let weapon = WeaponDefinition::new("broken", "Broken")
            .with_fire_interval(0.0)
            .with_magazine_size(0)
            .with_reload_seconds(-1.0);
        assert_eq!(weapon.fire_interval(), 0.01);
        assert_eq!(weapon.magazine_size(), 1);
        assert_eq!(weapon.reload_seconds(), 0.1);
    }

    #[test]
    fn test_config_defaults() {
        let config: WeaponConfig = ron::from_str(r#"(id: "ar", display_name: "Assault Rifle")"#).unwrap();
        let weapon = WeaponDefinition::from_config(config, &HashMap::new()).unwrap();
        assert_eq!(weapon.damage(), 12.0);
        assert_eq!(weapon.magazine_size(), 30);
        assert_eq!(weapon.max_range(), 120.0);
        assert_eq!(weapon.fire_mode(), FireMode::FullAuto);
        assert!(weapon.projectile().is_none());
    }

    #[test]
    fn test_unknown_projectile_is_rejected() {
        let config: WeaponConfig = ron::from_str(
            r#"(id: "rl", display_name: "Launcher", projectile: Some("rocket"))"#,
        )
        .unwrap();
        let result = WeaponDefinition::from_config(config, &HashMap::new());
        assert!(matches!(result, Err(DataError::UnknownReference { kind: "projectile", .. })));
    }
}
