//! Race Definitions
//!
//! A race is an ordered list of sparse level tiers. Each tier names the XP
//! needed to reach that level and the abilities it unlocks. Levels without a
//! tier fall back to the race's XP curve and unlock nothing.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::abilities::AbilityDefinition;
use super::curve::Curve;
use super::DataError;

fn default_xp_curve() -> Curve {
    Curve::linear(1.0, 0.0, 4.0, 100.0)
}

/// Tier as written in races.ron (abilities by id).
#[derive(Clone, Debug, Deserialize)]
pub struct RaceTierConfig {
    pub level: u32,
    #[serde(default)]
    pub required_xp: f32,
    #[serde(default)]
    pub abilities: Vec<String>,
}

/// Race as written in races.ron.
#[derive(Clone, Debug, Deserialize)]
pub struct RaceConfig {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub lore: String,
    #[serde(default)]
    pub levels: Vec<RaceTierConfig>,
    #[serde(default = "default_xp_curve")]
    pub xp_curve: Curve,
}

/// Root structure for races.ron
#[derive(Debug, Deserialize)]
pub struct RacesConfig {
    pub races: Vec<RaceConfig>,
}

/// A resolved level tier.
#[derive(Clone, Debug)]
pub struct RaceLevelTier {
    pub level: u32,
    pub required_xp: f32,
    pub abilities: Vec<Arc<AbilityDefinition>>,
}

impl RaceLevelTier {
    pub fn new(level: u32, required_xp: f32, abilities: Vec<Arc<AbilityDefinition>>) -> Self {
        Self {
            level,
            required_xp: required_xp.max(0.0),
            abilities,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RaceDefinition {
    pub id: String,
    pub display_name: String,
    pub lore: String,
    levels: Vec<RaceLevelTier>,
    xp_curve: Curve,
}

impl RaceDefinition {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            lore: String::new(),
            levels: Vec::new(),
            xp_curve: default_xp_curve(),
        }
    }

    /// Resolve a config entry against the loaded abilities.
    pub fn from_config(
        config: RaceConfig,
        abilities: &HashMap<String, Arc<AbilityDefinition>>,
    ) -> Result<Self, DataError> {
        let mut levels = Vec::with_capacity(config.levels.len());
        for tier in config.levels {
            if tier.level == 0 {
                return Err(DataError::Invalid(format!(
                    "race '{}' has a tier at level 0 (levels start at 1)",
                    config.id
                )));
            }
            let resolved = tier
                .abilities
                .iter()
                .map(|id| {
                    abilities.get(id).cloned().ok_or_else(|| DataError::UnknownReference {
                        kind: "ability",
                        id: id.clone(),
                        owner: config.id.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            levels.push(RaceLevelTier::new(tier.level, tier.required_xp, resolved));
        }

        Ok(Self {
            id: config.id,
            display_name: config.display_name,
            lore: config.lore,
            levels,
            xp_curve: config.xp_curve,
        })
    }

    pub fn levels(&self) -> &[RaceLevelTier] {
        &self.levels
    }

    /// XP needed to advance into `target_level`. Exact tier match first,
    /// otherwise the XP curve.
    pub fn xp_to_reach_level(&self, target_level: u32) -> f32 {
        self.levels
            .iter()
            .find(|tier| tier.level == target_level)
            .map(|tier| tier.required_xp)
            .unwrap_or_else(|| self.xp_curve.evaluate(target_level as f32))
    }

    /// Abilities unlocked exactly at `level`.
    pub fn unlocked_abilities(&self, level: u32) -> &[Arc<AbilityDefinition>] {
        self.levels
            .iter()
            .find(|tier| tier.level == level)
            .map(|tier| tier.abilities.as_slice())
            .unwrap_or(&[])
    }

    /// Debug setter: replace tiers wholesale.
    pub fn set_debug_levels(&mut self, levels: Vec<RaceLevelTier>) {
        self.levels = levels;
    }

    /// Debug setter: replace the fallback XP curve.
    pub fn set_debug_xp_curve(&mut self, curve: Curve) {
        self.xp_curve = curve;
    }
}

/// Loaded races, looked up by id or display name.
#[derive(Resource, Clone, Debug, Default)]
pub struct RaceCatalog {
    races: Vec<Arc<RaceDefinition>>,
}

impl RaceCatalog {
    pub fn new(races: Vec<Arc<RaceDefinition>>) -> Self {
        Self { races }
    }

    pub fn races(&self) -> &[Arc<RaceDefinition>] {
        &self.races
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Arc<RaceDefinition>> {
        self.races.iter().find(|race| race.id == id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Arc<RaceDefinition>> {
        self.races.iter().find(|race| race.display_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::abilities::AbilityEffectType;

    fn ability(id: &str) -> Arc<AbilityDefinition> {
        Arc::new(AbilityDefinition::new(id, AbilityEffectType::Heal))
    }

    #[test]
    fn test_tier_lookup_is_exact_not_range() {
        let mut race = RaceDefinition::new("orc", "Orc");
        race.set_debug_levels(vec![
            RaceLevelTier::new(2, 50.0, vec![ability("bloodlust")]),
            RaceLevelTier::new(5, 400.0, vec![ability("warcry")]),
        ]);
        race.set_debug_xp_curve(Curve::linear(1.0, 0.0, 4.0, 150.0));

        assert_eq!(race.xp_to_reach_level(2), 50.0);
        assert_eq!(race.xp_to_reach_level(5), 400.0);
        // Level 3 has no tier: curve value, not the level-2 or level-5 tier
        assert!((race.xp_to_reach_level(3) - 100.0).abs() < 1e-3);

        assert_eq!(race.unlocked_abilities(2).len(), 1);
        assert!(race.unlocked_abilities(3).is_empty());
        assert!(race.unlocked_abilities(4).is_empty());
        assert_eq!(race.unlocked_abilities(5)[0].id, "warcry");
    }

    #[test]
    fn test_from_config_rejects_unknown_ability() {
        let config: RaceConfig = ron::from_str(
            r#"(id: "human", display_name: "Human", levels: [(level: 1, abilities: ["missing"])])"#,
        )
        .unwrap();
        let result = RaceDefinition::from_config(config, &HashMap::new());
        assert!(matches!(result, Err(DataError::UnknownReference { .. })));
    }

    #[test]
    fn test_catalog_lookup_by_id_and_name() {
        let catalog = RaceCatalog::new(vec![
            Arc::new(RaceDefinition::new("orc", "Orc")),
            Arc::new(RaceDefinition::new("night_elf", "Night Elf")),
        ]);
        assert_eq!(catalog.get_by_id("night_elf").map(|r| r.display_name.as_str()), Some("Night Elf"));
        assert_eq!(catalog.get_by_name("Orc").map(|r| r.id.as_str()), Some("orc"));
        assert!(catalog.get_by_id("undead").is_none());
    }
}
