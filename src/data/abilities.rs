//! Data-Driven Ability Definitions
//!
//! Abilities are authored in `assets/config/abilities.ron` and are immutable
//! once loaded. Races reference them by id from their level tiers.

use serde::Deserialize;

use super::curve::Curve;

/// Who an ability is aimed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum AbilityTargetType {
    #[default]
    Passive,
    #[serde(rename = "Self")]
    Caster,
    Enemy,
    Ally,
    GroundArea,
}

/// What an ability does when it resolves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum AbilityEffectType {
    /// Applied once when the ability unlocks, no runtime effect
    #[default]
    Passive,
    Heal,
    SpeedBoost,
    DamageBoost,
}

fn default_cooldown() -> f32 {
    10.0
}

fn default_scaling_curve() -> Option<Curve> {
    Some(Curve::linear(1.0, 0.0, 4.0, 1.0))
}

/// Authored ability record.
#[derive(Clone, Debug, Deserialize)]
pub struct AbilityDefinition {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_type: AbilityTargetType,
    #[serde(default)]
    pub effect_type: AbilityEffectType,
    /// Seconds before the slot can be activated again
    #[serde(default = "default_cooldown")]
    pub cooldown_seconds: f32,
    /// Base magnitude before level scaling
    #[serde(default)]
    pub base_value: f32,
    /// Added to `base_value`, sampled at the unlock level
    #[serde(default = "default_scaling_curve")]
    pub scaling_curve: Option<Curve>,
}

impl AbilityDefinition {
    pub fn new(id: impl Into<String>, effect_type: AbilityEffectType) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            description: String::new(),
            target_type: AbilityTargetType::Caster,
            effect_type,
            cooldown_seconds: default_cooldown(),
            base_value: 0.0,
            scaling_curve: default_scaling_curve(),
        }
    }

    pub fn with_target(mut self, target_type: AbilityTargetType) -> Self {
        self.target_type = target_type;
        self
    }

    pub fn with_cooldown(mut self, seconds: f32) -> Self {
        self.cooldown_seconds = seconds.max(0.0);
        self
    }

    pub fn with_base_value(mut self, value: f32) -> Self {
        self.base_value = value;
        self
    }

    pub fn with_scaling_curve(mut self, curve: Option<Curve>) -> Self {
        self.scaling_curve = curve;
        self
    }

    /// Effect magnitude for an ability unlocked at `level`.
    pub fn scaled_value(&self, level: u32) -> f32 {
        match &self.scaling_curve {
            Some(curve) => self.base_value + curve.evaluate(level.max(1) as f32),
            None => self.base_value,
        }
    }

    pub fn is_passive(&self) -> bool {
        self.effect_type == AbilityEffectType::Passive
    }
}

/// Root structure for abilities.ron
#[derive(Debug, Deserialize)]
pub struct AbilitiesConfig {
    pub abilities: Vec<AbilityDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_value_uses_default_curve() {
        let ability = AbilityDefinition::new("rally", AbilityEffectType::Heal).with_base_value(20.0);
        // Default curve goes 0 -> 1 between levels 1 and 4
        assert!((ability.scaled_value(1) - 20.0).abs() < 1e-4);
        assert!((ability.scaled_value(4) - 21.0).abs() < 1e-4);
        assert!((ability.scaled_value(9) - 21.0).abs() < 1e-4);
    }

    #[test]
    fn test_scaled_value_treats_level_zero_as_one() {
        let ability = AbilityDefinition::new("sprint", AbilityEffectType::SpeedBoost)
            .with_base_value(2.0)
            .with_scaling_curve(Some(Curve::linear(1.0, 5.0, 3.0, 9.0)));
        assert_eq!(ability.scaled_value(0), ability.scaled_value(1));
        assert!((ability.scaled_value(1) - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_curve_returns_base_value() {
        let ability = AbilityDefinition::new("hide", AbilityEffectType::Passive)
            .with_base_value(15.0)
            .with_scaling_curve(None);
        assert_eq!(ability.scaled_value(3), 15.0);
    }

    #[test]
    fn test_ability_defaults_from_ron() {
        let ability: AbilityDefinition = ron::from_str(
            r#"(id: "second_wind", display_name: "Second Wind", effect_type: Heal, base_value: 30.0)"#,
        )
        .unwrap();
        assert_eq!(ability.cooldown_seconds, 10.0);
        assert_eq!(ability.target_type, AbilityTargetType::Passive);
        assert!(ability.scaling_curve.is_some());
    }
}
