//! Bot Profiles and Loadout Sets
//!
//! A profile bundles a race and weapons for one kind of bot. The roster draws
//! profiles for each team from the loadout set, weighted by profile weight.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;

use super::races::{RaceCatalog, RaceDefinition};
use super::weapons::{WeaponCatalog, WeaponDefinition};
use super::{DataError, Team};

fn default_weight() -> f32 {
    1.0
}

/// Profile as written in loadouts.ron (race and weapons by id).
#[derive(Clone, Debug, Deserialize)]
pub struct BotProfileConfig {
    pub id: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub primary_weapon: Option<String>,
    #[serde(default)]
    pub secondary_weapon: Option<String>,
    #[serde(default = "default_preferred_team")]
    pub preferred_team: Team,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_display_name() -> String {
    "Bot".to_string()
}

fn default_preferred_team() -> Team {
    Team::A
}

/// Root structure for loadouts.ron
#[derive(Debug, Deserialize)]
pub struct LoadoutsConfig {
    pub profiles: Vec<BotProfileConfig>,
}

#[derive(Clone, Debug)]
pub struct BotProfile {
    pub id: String,
    pub display_name: String,
    pub race: Option<Arc<RaceDefinition>>,
    pub primary_weapon: Option<Arc<WeaponDefinition>>,
    pub secondary_weapon: Option<Arc<WeaponDefinition>>,
    pub preferred_team: Team,
    pub weight: f32,
}

impl BotProfile {
    pub fn new(id: impl Into<String>, preferred_team: Team) -> Self {
        Self {
            id: id.into(),
            display_name: default_display_name(),
            race: None,
            primary_weapon: None,
            secondary_weapon: None,
            preferred_team,
            weight: default_weight(),
        }
    }

    pub fn from_config(
        config: BotProfileConfig,
        races: &RaceCatalog,
        weapons: &WeaponCatalog,
    ) -> Result<Self, DataError> {
        let unknown = |kind: &'static str, id: &str| DataError::UnknownReference {
            kind,
            id: id.to_string(),
            owner: config.id.clone(),
        };

        let race = match &config.race {
            Some(id) => Some(races.get_by_id(id).cloned().ok_or_else(|| unknown("race", id))?),
            None => None,
        };
        let primary_weapon = match &config.primary_weapon {
            Some(id) => Some(weapons.get_by_id(id).cloned().ok_or_else(|| unknown("weapon", id))?),
            None => None,
        };
        let secondary_weapon = match &config.secondary_weapon {
            Some(id) => Some(weapons.get_by_id(id).cloned().ok_or_else(|| unknown("weapon", id))?),
            None => None,
        };

        Ok(Self {
            id: config.id,
            display_name: config.display_name,
            race,
            primary_weapon,
            secondary_weapon,
            preferred_team: config.preferred_team,
            weight: config.weight.max(0.0),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct BotLoadoutSet {
    profiles: Vec<Arc<BotProfile>>,
}

impl BotLoadoutSet {
    pub fn new(profiles: Vec<Arc<BotProfile>>) -> Self {
        Self { profiles }
    }

    pub fn profiles(&self) -> &[Arc<BotProfile>] {
        &self.profiles
    }

    /// Pick a profile for `team`. `Team::None` accepts any profile.
    ///
    /// Weighted by profile weight; falls back to a uniform pick when every
    /// candidate has zero weight.
    pub fn random_profile<R: Rng + ?Sized>(&self, team: Team, rng: &mut R) -> Option<Arc<BotProfile>> {
        let candidates: Vec<&Arc<BotProfile>> = self
            .profiles
            .iter()
            .filter(|profile| team == Team::None || profile.preferred_team == team)
            .collect();

        if candidates.is_empty() {
            return None;
        }

        match candidates.choose_weighted(rng, |profile| profile.weight) {
            Ok(profile) => Some(Arc::clone(profile)),
            Err(_) => candidates.choose(rng).map(|profile| Arc::clone(profile)),
        }
    }
}
