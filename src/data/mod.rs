//! Authored game data
//!
//! Races, abilities, weapons, bot loadouts and the arena layout are read from
//! RON files under `assets/config/` at startup and are immutable afterwards.
//! Cross references (race -> ability, weapon -> projectile, profile -> race or
//! weapon) are resolved at load time into shared `Arc`s, so a dangling id is
//! a load error rather than a runtime surprise.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod abilities;
pub mod arena;
pub mod curve;
pub mod loadouts;
pub mod races;
pub mod weapons;

pub use abilities::{AbilitiesConfig, AbilityDefinition, AbilityEffectType, AbilityTargetType};
pub use arena::{ArenaConfig, BotTemplate, BrainSettings, MatchSettings, ObstacleConfig, TeamSpawnPoint};
pub use curve::{Curve, Keyframe};
pub use loadouts::{BotLoadoutSet, BotProfile, LoadoutsConfig};
pub use races::{RaceCatalog, RaceDefinition, RaceLevelTier, RacesConfig};
pub use weapons::{FireMode, ProjectileDefinition, WeaponCatalog, WeaponDefinition, WeaponsConfig};

/// Match side. Bots of `Team::None` never spawn; it is the "no winner" value.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[default]
    None,
    A,
    B,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
            Team::None => Team::None,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::None => write!(f, "None"),
            Team::A => write!(f, "Team A"),
            Team::B => write!(f, "Team B"),
        }
    }
}

/// Error type for loading authored data
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("Duplicate {kind} id: {id}")]
    Duplicate { kind: &'static str, id: String },
    #[error("Unknown {kind} '{id}' referenced by '{owner}'")]
    UnknownReference {
        kind: &'static str,
        id: String,
        owner: String,
    },
    #[error("Invalid data: {0}")]
    Invalid(String),
}

/// Everything loaded from the config directory.
#[derive(Clone, Debug, Default)]
pub struct GameData {
    pub abilities: HashMap<String, Arc<AbilityDefinition>>,
    pub races: RaceCatalog,
    pub weapons: WeaponCatalog,
    pub projectiles: HashMap<String, Arc<ProjectileDefinition>>,
    pub loadouts: BotLoadoutSet,
    pub arena: ArenaConfig,
}

impl GameData {
    /// Load and cross-validate `abilities.ron`, `races.ron`, `weapons.ron`,
    /// `loadouts.ron` and `arena.ron` from `dir`.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, DataError> {
        let dir = dir.as_ref();

        let abilities_config: AbilitiesConfig = read_ron(&dir.join("abilities.ron"))?;
        let races_config: RacesConfig = read_ron(&dir.join("races.ron"))?;
        let weapons_config: WeaponsConfig = read_ron(&dir.join("weapons.ron"))?;
        let loadouts_config: LoadoutsConfig = read_ron(&dir.join("loadouts.ron"))?;
        let arena: ArenaConfig = read_ron(&dir.join("arena.ron"))?;

        let data = Self::from_configs(
            abilities_config,
            races_config,
            weapons_config,
            loadouts_config,
            arena,
        )?;

        info!(
            "Loaded game data from {}: {} abilities, {} races, {} weapons, {} bot profiles",
            dir.display(),
            data.abilities.len(),
            data.races.races().len(),
            data.weapons.weapons().len(),
            data.loadouts.profiles().len()
        );
        Ok(data)
    }

    /// Resolve already-parsed configs. Reference order: abilities, races,
    /// projectiles, weapons, loadouts.
    pub fn from_configs(
        abilities_config: AbilitiesConfig,
        races_config: RacesConfig,
        weapons_config: WeaponsConfig,
        loadouts_config: LoadoutsConfig,
        arena: ArenaConfig,
    ) -> Result<Self, DataError> {
        let mut abilities = HashMap::new();
        for ability in abilities_config.abilities {
            if ability.cooldown_seconds < 0.0 {
                return Err(DataError::Invalid(format!(
                    "ability '{}' has a negative cooldown",
                    ability.id
                )));
            }
            let id = ability.id.clone();
            if abilities.insert(id.clone(), Arc::new(ability)).is_some() {
                return Err(DataError::Duplicate { kind: "ability", id });
            }
        }

        let mut races = Vec::new();
        for race in races_config.races {
            if races.iter().any(|r: &Arc<RaceDefinition>| r.id == race.id) {
                return Err(DataError::Duplicate {
                    kind: "race",
                    id: race.id,
                });
            }
            races.push(Arc::new(RaceDefinition::from_config(race, &abilities)?));
        }
        let races = RaceCatalog::new(races);

        let mut projectiles = HashMap::new();
        for projectile in weapons_config.projectiles {
            let id = projectile.id.clone();
            if projectiles.insert(id.clone(), Arc::new(projectile)).is_some() {
                return Err(DataError::Duplicate {
                    kind: "projectile",
                    id,
                });
            }
        }

        let mut weapons = Vec::new();
        for weapon in weapons_config.weapons {
            if weapons.iter().any(|w: &Arc<WeaponDefinition>| w.id == weapon.id) {
                return Err(DataError::Duplicate {
                    kind: "weapon",
                    id: weapon.id,
                });
            }
            weapons.push(Arc::new(WeaponDefinition::from_config(weapon, &projectiles)?));
        }
        let weapons = WeaponCatalog::new(weapons);

        let profiles = loadouts_config
            .profiles
            .into_iter()
            .map(|profile| BotProfile::from_config(profile, &races, &weapons).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        if arena.half_extent <= 0.0 {
            return Err(DataError::Invalid("arena half_extent must be positive".to_string()));
        }

        Ok(Self {
            abilities,
            races,
            weapons,
            projectiles,
            loadouts: BotLoadoutSet::new(profiles),
            arena,
        })
    }

    pub fn ability(&self, id: &str) -> Option<&Arc<AbilityDefinition>> {
        self.abilities.get(id)
    }
}

fn read_ron<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let contents = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
