//! Integration tests for the authored data in assets/config

use arenashooter::data::{
    AbilitiesConfig, AbilityEffectType, AbilityTargetType, ArenaConfig, DataError, FireMode,
    GameData, LoadoutsConfig, RacesConfig, Team, WeaponsConfig,
};
use arenashooter::sim::XpService;
use bevy::prelude::Entity;
use std::path::PathBuf;
use std::sync::Arc;

fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/config")
}

fn shipped() -> GameData {
    GameData::load_from_dir(config_dir()).unwrap()
}

fn parse<T: serde::de::DeserializeOwned>(text: &str) -> T {
    ron::from_str(text).unwrap()
}

// =============================================================================
// Shipped Data
// =============================================================================

#[test]
fn test_shipped_data_loads() {
    let data = shipped();
    assert_eq!(data.abilities.len(), 6);
    assert_eq!(data.races.races().len(), 2);
    assert_eq!(data.weapons.weapons().len(), 4);
    assert_eq!(data.loadouts.profiles().len(), 4);
    assert_eq!(data.arena.spawn_points.len(), 10);
    assert_eq!(data.arena.obstacles.len(), 4);

    let settings = data.arena.settings.as_ref().unwrap();
    assert_eq!(settings.warmup_duration, 15.0);
    assert_eq!(settings.rounds_to_win, 15);
    assert!(data.arena.bot_template.as_ref().unwrap().brain.is_some());
}

#[test]
fn test_shipped_references_resolve() {
    let data = shipped();

    let demolisher = data
        .loadouts
        .profiles()
        .iter()
        .find(|profile| profile.id == "orc_demolisher")
        .unwrap();
    assert_eq!(demolisher.preferred_team, Team::B);
    assert_eq!(demolisher.race.as_ref().unwrap().id, "orc");
    let launcher = demolisher.primary_weapon.as_ref().unwrap();
    assert_eq!(launcher.projectile().unwrap().speed, 35.0);
    assert_eq!(launcher.fire_mode(), FireMode::SemiAuto);

    let orc = data.races.get_by_id("orc").unwrap();
    assert_eq!(orc.unlocked_abilities(1)[0].effect_type, AbilityEffectType::DamageBoost);
    // Level 3 has no tier
    assert!(orc.unlocked_abilities(3).is_empty());
    assert_eq!(orc.unlocked_abilities(4)[0].id, "thick_hide");

    let second_wind = data.ability("second_wind").unwrap();
    assert_eq!(second_wind.target_type, AbilityTargetType::Caster);
    assert!((second_wind.scaled_value(4) - 40.0).abs() < 1e-3);

    let rifle = data.weapons.get_by_id("rifle").unwrap();
    assert!(rifle.projectile().is_none());
    assert_eq!(rifle.magazine_size(), 30);
}

#[test]
fn test_both_teams_have_profiles_and_spawn_points() {
    let data = shipped();
    for team in [Team::A, Team::B] {
        assert!(data.loadouts.profiles().iter().any(|p| p.preferred_team == team));
        assert_eq!(data.arena.spawn_points.iter().filter(|p| p.team == team).count(), 5);
    }
}

#[test]
fn test_human_level_two_at_sixty_xp() {
    let data = shipped();
    let human = Arc::clone(data.races.get_by_id("human").unwrap());
    assert_eq!(human.xp_to_reach_level(2), 50.0);
    assert_eq!(human.xp_to_reach_level(4), 150.0);

    let mut xp = XpService::default();
    let bot = Entity::from_raw(3);
    xp.register(bot, human);
    let update = xp.award_xp(bot, 60.0).unwrap();

    assert_eq!(update.levels_gained, 1);
    assert_eq!(update.progress.level, 2);
    assert_eq!(update.progress.current_xp, 10.0);
    assert_eq!(update.progress.xp_to_next, 100.0);
}

// =============================================================================
// Load Errors
// =============================================================================

#[test]
fn test_unknown_ability_in_race_is_rejected() {
    let result = GameData::from_configs(
        parse::<AbilitiesConfig>("(abilities: [])"),
        parse::<RacesConfig>(
            r#"(races: [(id: "elf", display_name: "Elf", levels: [(level: 1, abilities: ["moonfire"])])])"#,
        ),
        parse::<WeaponsConfig>("(weapons: [])"),
        parse::<LoadoutsConfig>("(profiles: [])"),
        ArenaConfig::default(),
    );
    match result {
        Err(DataError::UnknownReference { kind, id, owner }) => {
            assert_eq!(kind, "ability");
            assert_eq!(id, "moonfire");
            assert_eq!(owner, "elf");
        }
        other => panic!("expected unknown reference, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unknown_projectile_is_rejected() {
    let result = GameData::from_configs(
        parse::<AbilitiesConfig>("(abilities: [])"),
        parse::<RacesConfig>("(races: [])"),
        parse::<WeaponsConfig>(r#"(weapons: [(id: "bow", display_name: "Bow", projectile: Some("arrow"))])"#),
        parse::<LoadoutsConfig>("(profiles: [])"),
        ArenaConfig::default(),
    );
    assert!(matches!(result, Err(DataError::UnknownReference { kind: "projectile", .. })));
}

#[test]
fn test_duplicate_race_is_rejected() {
    let result = GameData::from_configs(
        parse::<AbilitiesConfig>("(abilities: [])"),
        parse::<RacesConfig>(
            r#"(races: [(id: "orc", display_name: "Orc"), (id: "orc", display_name: "Orc Again")])"#,
        ),
        parse::<WeaponsConfig>("(weapons: [])"),
        parse::<LoadoutsConfig>("(profiles: [])"),
        ArenaConfig::default(),
    );
    assert!(matches!(result, Err(DataError::Duplicate { kind: "race", .. })));
}

#[test]
fn test_missing_file_reports_path() {
    let empty = std::env::temp_dir().join("arenashooter_missing_config");
    let err = GameData::load_from_dir(&empty).err().unwrap();
    assert!(matches!(err, DataError::Io { .. }));
    assert!(err.to_string().contains("abilities.ron"));
}
