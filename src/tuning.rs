//! Game balance data
//!
//! Palettes, upgrade catalogs, launcher configs and the achievement table.
//! Order matters: achievement ids and save-file upgrade slots follow the
//! position in these tables.

use crate::format_number;
use crate::progression::{AchievementEffect, LauncherSpec, SpawnModifier, UpgradeSpec};
use crate::progression::achievement::AchievementSpec;
use crate::sim::RocketFlags;

/// Background plus ring colours (hex without `#`)
#[derive(Debug)]
pub struct Palette {
    pub background: &'static str,
    pub layers: &'static [&'static str],
}

pub static PLANET_PALETTES: [Palette; 4] = [
    Palette {
        background: "996",
        layers: &["ff9", "fd9", "fe9", "ff9", "ef9", "df9"],
    },
    Palette {
        background: "779",
        layers: &["99f", "9af", "9cf", "a9f", "c9f"],
    },
    Palette {
        background: "a66",
        layers: &["fa9", "f2a291", "fb9", "e89", "f9a", "fa9", "fc9"],
    },
    Palette {
        background: "5a7",
        layers: &["8f9", "80f690", "7e8", "6d7", "7e7"],
    },
];

// === Score upgrades ===

const SCORE_UPGRADE_COST: f64 = 100.0;

pub static SCORE_UPGRADES: [UpgradeSpec; 4] = [
    UpgradeSpec {
        name: "Power",
        label: "BUY",
        base_cost: SCORE_UPGRADE_COST,
        max_level: Some(100),
        apply: |planet, _| planet.rocket_power *= 1.1,
        next_cost: |cost, _, m| cost + cost / 6.0 * m,
        describe: |planet, _| {
            vec![
                "x1.1 rocket power".to_string(),
                format!("Current rocket power: {}", format_number(planet.rocket_power, 0)),
            ]
        },
    },
    UpgradeSpec {
        name: "Less Interval",
        label: "BUY",
        base_cost: SCORE_UPGRADE_COST,
        max_level: Some(60),
        apply: |planet, _| planet.rocket_interval *= 0.95,
        next_cost: |cost, _, m| cost + cost / 3.5 * m,
        describe: |planet, _| {
            vec![
                "Decreases the rocket interval by x0.95".to_string(),
                format!("Current rocket interval: {:.1}ms", planet.rocket_interval * 1000.0),
            ]
        },
    },
    UpgradeSpec {
        name: "Speed",
        label: "BUY",
        base_cost: SCORE_UPGRADE_COST,
        max_level: Some(100),
        apply: |planet, _| planet.rocket_speed = (planet.rocket_speed * 1.45).powf(1.01),
        next_cost: |cost, level, m| {
            // Every tenth level costs double
            let cost = if level % 10 == 9 { cost + cost * m } else { cost };
            cost + cost / 1.1 * m
        },
        describe: |planet, _| {
            vec![
                "x1.45 rocket speed (^1.01)".to_string(),
                format!("Current rocket speed: {}", format_number(planet.rocket_speed, 1)),
            ]
        },
    },
    UpgradeSpec {
        name: "Gravity",
        label: "BUY",
        base_cost: SCORE_UPGRADE_COST,
        max_level: Some(50),
        apply: |planet, _| planet.rocket_gravity += 0.2,
        next_cost: |cost, _, m| cost + cost / 3.0 * m,
        describe: |planet, _| {
            vec![
                "+0.2 rocket gravity per upgrade".to_string(),
                "to the planet. Grows geometrically!".to_string(),
                "Rockets will damage more if they are closer".to_string(),
                format!("Current rocket gravity: {:.1}", planet.rocket_gravity),
            ]
        },
    },
];

// === Epoch upgrades ===

fn double(cost: f64, _level: u32, _cost_multiplier: f64) -> f64 {
    cost * 2.0
}

pub static EPOCH_UPGRADES: [UpgradeSpec; 6] = [
    UpgradeSpec {
        name: "Power",
        label: "+1",
        base_cost: 1.0,
        max_level: None,
        apply: |_, epoch| epoch.multipliers.power += 1.0,
        next_cost: double,
        describe: |_, epoch| {
            vec![format!(
                "Increase the power multiplier by 1. Current power multiplier is {}",
                epoch.multipliers.power
            )]
        },
    },
    UpgradeSpec {
        name: "Score",
        label: "+1",
        base_cost: 1.0,
        max_level: None,
        apply: |_, epoch| epoch.multipliers.score += 1.0,
        next_cost: double,
        describe: |_, epoch| {
            vec![format!(
                "Increase score (income) multiplier by 1. Current score multiplier is {}",
                epoch.multipliers.score
            )]
        },
    },
    UpgradeSpec {
        name: "Cost",
        label: "x0.95",
        base_cost: 1.0,
        max_level: None,
        apply: |_, epoch| epoch.multipliers.cost *= 0.95,
        next_cost: double,
        describe: |_, epoch| {
            vec![format!(
                "Decrease all upgrade costs by 5% each upgrade. Current cost multiplier is {:.3}",
                epoch.multipliers.cost
            )]
        },
    },
    UpgradeSpec {
        name: "Time",
        label: "+0.1",
        base_cost: 1.0,
        max_level: None,
        apply: |_, epoch| epoch.multipliers.time += 0.1,
        next_cost: double,
        describe: |_, epoch| {
            vec![format!(
                "Speed up the time. Current time multiplier is {:.1}",
                epoch.multipliers.time
            )]
        },
    },
    UpgradeSpec {
        name: "Penetration",
        label: "+1%",
        base_cost: 1.0,
        max_level: None,
        apply: |_, epoch| epoch.penetration_chance += 0.01,
        next_cost: double,
        describe: |_, epoch| {
            vec![format!(
                "Increase the chance of a rocket penetrating the planet by 1%. Current penetration chance is {:.0}%",
                epoch.penetration_chance * 100.0
            )]
        },
    },
    UpgradeSpec {
        name: "Faster Reset",
        label: "x0.8",
        base_cost: 1.0,
        max_level: None,
        apply: |_, epoch| {
            epoch.multipliers.reset *= 0.8;
            epoch.multipliers.speed *= 1.1;
        },
        next_cost: double,
        describe: |_, epoch| {
            vec![format!(
                "Decrease planet's reset by 20% each upgrade. Current reset time is {:.0}ms. Also buffs rockets speed by x1.1",
                crate::consts::DEATH_TIME * epoch.multipliers.reset * 1000.0
            )]
        },
    },
];

// === Launchers ===

pub static LAUNCHER_LAYERS: [&[LauncherSpec]; 2] = [
    &[
        LauncherSpec {
            size: 12.5,
            damage: 1.25,
            speed: 1.0,
            gravity: 1.0,
            flags: RocketFlags::NONE,
            modifier: SpawnModifier::None,
            reload_time: 1.0,
            unlocked: true,
        },
        LauncherSpec {
            size: 12.5,
            damage: 0.6,
            speed: 2.0,
            gravity: 0.5,
            flags: RocketFlags::LONG,
            modifier: SpawnModifier::Penetration(4),
            reload_time: 4.0,
            unlocked: false,
        },
        LauncherSpec {
            size: 20.0,
            damage: 3.0,
            speed: 0.6,
            gravity: 1.0,
            flags: RocketFlags::HAMMER,
            modifier: SpawnModifier::None,
            reload_time: 8.0,
            unlocked: false,
        },
        LauncherSpec {
            size: 8.0,
            damage: 0.5,
            speed: 1.5,
            gravity: 1.0,
            flags: RocketFlags::SHARP,
            modifier: SpawnModifier::None,
            reload_time: 0.125,
            unlocked: false,
        },
        LauncherSpec {
            size: 60.0,
            damage: 90.0,
            speed: 0.2,
            gravity: 0.1,
            flags: RocketFlags::WHITE,
            modifier: SpawnModifier::None,
            reload_time: 90.0,
            unlocked: false,
        },
    ],
    // Elites
    &[
        LauncherSpec {
            size: 15.0,
            damage: 0.4,
            speed: 3.0,
            gravity: 1.0,
            flags: RocketFlags::LONGER,
            modifier: SpawnModifier::Penetration(8),
            reload_time: 12.0,
            unlocked: false,
        },
        LauncherSpec {
            size: 7.0,
            damage: 0.5,
            speed: 2.0,
            gravity: 1.0,
            flags: RocketFlags::TRIANGLE,
            modifier: SpawnModifier::Clones(24),
            reload_time: 5.0,
            unlocked: false,
        },
        LauncherSpec {
            size: 10.0,
            damage: 0.3,
            speed: 4.0,
            gravity: 1.0,
            flags: RocketFlags(RocketFlags::LONG.0 | RocketFlags::LONGER.0),
            modifier: SpawnModifier::Penetration(16),
            reload_time: 15.0,
            unlocked: false,
        },
    ],
];

// === Achievements ===

const fn rocket_unlock(name: &'static str, reach: &'static str, layer: usize, index: usize) -> AchievementSpec {
    AchievementSpec {
        name,
        description: [reach, ""],
        reward: "Unlock new rocket",
        effect: AchievementEffect::UnlockLauncher { layer, index },
    }
}

pub static ACHIEVEMENTS: [AchievementSpec; 13] = [
    AchievementSpec {
        name: "Level 10",
        description: ["Reach level 10", "Easy start"],
        reward: "+10% rockets speed",
        effect: AchievementEffect::SpeedFactor(1.1),
    },
    AchievementSpec {
        name: "One Million",
        description: ["Reach 1.000.000 score", ""],
        reward: "+10% score",
        effect: AchievementEffect::ScoreBonus(0.1),
    },
    AchievementSpec {
        name: "First Epoch",
        description: ["Get your first epoch", "Prestige at level 100+"],
        reward: "4x reset speed",
        effect: AchievementEffect::ResetDivisor(4.0),
    },
    AchievementSpec {
        name: "Level 1000",
        description: ["Reach level 1000", ""],
        reward: "+50% rockets power",
        effect: AchievementEffect::PowerBonus(0.5),
    },
    AchievementSpec {
        name: "Evolution",
        description: ["Reach 1.000.000 EP", ""],
        reward: "2x EP gain",
        effect: AchievementEffect::EpochFactor(2.0),
    },
    AchievementSpec {
        name: "The End",
        description: ["Reach level 10000", "At the end of the game"],
        reward: "`dev` variable unlocked in console",
        effect: AchievementEffect::DevConsole,
    },
    rocket_unlock("Rocket 2", "Reach level 3", 0, 1),
    rocket_unlock("Rocket 3", "Reach level 7", 0, 2),
    rocket_unlock("Rocket 4", "Reach level 15", 0, 3),
    rocket_unlock("Rocket 5", "Reach level 25", 0, 4),
    rocket_unlock("Rocket 6", "Reach level 40", 1, 0),
    rocket_unlock("Rocket 7", "Reach level 60", 1, 1),
    rocket_unlock("Rocket 8", "Reach level 80", 1, 2),
];

/// Levels that unlock an achievement once reached or passed
const LEVEL_MILESTONES: [(u32, &str); 10] = [
    (3, "Rocket 2"),
    (7, "Rocket 3"),
    (10, "Level 10"),
    (15, "Rocket 4"),
    (25, "Rocket 5"),
    (40, "Rocket 6"),
    (60, "Rocket 7"),
    (80, "Rocket 8"),
    (1000, "Level 1000"),
    (10_000, "The End"),
];

/// Achievements for every milestone in `(from, to]`. A level step above one
/// can jump over a milestone, so ranges are matched rather than single levels.
pub fn level_achievements(from: u32, to: u32) -> impl Iterator<Item = &'static str> {
    LEVEL_MILESTONES
        .iter()
        .filter(move |(at, _)| from < *at && *at <= to)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestones_name_real_achievements() {
        for (_, name) in LEVEL_MILESTONES {
            assert!(ACHIEVEMENTS.iter().any(|a| a.name == name), "{name}");
        }
    }

    #[test]
    fn test_level_achievement_lookup() {
        assert_eq!(level_achievements(9, 10).collect::<Vec<_>>(), vec!["Level 10"]);
        assert_eq!(level_achievements(79, 80).collect::<Vec<_>>(), vec!["Rocket 8"]);
        assert_eq!(level_achievements(10, 11).count(), 0);
    }

    #[test]
    fn test_level_jump_crosses_milestones() {
        assert_eq!(level_achievements(9, 11).collect::<Vec<_>>(), vec!["Level 10"]);
        assert_eq!(level_achievements(2, 4).collect::<Vec<_>>(), vec!["Rocket 2"]);
        assert_eq!(
            level_achievements(1, 16).collect::<Vec<_>>(),
            vec!["Rocket 2", "Rocket 3", "Level 10", "Rocket 4"]
        );
    }

    #[test]
    fn test_launcher_unlock_targets_exist() {
        for spec in &ACHIEVEMENTS {
            if let AchievementEffect::UnlockLauncher { layer, index } = spec.effect {
                assert!(LAUNCHER_LAYERS.get(layer).and_then(|l| l.get(index)).is_some());
            }
        }
    }

    #[test]
    fn test_palettes_have_layers() {
        assert!(PLANET_PALETTES.iter().all(|p| !p.layers.is_empty()));
    }
}
