//! Achievements
//!
//! A fixed registry. Each achievement unlocks at most once and applies its
//! permanent effect exactly once per unlock.

use serde::Serialize;

use crate::sim::GameState;
use crate::tuning::ACHIEVEMENTS;

/// Permanent bonus granted on unlock
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AchievementEffect {
    SpeedFactor(f64),
    ScoreBonus(f64),
    ResetDivisor(f64),
    PowerBonus(f64),
    EpochFactor(f64),
    /// Exposes the debug console on the web build
    DevConsole,
    UnlockLauncher { layer: usize, index: usize },
}

impl AchievementEffect {
    pub fn apply(self, game: &mut GameState) {
        match self {
            AchievementEffect::SpeedFactor(f) => game.epoch.multipliers.speed *= f,
            AchievementEffect::ScoreBonus(b) => game.epoch.multipliers.score += b,
            AchievementEffect::ResetDivisor(d) => game.epoch.multipliers.reset /= d,
            AchievementEffect::PowerBonus(b) => game.epoch.multipliers.power += b,
            AchievementEffect::EpochFactor(f) => game.epoch.multipliers.epoch *= f,
            AchievementEffect::DevConsole => game.dev_console = true,
            AchievementEffect::UnlockLauncher { layer, index } => game.overlay.launchers.unlock(layer, index),
        }
    }
}

/// Static description of an achievement
#[derive(Debug)]
pub struct AchievementSpec {
    pub name: &'static str,
    /// Headline and flavour line
    pub description: [&'static str; 2],
    pub reward: &'static str,
    pub effect: AchievementEffect,
}

#[derive(Debug, Clone)]
pub struct Achievement {
    /// Position in the registry, stable across saves
    pub id: u8,
    pub spec: &'static AchievementSpec,
    unlocked: bool,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Flip to unlocked. Returns the effect to apply, or `None` if already unlocked.
    pub fn unlock(&mut self) -> Option<AchievementEffect> {
        if self.unlocked {
            return None;
        }
        self.unlocked = true;
        Some(self.spec.effect)
    }
}

#[derive(Debug, Clone)]
pub struct Achievements {
    all: Vec<Achievement>,
}

impl Default for Achievements {
    fn default() -> Self {
        Self::new()
    }
}

impl Achievements {
    pub fn new() -> Self {
        let all = ACHIEVEMENTS
            .iter()
            .enumerate()
            .map(|(i, spec)| Achievement {
                id: i as u8,
                spec,
                unlocked: false,
            })
            .collect();
        Self { all }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.all.iter()
    }

    pub fn get(&self, id: u8) -> Option<&Achievement> {
        self.all.get(id as usize)
    }

    pub fn by_name(&self, name: &str) -> Option<&Achievement> {
        self.all.iter().find(|a| a.spec.name == name)
    }

    pub fn is_unlocked(&self, name: &str) -> bool {
        self.by_name(name).is_some_and(Achievement::is_unlocked)
    }

    /// Unlock by name. Returns the id and effect on a fresh unlock.
    pub fn unlock(&mut self, name: &str) -> Option<(u8, AchievementEffect)> {
        let achievement = self.all.iter_mut().find(|a| a.spec.name == name)?;
        let id = achievement.id;
        achievement.unlock().map(|effect| (id, effect))
    }

    /// Unlock by registry id
    pub fn unlock_id(&mut self, id: u8) -> Option<AchievementEffect> {
        self.all.get_mut(id as usize)?.unlock()
    }

    pub fn unlocked_count(&self) -> usize {
        self.all.iter().filter(|a| a.unlocked).count()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
