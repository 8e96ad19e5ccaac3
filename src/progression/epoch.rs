//! Epochs: the prestige loop
//!
//! Ending an epoch converts the current level into epoch points and restarts
//! the run. Points buy permanent multipliers.

use serde::{Deserialize, Serialize};

use super::challenge::{Challenge, ChallengeKind};
use crate::consts::EPOCH_LEVEL;

/// Permanent run modifiers. Everything starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub power: f64,
    pub cost: f64,
    pub score: f64,
    pub time: f64,
    pub reset: f64,
    pub speed: f64,
    pub epoch: f64,
    pub level: f64,
    pub interval: f64,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            power: 1.0,
            cost: 1.0,
            score: 1.0,
            time: 1.0,
            reset: 1.0,
            speed: 1.0,
            epoch: 1.0,
            level: 1.0,
            interval: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Epoch {
    pub multipliers: Multipliers,
    /// Chance per impact that a rocket keeps going
    pub penetration_chance: f64,
    pub points: f64,
    /// Epochs ended so far
    pub count: u32,
    pub challenges: Vec<Challenge>,
    /// Index into `challenges` of the running challenge
    pub current_challenge: Option<usize>,
}

impl Default for Epoch {
    fn default() -> Self {
        Self::new()
    }
}

impl Epoch {
    pub fn new() -> Self {
        Self {
            multipliers: Multipliers::default(),
            penetration_chance: 0.0,
            points: 0.0,
            count: 0,
            challenges: ChallengeKind::ALL.iter().map(|&k| Challenge::new(k)).collect(),
            current_challenge: None,
        }
    }

    /// Epoch points an epoch ended at `level` would award
    pub fn calculate_points(&self, level: u32) -> f64 {
        let level = level as f64;
        ((level / EPOCH_LEVEL).powf(2.0 + level / 1000.0) * self.multipliers.epoch).round()
    }

    /// Progress toward a one-point epoch in [0, 1]
    pub fn calculate_progress(&self, level: u32) -> f64 {
        (level as f64 / EPOCH_LEVEL * self.multipliers.epoch).min(1.0)
    }

    pub fn can_end(&self, level: u32) -> bool {
        self.calculate_progress(level) >= 1.0
    }

    pub fn current(&self) -> Option<&Challenge> {
        self.current_challenge.and_then(|i| self.challenges.get(i))
    }

    pub fn is_in_challenge(&self) -> bool {
        self.current().is_some_and(|c| c.is_running())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_at_level_hundred() {
        let epoch = Epoch::new();
        assert_eq!(epoch.calculate_points(100), 1.0);
        assert_eq!(epoch.calculate_points(0), 0.0);
        // (2)^(2.2) = 4.59 -> 5
        assert_eq!(epoch.calculate_points(200), 5.0);
    }

    #[test]
    fn test_points_scale_with_multiplier() {
        let mut epoch = Epoch::new();
        epoch.multipliers.epoch = 0.1;
        assert_eq!(epoch.calculate_points(100), 0.0);
        assert!(!epoch.can_end(500));
        assert!(epoch.can_end(1000));
    }

    #[test]
    fn test_progress_caps_at_one() {
        let epoch = Epoch::new();
        assert!((epoch.calculate_progress(50) - 0.5).abs() < 1e-12);
        assert_eq!(epoch.calculate_progress(250), 1.0);
    }

    #[test]
    fn test_every_challenge_listed_once() {
        let epoch = Epoch::new();
        assert_eq!(epoch.challenges.len(), ChallengeKind::ALL.len());
        assert!(!epoch.is_in_challenge());
    }
}
