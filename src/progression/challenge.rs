//! Challenges: handicapped runs with a one-time permanent reward

use serde::{Deserialize, Serialize};

use crate::sim::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeKind {
    /// No clicking: target and launcher buttons disabled
    Offline,
    /// No auto-fire
    Active,
    /// Reduced epoch gain and slow rockets
    Epoch,
}

impl ChallengeKind {
    pub const ALL: [ChallengeKind; 3] = [ChallengeKind::Offline, ChallengeKind::Active, ChallengeKind::Epoch];

    pub fn name(self) -> &'static str {
        match self {
            ChallengeKind::Offline => "Offline",
            ChallengeKind::Active => "Active",
            ChallengeKind::Epoch => "Epoch",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ChallengeKind::Offline => "Target and buttons are disabled",
            ChallengeKind::Active => "Auto rockets are disabled",
            ChallengeKind::Epoch => "Epoch gain x0.1 (starts from level 500) and rockets are 10x slower",
        }
    }

    pub fn reward(self) -> &'static str {
        match self {
            ChallengeKind::Offline => "2x button reload",
            ChallengeKind::Active => "2x rocket reload",
            ChallengeKind::Epoch => "+2 level per level",
        }
    }

    /// Stable save-file tag
    pub fn tag(self) -> u8 {
        match self {
            ChallengeKind::Offline => 1,
            ChallengeKind::Active => 2,
            ChallengeKind::Epoch => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// Apply the handicap
    pub fn on_start(self, game: &mut GameState) {
        match self {
            ChallengeKind::Offline => {
                game.target.can_click = false;
                game.overlay.launchers.enabled = false;
            }
            ChallengeKind::Active => game.planet.shoot_rockets = false,
            ChallengeKind::Epoch => {
                let m = &mut game.epoch.multipliers;
                m.epoch *= 0.1;
                m.speed /= 10.0;
            }
        }
    }

    /// Lift the handicap
    pub fn on_end(self, game: &mut GameState) {
        match self {
            ChallengeKind::Offline => {
                game.target.can_click = true;
                game.overlay.launchers.enabled = true;
            }
            ChallengeKind::Active => game.planet.shoot_rockets = true,
            ChallengeKind::Epoch => {
                let m = &mut game.epoch.multipliers;
                m.epoch /= 0.1;
                m.speed *= 10.0;
            }
        }
    }

    /// Permanent bonus for the first completion
    pub fn on_reward(self, game: &mut GameState) {
        match self {
            ChallengeKind::Offline => game.overlay.launchers.halve_reload_times(),
            ChallengeKind::Active => game.epoch.multipliers.interval /= 2.0,
            ChallengeKind::Epoch => game.epoch.multipliers.level += 1.0,
        }
    }
}

/// Result of ending a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Wasn't running, nothing happened
    NotRunning,
    Abandoned,
    Completed { first_time: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    pub kind: ChallengeKind,
    /// Wall-clock seconds when the current attempt began
    pub start_time: Option<f64>,
    /// Duration of the latest successful attempt
    pub completed_time: Option<f64>,
    pub completed: bool,
}

impl Challenge {
    pub fn new(kind: ChallengeKind) -> Self {
        Self {
            kind,
            start_time: None,
            completed_time: None,
            completed: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn begin(&mut self, now: f64) {
        self.start_time = Some(now);
    }

    /// Close the attempt. The caller applies `on_end` and, on a first
    /// completion, `on_reward`.
    pub fn finish(&mut self, completed: bool, now: f64) -> ChallengeOutcome {
        let Some(start) = self.start_time.take() else {
            return ChallengeOutcome::NotRunning;
        };
        if !completed {
            return ChallengeOutcome::Abandoned;
        }

        let first_time = !self.completed;
        self.completed_time = Some(now - start);
        self.completed = true;
        ChallengeOutcome::Completed { first_time }
    }
}
