//! HUD-side state: which screen is up, achievement toasts, and the
//! purchasable things shown on screen (upgrade boards, launcher buttons).

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::ACHIEVEMENT_TIME;
use crate::progression::{Currency, LauncherRack, UpgradeBoard};
use crate::tuning::{EPOCH_UPGRADES, SCORE_UPGRADES};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scene {
    #[default]
    Menu,
    Game,
    Epoch,
    Challenges,
}

#[derive(Debug, Clone)]
pub struct Overlay {
    pub scene: Scene,
    pub upgrades: UpgradeBoard,
    pub epoch_upgrades: UpgradeBoard,
    pub launchers: LauncherRack,
    /// Achievement ids waiting to be shown, front is on screen
    toasts: VecDeque<u8>,
    toast_timer: f64,
    /// Zero when no toast is active
    toast_duration: f64,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Overlay {
    pub fn new() -> Self {
        Self {
            scene: Scene::Menu,
            upgrades: UpgradeBoard::new(Currency::Score, &SCORE_UPGRADES),
            epoch_upgrades: UpgradeBoard::new(Currency::EpochPoints, &EPOCH_UPGRADES),
            launchers: LauncherRack::new(),
            toasts: VecDeque::new(),
            toast_timer: 0.0,
            toast_duration: 0.0,
        }
    }

    pub fn update(&mut self, dt: f64) {
        if self.scene == Scene::Game {
            self.launchers.recharge(dt);
        }

        if self.toast_duration == 0.0 {
            return;
        }
        self.toast_timer += dt;
        if self.toast_timer > self.toast_duration {
            self.toasts.pop_front();
            self.toast_timer = 0.0;
            if self.toasts.is_empty() {
                self.toast_duration = 0.0;
            }
        }
    }

    /// Queue an achievement toast. Restarts the current toast's timer.
    pub fn push_achievement(&mut self, id: u8) {
        self.toasts.push_back(id);
        self.toast_duration = ACHIEVEMENT_TIME;
        self.toast_timer = 0.0;
    }

    pub fn current_achievement(&self) -> Option<u8> {
        self.toasts.front().copied()
    }

    /// Toast opacity: quick fade-in over the first tenth, fade-out over the last
    pub fn achievement_alpha(&self) -> f64 {
        if self.toast_duration == 0.0 {
            return 0.0;
        }
        let t = self.toast_timer;
        let d = self.toast_duration;
        (t / 0.1 / d).min(1.0) - ((t - d * 0.9) / 0.1 / d).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_menu() {
        let overlay = Overlay::new();
        assert_eq!(overlay.scene, Scene::Menu);
        assert_eq!(overlay.current_achievement(), None);
        assert_eq!(overlay.achievement_alpha(), 0.0);
    }

    #[test]
    fn test_toasts_queue_in_order() {
        let mut overlay = Overlay::new();
        overlay.push_achievement(3);
        overlay.push_achievement(7);
        assert_eq!(overlay.current_achievement(), Some(3));

        for _ in 0..6 {
            overlay.update(1.0);
        }
        assert_eq!(overlay.current_achievement(), Some(7));
        for _ in 0..6 {
            overlay.update(1.0);
        }
        assert_eq!(overlay.current_achievement(), None);
        assert_eq!(overlay.achievement_alpha(), 0.0);
    }

    #[test]
    fn test_alpha_envelope() {
        let mut overlay = Overlay::new();
        overlay.push_achievement(0);
        overlay.update(0.25);
        assert!((overlay.achievement_alpha() - 0.5).abs() < 1e-9);
        overlay.update(2.0);
        assert!((overlay.achievement_alpha() - 1.0).abs() < 1e-9);
        overlay.update(2.73);
        assert!(overlay.achievement_alpha() < 0.05);
    }

    #[test]
    fn test_launchers_charge_only_in_game() {
        let mut overlay = Overlay::new();
        overlay.update(5.0);
        assert_eq!(overlay.launchers.get(0, 0).map(|l| l.reload), Some(0.0));
        overlay.scene = Scene::Game;
        overlay.update(5.0);
        assert_eq!(overlay.launchers.get(0, 0).map(|l| l.reload), Some(1.0));
    }
}
