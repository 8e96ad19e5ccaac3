//! Purchasable upgrades
//!
//! Every upgrade is a data record: a static spec with plain function pointers
//! for its effect, cost curve and description, plus per-run level and price.

use serde::Serialize;

use super::epoch::Epoch;
use crate::sim::Planet;

/// What an upgrade board is paid with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Currency {
    Score,
    EpochPoints,
}

pub struct UpgradeSpec {
    pub name: &'static str,
    /// Short button label ("+1", "x0.95")
    pub label: &'static str,
    pub base_cost: f64,
    /// `None` for unbounded
    pub max_level: Option<u32>,
    pub apply: fn(&mut Planet, &mut Epoch),
    /// Next price from the current price, the level being bought and the cost multiplier
    pub next_cost: fn(f64, u32, f64) -> f64,
    pub describe: fn(&Planet, &Epoch) -> Vec<String>,
}

impl std::fmt::Debug for UpgradeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpgradeSpec")
            .field("name", &self.name)
            .field("base_cost", &self.base_cost)
            .field("max_level", &self.max_level)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Upgrade {
    pub spec: &'static UpgradeSpec,
    pub level: u32,
    pub cost: f64,
}

impl Upgrade {
    pub fn new(spec: &'static UpgradeSpec) -> Self {
        Self {
            spec,
            level: 0,
            cost: spec.base_cost,
        }
    }

    pub fn is_maxed(&self) -> bool {
        self.spec.max_level.is_some_and(|max| self.level >= max)
    }

    pub fn can_buy(&self, funds: f64) -> bool {
        funds >= self.cost && !self.is_maxed()
    }

    /// Apply one level and raise the price. The caller has already taken payment.
    pub fn level_up(&mut self, planet: &mut Planet, epoch: &mut Epoch) {
        self.apply_level(self.level, planet, epoch);
        self.level += 1;
    }

    fn apply_level(&mut self, level: u32, planet: &mut Planet, epoch: &mut Epoch) {
        (self.spec.apply)(planet, epoch);
        self.cost = (self.spec.next_cost)(self.cost, level, epoch.multipliers.cost);
    }

    /// Re-run the effect of every owned level against fresh state, as after loading a save
    pub fn replay(&mut self, planet: &mut Planet, epoch: &mut Epoch) {
        self.cost = self.spec.base_cost;
        for level in 0..self.level {
            self.apply_level(level, planet, epoch);
        }
    }

    pub fn reset(&mut self) {
        self.level = 0;
        self.cost = self.spec.base_cost;
    }

    pub fn describe(&self, planet: &Planet, epoch: &Epoch) -> Vec<String> {
        (self.spec.describe)(planet, epoch)
    }
}

#[derive(Debug, Clone)]
pub struct UpgradeBoard {
    pub currency: Currency,
    pub items: Vec<Upgrade>,
}

impl UpgradeBoard {
    pub fn new(currency: Currency, specs: &'static [UpgradeSpec]) -> Self {
        Self {
            currency,
            items: specs.iter().map(Upgrade::new).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Upgrade> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Upgrade> {
        self.items.get_mut(index)
    }

    pub fn reset(&mut self) {
        self.items.iter_mut().for_each(Upgrade::reset);
    }

    pub fn replay(&mut self, planet: &mut Planet, epoch: &mut Epoch) {
        for upgrade in &mut self.items {
            upgrade.replay(planet, epoch);
        }
    }

    pub fn levels(&self) -> Vec<u32> {
        self.items.iter().map(|u| u.level).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{EPOCH_UPGRADES, SCORE_UPGRADES};

    #[test]
    fn test_power_upgrade_purchase() {
        let mut planet = Planet::new();
        let mut epoch = Epoch::new();
        let mut power = Upgrade::new(&SCORE_UPGRADES[0]);
        assert!(power.can_buy(100.0));
        assert!(!power.can_buy(99.9));

        power.level_up(&mut planet, &mut epoch);
        assert_eq!(power.level, 1);
        assert!((planet.rocket_power - 110.0).abs() < 1e-9);
        assert!((power.cost - (100.0 + 100.0 / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_max_level_blocks_purchase() {
        let mut planet = Planet::new();
        let mut epoch = Epoch::new();
        let mut gravity = Upgrade::new(&SCORE_UPGRADES[3]);
        for _ in 0..50 {
            gravity.level_up(&mut planet, &mut epoch);
        }
        assert!(gravity.is_maxed());
        assert!(!gravity.can_buy(f64::MAX));
    }

    #[test]
    fn test_speed_upgrade_tenth_level_bump() {
        let mut planet = Planet::new();
        let mut epoch = Epoch::new();
        let mut speed = Upgrade::new(&SCORE_UPGRADES[2]);
        for _ in 0..9 {
            speed.level_up(&mut planet, &mut epoch);
        }
        let before = speed.cost;
        speed.level_up(&mut planet, &mut epoch);
        // doubled, then grown by 1/1.1
        let expected = before * 2.0 + before * 2.0 / 1.1;
        assert!((speed.cost - expected).abs() < 1e-6 * expected);
    }

    #[test]
    fn test_epoch_upgrades_double_in_price() {
        let mut planet = Planet::new();
        let mut epoch = Epoch::new();
        let mut power = Upgrade::new(&EPOCH_UPGRADES[0]);
        assert!(!power.is_maxed());
        power.level_up(&mut planet, &mut epoch);
        power.level_up(&mut planet, &mut epoch);
        assert_eq!(power.cost, 4.0);
        assert_eq!(epoch.multipliers.power, 3.0);
    }

    #[test]
    fn test_replay_matches_live_purchases() {
        let mut live_planet = Planet::new();
        let mut live_epoch = Epoch::new();
        let mut board = UpgradeBoard::new(Currency::Score, &SCORE_UPGRADES);
        for (i, n) in [(0usize, 5u32), (1, 3), (2, 12), (3, 4)] {
            for _ in 0..n {
                board.items[i].level_up(&mut live_planet, &mut live_epoch);
            }
        }

        let mut planet = Planet::new();
        let mut epoch = Epoch::new();
        let mut loaded = UpgradeBoard::new(Currency::Score, &SCORE_UPGRADES);
        for (dst, src) in loaded.items.iter_mut().zip(&board.items) {
            dst.level = src.level;
        }
        loaded.replay(&mut planet, &mut epoch);

        assert!((planet.rocket_power - live_planet.rocket_power).abs() < 1e-9);
        assert!((planet.rocket_interval - live_planet.rocket_interval).abs() < 1e-12);
        assert!((planet.rocket_speed - live_planet.rocket_speed).abs() < 1e-9);
        assert!((planet.rocket_gravity - live_planet.rocket_gravity).abs() < 1e-12);
        for (a, b) in loaded.items.iter().zip(&board.items) {
            assert!((a.cost - b.cost).abs() < 1e-6 * b.cost);
        }
    }

    #[test]
    fn test_reset_restores_base_price() {
        let mut planet = Planet::new();
        let mut epoch = Epoch::new();
        let mut board = UpgradeBoard::new(Currency::Score, &SCORE_UPGRADES);
        board.items[0].level_up(&mut planet, &mut epoch);
        board.reset();
        assert_eq!(board.levels(), vec![0, 0, 0, 0]);
        assert_eq!(board.items[0].cost, 100.0);
    }

    #[test]
    fn test_descriptions_mention_current_value() {
        let planet = Planet::new();
        let epoch = Epoch::new();
        let lines = Upgrade::new(&SCORE_UPGRADES[1]).describe(&planet, &epoch);
        assert_eq!(lines.last().map(String::as_str), Some("Current rocket interval: 1000.0ms"));
    }
}
