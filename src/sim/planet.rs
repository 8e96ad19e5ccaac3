//! Planet state machine
//!
//! The planet is Alive until a crater lands inside its core, then Destroyed
//! for a short death animation, after which it respawns bigger and worth more.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;
use serde::Serialize;

use super::collision::Collider;
use super::effects::{Decoration, DecorationKind};
use super::state::GameState;
use crate::consts::*;
use crate::progression::Multipliers;
use crate::tuning::{self, Palette};

/// One painted ring of the planet, outermost first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanetLayer {
    /// Radius in planet-local units (before scale)
    pub radius: f64,
    pub color: String,
}

/// How much of a respawn to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnMode {
    /// Regular respawn after destruction: score, growth, refresh, achievements
    Full,
    /// Growth and level only. Used to fast-forward when loading a save.
    Partial,
    /// Growth and visual refresh, no score and no achievements
    Restore,
}

/// Radius of the destructible core for a given scale
pub fn core_radius(scale: f64) -> f64 {
    PLANET_SIZE * (0.25 - scale / 10.0 * 0.2).max(0.05)
}

#[derive(Debug, Clone)]
pub struct Planet {
    /// Grows on every respawn, never below 1
    pub scale: f64,
    pub destroyed: bool,
    pub death_time: f64,
    /// Auto-fire accumulator
    pub rocket_time: f64,
    pub rocket_interval: f64,
    pub rocket_power: f64,
    pub rocket_speed: f64,
    pub rocket_gravity: f64,
    pub shoot_rockets: bool,
    pub layers: Vec<PlanetLayer>,
    /// Index into the palette table
    pub palette: usize,
    collider: Collider,
    core_collider: Collider,
}

impl Default for Planet {
    fn default() -> Self {
        Self::new()
    }
}

impl Planet {
    pub fn new() -> Self {
        let mut planet = Self {
            scale: 1.0,
            destroyed: false,
            death_time: 0.0,
            rocket_time: 1.0,
            rocket_interval: 1.0,
            rocket_power: 100.0,
            rocket_speed: 1.0,
            rocket_gravity: 0.0,
            shoot_rockets: false,
            layers: Vec::new(),
            palette: 0,
            collider: Collider::new(),
            core_collider: Collider::new(),
        };
        planet.update_colliders();
        planet
    }

    pub fn core_radius(&self) -> f64 {
        core_radius(self.scale)
    }

    pub fn update_colliders(&mut self) {
        self.collider.update(DVec2::ZERO, PLANET_SIZE);
        self.core_collider.update(DVec2::ZERO, self.core_radius());
    }

    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    pub fn core_collider(&self) -> &Collider {
        &self.core_collider
    }

    /// Simulation speed factor. Slows to a stop over the death animation.
    pub fn time_multiplier(&self, multipliers: &Multipliers) -> f64 {
        if self.death_time == 0.0 {
            return multipliers.time;
        }
        (DEATH_TIME - self.death_time / multipliers.reset).max(0.0) / 1.5 / DEATH_TIME * multipliers.time
    }

    /// Effective seconds between auto-fired rockets
    pub fn effective_interval(&self, multipliers: &Multipliers) -> f64 {
        self.rocket_interval * multipliers.interval
    }

    /// Rebuild the ring layers from a palette, outside in, until the core is reached
    pub fn make_layers<R: Rng>(&mut self, palette: &Palette, rng: &mut R) {
        self.layers.clear();
        let core = self.core_radius();
        let mut height = PLANET_SIZE * self.scale;
        let mut i = 0usize;

        while height > core {
            let color = palette.layers[i % palette.layers.len()];
            self.layers.push(PlanetLayer {
                radius: height / self.scale,
                color: format!("#{}", color),
            });
            if i == 0 {
                height -= 15.0 * self.scale;
            } else {
                let fi = i as f64;
                height -= 5.0 * self.scale + 50.0 * fi + 40.0 * fi * rng.random::<f64>() + 5.0 * self.scale * rng.random::<f64>();
            }
            i += 1;
        }
    }

    /// Back to the first-run stats
    fn reset_stats(&mut self) {
        self.rocket_power = 100.0;
        self.rocket_speed = 1.0;
        self.rocket_gravity = 0.0;
        self.scale = 1.0;
        self.destroyed = false;
        self.death_time = 0.0;
        self.rocket_time = 1.0;
        self.rocket_interval = 1.0;
        self.update_colliders();
    }
}

impl GameState {
    /// Current simulation speed factor
    pub fn time_multiplier(&self) -> f64 {
        self.planet.time_multiplier(&self.epoch.multipliers)
    }

    pub(crate) fn update_planet(&mut self, dt: f64) {
        let time = self.time_multiplier();
        self.rotate_surface(dt / 10.0 * time);

        if self.planet.shoot_rockets && !self.planet.destroyed {
            self.planet.rocket_time += dt * time;
            if self.planet.rocket_time > self.planet.effective_interval(&self.epoch.multipliers) {
                let p = &self.planet;
                let (power, speed, gravity) = (p.rocket_power, p.rocket_speed * self.epoch.multipliers.speed, p.rocket_gravity);
                self.spawn_rocket_on_orbit(power, speed, gravity, true);
                self.planet.rocket_time = 0.0;
            }
        }

        if !self.planet.destroyed {
            return;
        }

        let time_speed = self.epoch.multipliers.time;
        self.planet.death_time += dt * time_speed;
        self.shake = 10.0 * time / time_speed;

        if self.planet.death_time > DEATH_TIME * self.epoch.multipliers.reset {
            self.respawn_planet(RespawnMode::Full);
        }
    }

    pub fn respawn_planet(&mut self, mode: RespawnMode) {
        let scale = self.planet.scale;
        self.planet.scale *= 1.125f64.powf(2.0 / scale.sqrt());

        if mode == RespawnMode::Full {
            self.score += (50.0 * self.level as f64).powf(1.1) * self.epoch.multipliers.score;
        }
        let previous = self.level;
        self.level += self.epoch.multipliers.level.round() as u32;

        if mode == RespawnMode::Partial {
            return;
        }

        self.clear_all();
        self.planet.update_colliders();
        self.planet.destroyed = false;
        self.planet.death_time = 0.0;
        self.shake = 0.0;
        self.update_palette();
        self.spawn_decorations();
        self.planet.rocket_time = self.planet.rocket_interval;

        if mode == RespawnMode::Restore {
            return;
        }

        log::debug!("Planet respawned at level {} (scale {:.3})", self.level, self.planet.scale);

        if self.score > 1_000_000.0 {
            self.unlock_achievement("One Million", true);
        }
        for name in tuning::level_achievements(previous, self.level) {
            self.unlock_achievement(name, true);
        }
    }

    /// Pick a random palette and repaint the layers
    pub fn update_palette(&mut self) {
        let index = self.rng.random_range(0..tuning::PLANET_PALETTES.len());
        let palette = &tuning::PLANET_PALETTES[index];
        self.planet.palette = index;
        self.planet.make_layers(palette, &mut self.rng);
    }

    pub fn background(&self) -> String {
        format!("#{}", tuning::PLANET_PALETTES[self.planet.palette].background)
    }

    /// Scatter hills and trees around the rim. Huge planets stay bare.
    pub fn spawn_decorations(&mut self) {
        let scale = self.planet.scale;
        if scale > 50.0 {
            return;
        }

        let amount = (30.0 * scale).round().min(80.0) as usize;
        for i in 0..amount {
            let jitter = (self.rng.random::<f64>() * 30.0 - 15.0).to_radians();
            let angle = TAU * i as f64 / amount as f64 + jitter;
            let pos = DVec2::new(angle.cos(), angle.sin()) * PLANET_SIZE;
            let size = 10.0 * scale.sqrt() + self.rng.random::<f64>() * 40.0;
            let kind = if self.rng.random::<f64>() > 0.36 {
                DecorationKind::Hill
            } else {
                DecorationKind::Tree
            };
            self.spawn_decoration(Decoration::new(pos, size, angle, kind));
        }
    }

    /// Spin everything stuck to the surface by `radians`.
    ///
    /// First-order small-angle rotation; both coordinates are read before
    /// either is written.
    pub fn rotate_surface(&mut self, radians: f64) {
        let sin = radians.sin();
        let shift = |p: DVec2| DVec2::new(p.x - p.y * sin, p.y + p.x * sin);
        let scale = self.planet.scale;

        for &id in &self.hits {
            if let Some(super::state::Base::Hit(hit)) = self.world.base_mut(id) {
                hit.pos = shift(hit.pos);
                hit.update_collider(scale);
            }
        }
        for &id in &self.explosions {
            if let Some(super::state::Base::Explosion(e)) = self.world.base_mut(id) {
                e.pos = shift(e.pos);
            }
        }
        for &id in &self.decorations {
            if let Some(super::state::Base::Decoration(d)) = self.world.base_mut(id) {
                d.pos = shift(d.pos);
                d.angle += radians;
            }
        }
    }

    /// Whether a rocket collider is touching solid ground: inside the rim and
    /// not sitting in an existing crater.
    pub fn planet_intersects(&self, rocket: &Collider) -> bool {
        if !self.planet.collider.intersects(rocket, false) {
            return false;
        }
        !self.hits.iter().any(|&id| match self.world.base(id) {
            Some(super::state::Base::Hit(hit)) => hit.collider.intersects(rocket, true),
            _ => false,
        })
    }

    /// Destroy the planet if a crater centre lands inside the core
    pub fn try_destroy_planet(&mut self, hit: &Collider) {
        if !self.planet.destroyed && self.planet.core_collider.intersects(hit, true) {
            log::debug!("Core breached at level {}", self.level);
            self.planet.destroyed = true;
        }
    }

    /// Full planet reset used when a new epoch begins
    pub fn reset_planet(&mut self) {
        self.planet.reset_stats();
        self.shake = 0.0;
        self.update_palette();
        self.spawn_decorations();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_core_radius_at_scale_one() {
        assert!((core_radius(1.0) - 57.5).abs() < 1e-9);
        assert!((core_radius(100.0) - PLANET_SIZE * 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_layers_reach_core() {
        let mut planet = Planet::new();
        let mut rng = Pcg32::seed_from_u64(1);
        planet.make_layers(&tuning::PLANET_PALETTES[2], &mut rng);

        assert!(!planet.layers.is_empty());
        assert_eq!(planet.layers[0].radius, PLANET_SIZE);
        assert_eq!(planet.layers[0].color, "#fa9");
        assert!((planet.layers[1].radius - (PLANET_SIZE - 15.0)).abs() < 1e-9);
        assert!(planet.layers.iter().all(|l| l.radius > planet.core_radius()));
        assert!(planet.layers.windows(2).all(|w| w[0].radius > w[1].radius));
    }

    #[test]
    fn test_time_multiplier_slows_during_death() {
        let m = Multipliers::default();
        let mut planet = Planet::new();
        assert_eq!(planet.time_multiplier(&m), 1.0);

        planet.death_time = 0.0001;
        let slow = planet.time_multiplier(&m);
        assert!(slow < 0.7 && slow > 0.6);

        planet.death_time = 1.0;
        assert_eq!(planet.time_multiplier(&m), 0.0);
    }

    #[test]
    fn test_destroyed_planet_respawns_once() {
        let mut game = GameState::new(11);
        game.planet.destroyed = true;
        let level = game.level;

        let dt = 1.0 / 60.0;
        let frames = ((DEATH_TIME * game.epoch.multipliers.reset) / dt).ceil() as usize + 1;
        for _ in 0..frames {
            game.step_entities(dt);
        }

        assert!(!game.planet.destroyed);
        assert_eq!(game.level, level + 1);
        assert!((game.planet.scale - 1.125f64.powi(2)).abs() < 1e-12);
        assert!(game.score > 0.0);
        assert_eq!(game.shake, 0.0);
    }

    #[test]
    fn test_respawn_scores_level_formula() {
        let mut game = GameState::new(12);
        game.level = 4;
        game.score = 0.0;
        game.respawn_planet(RespawnMode::Full);
        assert!((game.score - 200f64.powf(1.1)).abs() < 1e-9);
        assert_eq!(game.level, 5);
    }

    #[test]
    fn test_partial_respawn_only_grows() {
        let mut game = GameState::new(13);
        let decorations = game.decorations.len();
        game.respawn_planet(RespawnMode::Partial);
        assert_eq!(game.score, 0.0);
        assert_eq!(game.level, 2);
        assert_eq!(game.decorations.len(), decorations);
        assert!(game.planet.scale > 1.0);
    }

    #[test]
    fn test_level_ten_unlocks_achievement() {
        let mut game = GameState::new(14);
        game.level = 9;
        game.respawn_planet(RespawnMode::Full);
        assert!(game.achievements.is_unlocked("Level 10"));
    }

    #[test]
    fn test_double_level_step_still_unlocks_milestones() {
        let mut game = GameState::new(14);
        game.epoch.multipliers.level = 2.0;
        game.level = 9;
        game.respawn_planet(RespawnMode::Full);
        assert_eq!(game.level, 11);
        assert!(game.achievements.is_unlocked("Level 10"));

        game.level = 2;
        game.respawn_planet(RespawnMode::Full);
        assert_eq!(game.level, 4);
        assert!(game.achievements.is_unlocked("Rocket 2"));
        assert!(game.overlay.launchers.is_unlocked(0, 1));
    }

    #[test]
    fn test_rotation_keeps_radius_first_order() {
        let mut game = GameState::new(15);
        let before: Vec<f64> = game
            .decorations
            .iter()
            .filter_map(|&id| match game.world.base(id) {
                Some(super::super::state::Base::Decoration(d)) => Some(d.pos.length()),
                _ => None,
            })
            .collect();
        game.rotate_surface(0.001);
        let after: Vec<f64> = game
            .decorations
            .iter()
            .filter_map(|&id| match game.world.base(id) {
                Some(super::super::state::Base::Decoration(d)) => Some(d.pos.length()),
                _ => None,
            })
            .collect();
        for (a, b) in before.iter().zip(&after) {
            // sqrt(1 + sin²) growth only
            assert!((b / a - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_crater_shields_rocket() {
        let mut game = GameState::new(16);
        let mut rocket = Collider::new();
        rocket.update(DVec2::new(0.0, 240.0), 8.0);
        assert!(game.planet_intersects(&rocket));

        game.spawn_hit(super::super::effects::PlanetHit::new(DVec2::new(0.0, 245.0), 30.0));
        assert!(!game.planet_intersects(&rocket));
    }

    #[test]
    fn test_core_hit_destroys_planet() {
        let mut game = GameState::new(17);
        game.spawn_hit(super::super::effects::PlanetHit::new(DVec2::new(10.0, 0.0), 5.0));
        assert!(game.planet.destroyed);
    }

    proptest! {
        #[test]
        fn prop_core_radius_monotonic(a in 1.0f64..1e6, b in 1.0f64..1e6) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(core_radius(hi) <= core_radius(lo));
            prop_assert!(core_radius(hi) >= 0.05 * PLANET_SIZE - 1e-9);
        }
    }
}
