//! Rocket simulation
//!
//! Rockets spawn on a wide orbit, curve toward the planet centre and dig into
//! the surface. Each impact leaves a crater, scores points and consumes one
//! point of penetration.

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Collider;
use super::effects::PlanetHit;
use super::entity::EntityId;
use super::state::GameState;
use crate::consts::*;
use crate::{angle_lerp, polar_to_cartesian};

/// Cosmetic/behavioural rocket variants, combinable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RocketFlags(pub u8);

impl RocketFlags {
    pub const NONE: Self = Self(0);
    pub const LONG: Self = Self(1);
    pub const SHARP: Self = Self(2);
    pub const HAMMER: Self = Self(4);
    pub const WHITE: Self = Self(8);
    pub const TRIANGLE: Self = Self(16);
    pub const LONGER: Self = Self(32);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for RocketFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone)]
pub struct Rocket {
    pub pos: DVec2,
    pub size: f64,
    pub damage: f64,
    pub speed: f64,
    pub gravity: f64,
    /// Heading in radians
    pub angle: f64,
    /// Impacts left before the rocket is spent
    pub penetration: u32,
    pub flags: RocketFlags,
    pub collider: Collider,
    trail_timer: f64,
    trail_spawn_at: f64,
}

impl Rocket {
    pub fn new(pos: DVec2, size: f64, damage: f64, speed: f64, gravity: f64, angle: f64) -> Self {
        Self {
            pos,
            size,
            damage,
            speed,
            gravity,
            angle,
            penetration: 1,
            flags: RocketFlags::NONE,
            collider: Collider::new(),
            trail_timer: 0.0,
            trail_spawn_at: 0.0,
        }
    }

    pub fn direction(&self) -> DVec2 {
        DVec2::new(self.angle.cos(), self.angle.sin())
    }

    fn update_collider(&mut self, planet_scale: f64) {
        self.collider.update(self.pos, self.size / planet_scale);
    }
}

/// Impact multiplier from rocket gravity, strongest near the planet centre.
///
/// `dist` is the impact distance from the centre plus one, so a dead-centre
/// hit never divides by zero.
pub fn gravity_power(gravity: f64, dist: f64) -> f64 {
    1.0 + (2f64.powf(gravity) - 1.0) / dist
}

impl GameState {
    /// Spawn a rocket on the orbit circle, aimed near the target marker when
    /// it is visible and `use_target` is set.
    pub fn spawn_rocket_on_orbit(&mut self, damage: f64, speed: f64, gravity: f64, use_target: bool) -> EntityId {
        let orbit_angle = if self.target.hidden || !use_target {
            self.rng.random::<f64>() * TAU
        } else {
            self.target.angle + self.rng.random::<f64>() * TAU / 12.0 - TAU / 24.0
        };
        let pos = polar_to_cartesian(ORBIT_RADIUS, orbit_angle);
        let jitter = self.rng.random::<f64>() * TAU / self.planet.scale / self.epoch.multipliers.reset;
        let heading = pos.y.atan2(pos.x) - PI + jitter;

        let rocket = Rocket::new(pos, ROCKET_SIZE, damage, speed, gravity, heading);
        self.spawn_rocket(rocket)
    }

    /// Fan out `amount` copies of `template` on the orbit
    pub fn spawn_rocket_clones(&mut self, template: &Rocket, amount: u32, use_target: bool) {
        for _ in 0..amount {
            let id = self.spawn_rocket_on_orbit(template.damage, template.speed, template.gravity, use_target);
            if let Some(super::state::Base::Rocket(clone)) = self.world.base_mut(id) {
                clone.size = template.size;
                clone.penetration = template.penetration;
                clone.flags = template.flags;
            }
        }
    }

    pub(crate) fn update_rocket(&mut self, id: EntityId, rocket: &mut Rocket, dt: f64) {
        let time = self.time_multiplier();
        let scale = self.planet.scale;

        let homing = rocket.pos.y.atan2(rocket.pos.x) - PI;
        rocket.angle = angle_lerp(rocket.angle, homing, (dt * rocket.speed * time).min(1.0));
        if rocket.angle.is_nan() {
            rocket.angle = self.rng.random::<f64>() * TAU;
        }

        let mut step = dt * ROCKET_BASE_SPEED * rocket.speed / scale * time;
        if rocket.pos.length() < step {
            rocket.pos = DVec2::ZERO;
            step = PLANET_SIZE * scale;
        } else {
            rocket.pos += rocket.direction() * step;
        }
        rocket.update_collider(scale);

        if self.planet_intersects(&rocket.collider) {
            self.collide_rocket(id, rocket, step);
            if !self.world.is_alive(id) {
                return;
            }
        }

        rocket.trail_timer += dt * time;
        if rocket.trail_timer > rocket.trail_spawn_at {
            let behind = rocket.pos - rocket.direction() * rocket.size * 2.0;
            let size = rocket.size * (6.0 + self.rng.random::<f64>()) / 10.0 * scale;
            self.spawn_explosion(behind, size, TRAIL_EXPLOSION_TIME);
            rocket.trail_spawn_at = self.rng.random::<f64>() / 30.0;
            rocket.trail_timer = 0.0;
        }
    }

    /// Settle the rocket on the surface, score the impact and leave a crater
    fn collide_rocket(&mut self, id: EntityId, rocket: &mut Rocket, step: f64) {
        let scale = self.planet.scale;
        let dir = rocket.direction();
        let mut budget = COLLISION_STEP_LIMIT;

        // Back out of the surface, then creep forward until touching again.
        // Both phases share one budget so a degenerate state can't spin.
        loop {
            rocket.pos -= dir * step / 2.0 / scale;
            rocket.update_collider(scale);
            if !self.planet_intersects(&rocket.collider) || budget == 0 {
                break;
            }
            budget -= 1;
        }
        while budget > 0 && !self.planet_intersects(&rocket.collider) {
            rocket.pos += dir * rocket.damage / 10.0 / scale;
            rocket.update_collider(scale);
            budget -= 1;
        }

        if rocket.pos.x.abs() > DIVERGENCE_LIMIT || rocket.pos.y.abs() > DIVERGENCE_LIMIT {
            log::warn!("Rocket {} diverged to {:?}, resetting to origin", id, rocket.pos);
            rocket.pos = DVec2::ZERO;
        }

        let multipliers = self.epoch.multipliers;
        let gp = gravity_power(rocket.gravity, rocket.pos.length() + 1.0);
        self.score += rocket.damage * gp / 10.0 * multipliers.score;
        self.spawn_hit(PlanetHit::new(rocket.pos, rocket.damage * gp * multipliers.power));

        if self.epoch.penetration_chance > self.rng.random::<f64>() {
            rocket.penetration += 1;
        }
        rocket.penetration = rocket.penetration.saturating_sub(1);
        if rocket.penetration == 0 {
            self.world.destroy(id);
            self.rockets.retain(|r| *r != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Base;

    fn rocket_of(game: &GameState, id: EntityId) -> Rocket {
        match game.world.base(id) {
            Some(Base::Rocket(r)) => r.clone(),
            other => panic!("expected rocket, got {:?}", other),
        }
    }

    #[test]
    fn test_gravity_power_without_gravity_is_one() {
        assert_eq!(gravity_power(0.0, 1.0), 1.0);
        assert_eq!(gravity_power(0.0, 500.0), 1.0);
        assert!((gravity_power(1.0, 1.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_flags_combine() {
        let f = RocketFlags::LONG | RocketFlags::LONGER;
        assert!(f.contains(RocketFlags::LONG));
        assert!(f.contains(RocketFlags::LONGER));
        assert!(!f.contains(RocketFlags::SHARP));
    }

    #[test]
    fn test_orbit_spawn_registers_rocket() {
        let mut game = GameState::new(1);
        let id = game.spawn_rocket_on_orbit(100.0, 1.0, 0.0, false);
        assert_eq!(game.rockets, vec![id]);

        let r = rocket_of(&game, id);
        assert!((r.pos.length() - ORBIT_RADIUS).abs() < 1e-6);
        assert_eq!(r.size, ROCKET_SIZE);
        assert_eq!(r.penetration, 1);
    }

    #[test]
    fn test_orbit_spawn_follows_visible_target() {
        let mut game = GameState::new(2);
        game.target.hidden = false;
        game.target.angle = 1.0;
        for _ in 0..20 {
            let id = game.spawn_rocket_on_orbit(1.0, 1.0, 0.0, true);
            let r = rocket_of(&game, id);
            let a = r.pos.y.atan2(r.pos.x);
            assert!(crate::short_angle_dist(1.0, a).abs() <= TAU / 24.0 + 1e-9);
        }
    }

    #[test]
    fn test_centre_impact_scores_ten_for_damage_hundred() {
        let mut game = GameState::new(3);
        game.score = 0.0;
        let id = game.spawn_rocket(Rocket::new(DVec2::ZERO, ROCKET_SIZE, 100.0, 1.0, 0.0, 0.0));
        let Some(Base::Rocket(mut rocket)) = game.world.take_base(id) else {
            panic!("rocket base missing");
        };

        let hits_before = game.hits.len();
        game.collide_rocket(id, &mut rocket, PLANET_SIZE);
        assert!((game.score - 10.0).abs() < 1e-9, "score {}", game.score);
        assert_eq!(game.hits.len(), hits_before + 1);
    }

    #[test]
    fn test_spent_rocket_removed_exactly_once() {
        let mut game = GameState::new(4);
        let id = game.spawn_rocket_on_orbit(100.0, 1.0, 0.0, false);
        let other = game.spawn_rocket_on_orbit(100.0, 1.0, 0.0, false);
        let mut rocket = rocket_of(&game, id);
        rocket.pos = DVec2::new(0.0, 200.0);

        game.collide_rocket(id, &mut rocket, 10.0);
        assert_eq!(rocket.penetration, 0);
        assert!(!game.world.is_alive(id));
        assert_eq!(game.rockets, vec![other]);
    }

    #[test]
    fn test_spent_rocket_leaves_no_trail() {
        let mut game = GameState::new(4);
        let id = game.spawn_rocket_on_orbit(100.0, 1.0, 0.0, false);
        let mut rocket = rocket_of(&game, id);
        rocket.pos = DVec2::new(0.0, 200.0);
        rocket.angle = -PI / 2.0;
        rocket.trail_timer = 1.0;
        rocket.trail_spawn_at = 0.0;

        let explosions = game.explosions.len();
        game.update_rocket(id, &mut rocket, 1.0 / 60.0);
        assert!(!game.world.is_alive(id));
        // Impact flash only
        assert_eq!(game.explosions.len(), explosions + 1);
    }

    #[test]
    fn test_penetration_keeps_rocket_alive() {
        let mut game = GameState::new(5);
        let id = game.spawn_rocket_on_orbit(100.0, 1.0, 0.0, false);
        let mut rocket = rocket_of(&game, id);
        rocket.penetration = 3;
        rocket.pos = DVec2::new(0.0, 200.0);

        game.collide_rocket(id, &mut rocket, 10.0);
        assert_eq!(rocket.penetration, 2);
        assert!(game.world.is_alive(id));
        assert!(game.rockets.contains(&id));
    }

    #[test]
    fn test_clones_copy_template() {
        let mut game = GameState::new(6);
        let mut template = Rocket::new(DVec2::ZERO, 7.0, 0.5, 2.0, 0.0, 0.0);
        template.flags = RocketFlags::TRIANGLE;
        template.penetration = 3;

        game.spawn_rocket_clones(&template, 24, false);
        assert_eq!(game.rockets.len(), 24);
        for id in game.rockets.clone() {
            let r = rocket_of(&game, id);
            assert_eq!(r.size, 7.0);
            assert_eq!(r.flags, RocketFlags::TRIANGLE);
            assert_eq!(r.penetration, 3);
        }
    }

    #[test]
    fn test_rocket_reaches_planet() {
        let mut game = GameState::new(8);
        game.spawn_rocket_on_orbit(100.0, 1.0, 0.0, false);
        let score_before = game.score;

        // Random initial heading, so allow time to curve back in
        for _ in 0..60 * 10 {
            game.step_entities(1.0 / 60.0);
        }
        assert!(game.rockets.is_empty(), "rocket should have hit the planet");
        assert!(game.score > score_before);
        assert!(!game.hits.is_empty());
    }
}
