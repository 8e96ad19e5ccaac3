//! Transient planet-surface effects: craters, explosions and decorations

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::Collider;
use super::entity::EntityId;
use super::state::GameState;
use crate::consts::PLANET_SIZE;

/// A crater left by a rocket impact. Rockets pass through craters.
#[derive(Debug, Clone)]
pub struct PlanetHit {
    pub pos: DVec2,
    pub size: f64,
    pub collider: Collider,
}

impl PlanetHit {
    pub fn new(pos: DVec2, size: f64) -> Self {
        Self {
            pos,
            size,
            collider: Collider::new(),
        }
    }

    /// Crater radius shrinks in world space as the planet grows
    pub fn update_collider(&mut self, planet_scale: f64) {
        self.collider.update(self.pos, self.size / planet_scale);
    }
}

/// Expanding puff that fades out over its lifetime
#[derive(Debug, Clone)]
pub struct Explosion {
    pub pos: DVec2,
    pub size: f64,
    pub timer: f64,
    pub lifetime: f64,
}

impl Explosion {
    pub fn new(pos: DVec2, size: f64, lifetime: f64) -> Self {
        Self {
            pos,
            size,
            timer: 0.0,
            lifetime,
        }
    }

    /// Opacity in [0, 1]. Large blasts are dimmed so they don't white out the screen.
    pub fn alpha(&self, planet_scale: f64) -> f64 {
        let fade = 1.0 - self.timer / self.lifetime;
        let dim = (1.0 + self.size * 10.0 / PLANET_SIZE / planet_scale).ln().max(1.0);
        (fade / dim).max(0.0)
    }

    pub fn expired(&self) -> bool {
        self.timer > self.lifetime
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorationKind {
    Hill,
    Tree,
}

/// Static surface dressing that rides the planet's rotation
#[derive(Debug, Clone)]
pub struct Decoration {
    pub pos: DVec2,
    pub size: f64,
    pub angle: f64,
    pub kind: DecorationKind,
}

impl Decoration {
    pub fn new(pos: DVec2, size: f64, angle: f64, kind: DecorationKind) -> Self {
        Self {
            pos,
            size,
            angle,
            kind,
        }
    }
}

impl GameState {
    /// Advance an explosion; expired ones are destroyed and dropped from the list.
    pub(crate) fn update_explosion(&mut self, id: EntityId, explosion: &mut Explosion, dt: f64) {
        explosion.timer += dt * self.time_multiplier();
        if explosion.expired() {
            self.world.destroy(id);
            self.explosions.retain(|e| *e != id);
        }
    }
}
