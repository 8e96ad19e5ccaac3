//! Aim marker
//!
//! Clicking on the planet drops a marker that biases where new rockets spawn.
//! The marker fades out after a couple of seconds of game time.

use glam::DVec2;

use super::tick::{Pointer, Viewport};
use crate::consts::{PLANET_SIZE, TARGET_ACTIVE_TIME};

#[derive(Debug, Clone)]
pub struct Target {
    /// Last click in device pixels
    pub pos: DVec2,
    /// Click direction from the screen centre
    pub angle: f64,
    pub hidden: bool,
    /// Clicks are ignored while false (menus, offline challenge)
    pub can_click: bool,
    /// Pointer is over the planet this frame
    pub hovered: bool,
    holding: bool,
    timer: f64,
}

impl Default for Target {
    fn default() -> Self {
        Self::new()
    }
}

impl Target {
    pub fn new() -> Self {
        Self {
            pos: DVec2::ZERO,
            angle: 0.0,
            hidden: true,
            can_click: false,
            hovered: false,
            holding: false,
            timer: 0.0,
        }
    }

    /// `time_multiplier` is the planet's current time factor
    pub fn update(&mut self, dt: f64, pointer: &Pointer, viewport: &Viewport, time_multiplier: f64) {
        self.hovered = false;
        if !self.can_click {
            return;
        }

        let rel = DVec2::new(pointer.x - viewport.width / 2.0, pointer.y - viewport.height / 2.0);
        let reach = PLANET_SIZE * viewport.scale;
        if rel.length_squared() < reach * reach {
            self.hovered = true;
            if pointer.held && !self.holding {
                self.pos = DVec2::new(pointer.x, pointer.y);
                self.angle = rel.y.atan2(rel.x);
                self.hidden = false;
                self.timer = 0.0;
                self.holding = true;
            } else if !pointer.held {
                self.holding = false;
            }
        }

        if self.hidden {
            return;
        }

        self.timer += dt * time_multiplier;
        if self.timer > TARGET_ACTIVE_TIME {
            self.timer = 0.0;
            self.hidden = true;
        }
    }

    pub fn alpha(&self) -> f64 {
        (1.0 - self.timer / TARGET_ACTIVE_TIME).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            width: 800.0,
            height: 600.0,
            scale: 1.0,
        }
    }

    fn pointer(x: f64, y: f64, held: bool) -> Pointer {
        Pointer { x, y, held }
    }

    #[test]
    fn test_click_on_planet_shows_marker() {
        let mut t = Target::new();
        t.can_click = true;
        t.update(0.016, &pointer(500.0, 300.0, true), &viewport(), 1.0);
        assert!(!t.hidden);
        assert!(t.hovered);
        assert!(t.angle.abs() < 1e-12, "click right of centre aims at 0 rad");
    }

    #[test]
    fn test_click_outside_planet_ignored() {
        let mut t = Target::new();
        t.can_click = true;
        t.update(0.016, &pointer(790.0, 10.0, true), &viewport(), 1.0);
        assert!(t.hidden);
        assert!(!t.hovered);
    }

    #[test]
    fn test_disabled_target_ignores_clicks() {
        let mut t = Target::new();
        t.update(0.016, &pointer(400.0, 300.0, true), &viewport(), 1.0);
        assert!(t.hidden);
    }

    #[test]
    fn test_held_pointer_clicks_once() {
        let mut t = Target::new();
        t.can_click = true;
        t.update(0.5, &pointer(400.0, 350.0, true), &viewport(), 1.0);
        t.update(0.5, &pointer(400.0, 350.0, true), &viewport(), 1.0);
        // Holding doesn't restart the fade
        assert!((t.alpha() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_marker_fades_and_hides() {
        let mut t = Target::new();
        t.can_click = true;
        t.update(0.0, &pointer(400.0, 350.0, true), &viewport(), 1.0);
        t.update(1.0, &pointer(0.0, 0.0, false), &viewport(), 1.0);
        assert!((t.alpha() - 0.5).abs() < 1e-12);
        t.update(1.5, &pointer(0.0, 0.0, false), &viewport(), 1.0);
        assert!(t.hidden);
    }
}
