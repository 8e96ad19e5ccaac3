//! Circle colliders
//!
//! Every physical thing in the game is a circle: the planet's outer rim, its
//! shrinking core, craters and rockets. A collider starts unset and only takes
//! part in tests once it has been given a shape.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A circle in planet-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Circle-vs-circle overlap.
///
/// With `ignore_other_radius` the second circle is treated as a point, which
/// is how "is this point inside that area" questions are asked.
#[inline]
pub fn circle_intersects_circle(a: &Circle, b: &Circle, ignore_other_radius: bool) -> bool {
    let d = a.center - b.center;
    let r = a.radius + if ignore_other_radius { 0.0 } else { b.radius };
    d.length_squared() <= r * r
}

/// Optional circle shape attached to an entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    shape: Option<Circle>,
}

impl Collider {
    pub fn new() -> Self {
        Self { shape: None }
    }

    /// Replace the collider shape
    pub fn update(&mut self, center: DVec2, radius: f64) {
        self.shape = Some(Circle::new(center, radius));
    }

    pub fn shape(&self) -> Option<&Circle> {
        self.shape.as_ref()
    }

    /// Overlap test against another collider. Unset colliders never intersect.
    pub fn intersects(&self, other: &Collider, ignore_other_radius: bool) -> bool {
        match (&self.shape, &other.shape) {
            (Some(a), Some(b)) => circle_intersects_circle(a, b, ignore_other_radius),
            _ => false,
        }
    }
}
