//! Planet Destroyer - an idle planet-smashing game
//!
//! Core modules:
//! - `sim`: Per-frame simulation (entity runtime, planet, rockets, effects)
//! - `progression`: Epochs, challenges, achievements, upgrades, rocket launchers
//! - `persistence`: Binary save/load with corruption detection
//! - `platform`: Browser/native platform abstraction (clock, storage)
//! - `tuning`: Data-driven game balance

pub mod persistence;
pub mod platform;
pub mod progression;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use persistence::{SaveData, SaveError};
pub use settings::Settings;
pub use sim::{GameState, Snapshot, TickInput, tick};

use glam::DVec2;
use std::f64::consts::TAU;

/// Game configuration constants
pub mod consts {
    /// Longest frame the simulation will integrate (seconds).
    /// Larger wall-clock gaps (tab in background) are clamped to this.
    pub const MAX_FRAME_DT: f64 = 1.0 / 30.0;
    /// dt used before the first real frame delta is known (0 would produce NaN)
    pub const INITIAL_DT: f64 = 0.0001;

    /// Planet outer radius in world units
    pub const PLANET_SIZE: f64 = 250.0;
    /// Seconds the destroyed planet lingers before respawning (scaled by reset multiplier)
    pub const DEATH_TIME: f64 = 0.75;

    /// Radius of the circle rockets spawn on
    pub const ORBIT_RADIUS: f64 = 1200.0;
    /// Default rocket body size
    pub const ROCKET_SIZE: f64 = 8.0;
    /// Base radial speed of a rocket (units/sec before scale)
    pub const ROCKET_BASE_SPEED: f64 = 500.0;
    /// Iteration budget for settling a rocket on the planet surface
    pub const COLLISION_STEP_LIMIT: u32 = 1000;
    /// Coordinates beyond this are treated as diverged and reset to origin
    pub const DIVERGENCE_LIMIT: f64 = 1e9;

    /// Lifetime of an impact explosion (seconds)
    pub const EXPLOSION_TIME: f64 = 0.5;
    /// Lifetime of a rocket trail puff (seconds)
    pub const TRAIL_EXPLOSION_TIME: f64 = 0.33;

    /// Seconds the aim marker stays visible after a click
    pub const TARGET_ACTIVE_TIME: f64 = 2.0;
    /// Seconds an achievement toast stays on screen
    pub const ACHIEVEMENT_TIME: f64 = 5.0;

    /// Level at which an epoch is worth one point
    pub const EPOCH_LEVEL: f64 = 100.0;
}

/// Shortest signed angular distance from `a0` to `a1`
#[inline]
pub fn short_angle_dist(a0: f64, a1: f64) -> f64 {
    let da = (a1 - a0) % TAU;
    (2.0 * da) % TAU - da
}

/// Interpolate between two angles along the shortest arc
#[inline]
pub fn angle_lerp(a0: f64, a1: f64, t: f64) -> f64 {
    a0 + short_angle_dist(a0, a1) * t
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Format a number for the HUD.
///
/// Values above one million switch to exponential notation with two
/// fraction digits (`1.23e+6`), everything else is fixed-point.
pub fn format_number(n: f64, digits: usize) -> String {
    if n > 1e6 {
        return format!("{:.2e}", n).replacen('e', "e+", 1);
    }
    format!("{:.*}", digits, n)
}
