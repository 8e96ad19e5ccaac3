//! Manual rocket launchers
//!
//! Extra rocket types fired on demand. Each launcher recharges in real time
//! and is unlocked by an achievement.

use serde::Serialize;

use crate::sim::RocketFlags;
use crate::tuning::LAUNCHER_LAYERS;

/// Extra behaviour applied to a freshly launched rocket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpawnModifier {
    None,
    /// Rocket survives this many impacts
    Penetration(u32),
    /// Also launch this many untargeted copies
    Clones(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct LauncherSpec {
    pub size: f64,
    /// Multiplier on the planet's rocket power
    pub damage: f64,
    /// Multiplier on the planet's rocket speed
    pub speed: f64,
    /// Multiplier on the planet's rocket gravity
    pub gravity: f64,
    pub flags: RocketFlags,
    pub modifier: SpawnModifier,
    /// Seconds between shots
    pub reload_time: f64,
    pub unlocked: bool,
}

#[derive(Debug, Clone)]
pub struct RocketLauncher {
    pub spec: &'static LauncherSpec,
    pub reload_time: f64,
    pub reload: f64,
    pub unlocked: bool,
}

impl RocketLauncher {
    pub fn new(spec: &'static LauncherSpec) -> Self {
        Self {
            spec,
            reload_time: spec.reload_time,
            reload: 0.0,
            unlocked: spec.unlocked,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.unlocked && self.reload >= self.reload_time
    }

    /// Reload fraction for the button dial
    pub fn charge(&self) -> f64 {
        if self.reload_time <= 0.0 {
            return 1.0;
        }
        (self.reload / self.reload_time).min(1.0)
    }
}

#[derive(Debug, Clone)]
pub struct LauncherRack {
    pub layers: Vec<Vec<RocketLauncher>>,
    /// Cleared while clicking is forbidden
    pub enabled: bool,
}

impl Default for LauncherRack {
    fn default() -> Self {
        Self::new()
    }
}

impl LauncherRack {
    pub fn new() -> Self {
        Self {
            layers: LAUNCHER_LAYERS
                .iter()
                .map(|layer| layer.iter().map(RocketLauncher::new).collect())
                .collect(),
            enabled: true,
        }
    }

    pub fn get(&self, layer: usize, index: usize) -> Option<&RocketLauncher> {
        self.layers.get(layer)?.get(index)
    }

    pub fn is_unlocked(&self, layer: usize, index: usize) -> bool {
        self.get(layer, index).is_some_and(|l| l.unlocked)
    }

    /// Unlock a launcher. Out-of-range positions are ignored.
    pub fn unlock(&mut self, layer: usize, index: usize) {
        if let Some(l) = self.layers.get_mut(layer).and_then(|row| row.get_mut(index)) {
            l.unlocked = true;
        }
    }

    /// Advance every unlocked launcher's reload by real time
    pub fn recharge(&mut self, dt: f64) {
        for launcher in self.layers.iter_mut().flatten() {
            if launcher.unlocked {
                launcher.reload = (launcher.reload + dt).min(launcher.reload_time);
            }
        }
    }

    /// Take the shot if the launcher is ready. Returns the spec to launch.
    pub fn trigger(&mut self, layer: usize, index: usize) -> Option<&'static LauncherSpec> {
        if !self.enabled {
            return None;
        }
        let launcher = self.layers.get_mut(layer)?.get_mut(index)?;
        if !launcher.is_ready() {
            return None;
        }
        launcher.reload = 0.0;
        Some(launcher.spec)
    }

    pub fn halve_reload_times(&mut self) {
        for launcher in self.layers.iter_mut().flatten() {
            launcher.reload_time /= 2.0;
            launcher.reload = launcher.reload.min(launcher.reload_time);
        }
    }
}
