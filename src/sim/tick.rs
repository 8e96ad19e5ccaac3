//! Per-frame simulation tick
//!
//! One variable step per frame callback. Commands from the UI are applied
//! first, then every live entity is updated and drawn in z-order, then
//! destroyed entities are swept.

use super::entity::EntityId;
use super::snapshot::Canvas;
use super::state::{Base, GameState};
use crate::consts::{INITIAL_DT, MAX_FRAME_DT};

/// Pointer state in device pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    pub held: bool,
}

/// Canvas size in device pixels and the planet-to-screen scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
            scale: 1.0,
        }
    }
}

/// Turns wall-clock timestamps into clamped frame deltas
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta for a frame at `now` seconds. The first frame after construction
    /// or [`FrameClock::reset`] gets a tiny step so nothing jumps.
    pub fn advance(&mut self, now: f64) -> f64 {
        let dt = match self.last {
            Some(last) => (now - last).clamp(0.0, MAX_FRAME_DT),
            None => INITIAL_DT,
        };
        self.last = Some(now);
        dt
    }

    /// Forget the last timestamp, e.g. when the window regains focus
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// UI intent queued for the next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Leave the main menu
    Play,
    OpenEpoch,
    OpenChallenges,
    StartChallenge(usize),
    /// Give up on the running challenge
    EndChallenge,
    /// Trade the level for epoch points (needs enough progress)
    NewEpoch,
    /// Leave the epoch screen
    StartEpoch,
    BuyUpgrade(usize),
    BuyEpochUpgrade(usize),
    FireLauncher { layer: usize, index: usize },
}

/// Everything the front-end feeds into one tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub pointer: Pointer,
    pub viewport: Viewport,
    pub commands: Vec<Command>,
    /// Wall clock in seconds, used for challenge timing
    pub now: f64,
}

impl GameState {
    /// Apply one UI command. Returns false if it was rejected.
    pub fn apply_command(&mut self, command: Command, now: f64) -> bool {
        use super::overlay::Scene;

        let accepted = match command {
            Command::Play | Command::StartEpoch => {
                self.play();
                true
            }
            Command::OpenEpoch => {
                self.overlay.scene = Scene::Epoch;
                true
            }
            Command::OpenChallenges => {
                self.overlay.scene = Scene::Challenges;
                true
            }
            Command::StartChallenge(index) => self.start_challenge(index, now),
            Command::EndChallenge => {
                let running = self.epoch.is_in_challenge();
                self.end_challenge(false, now);
                running
            }
            Command::NewEpoch => {
                if self.epoch.can_end(self.level) {
                    self.end_epoch(now);
                    true
                } else {
                    false
                }
            }
            Command::BuyUpgrade(index) => self.buy_upgrade(index),
            Command::BuyEpochUpgrade(index) => self.buy_epoch_upgrade(index),
            Command::FireLauncher { layer, index } => self.fire_launcher(layer, index),
        };
        if !accepted {
            log::debug!("Command rejected: {:?}", command);
        }
        accepted
    }

    /// Update (and optionally draw) every live entity once, then sweep
    fn run_entities(&mut self, input: &TickInput, dt: f64, mut canvas: Option<&mut dyn Canvas>) {
        // Entities spawned during the pass wait for the next frame
        for id in self.world.ordered() {
            let Some(entity) = self.world.get(id) else {
                continue;
            };
            if entity.destroyed {
                continue;
            }

            if entity.simulated {
                let Some(mut base) = self.world.take_base(id) else {
                    continue;
                };
                match &mut base {
                    Base::Planet => self.update_planet(dt),
                    Base::Target => {
                        let time = self.time_multiplier();
                        self.target.update(dt, &input.pointer, &input.viewport, time);
                    }
                    Base::Overlay => self.overlay.update(dt),
                    Base::Rocket(rocket) => self.update_rocket(id, rocket, dt),
                    Base::Explosion(explosion) => self.update_explosion(id, explosion, dt),
                    Base::Hit(_) | Base::Decoration(_) => {}
                }
                self.world.put_base(id, base);
            }

            if let Some(canvas) = canvas.as_deref_mut() {
                self.draw_entity(id, canvas);
            }
        }

        self.world.sweep();
    }

    fn draw_entity(&self, id: EntityId, canvas: &mut dyn Canvas) {
        let Some(entity) = self.world.get(id) else {
            return;
        };
        if entity.destroyed {
            return;
        }
        let (Some(visual), Some(base)) = (entity.ui.as_ref(), entity.base.as_ref()) else {
            return;
        };
        if let Some(sprite) = visual.sprite(base, self) {
            canvas.draw(&sprite);
        }
    }

    /// Draw every live entity without advancing the simulation
    pub fn render(&mut self, canvas: &mut dyn Canvas) {
        for id in self.world.ordered() {
            self.draw_entity(id, canvas);
        }
    }

    #[cfg(test)]
    pub fn step_entities(&mut self, dt: f64) {
        self.run_entities(&TickInput::default(), dt, None);
    }
}

/// Advance the game by one frame of `dt` seconds and draw it to `canvas`
pub fn tick(state: &mut GameState, input: &TickInput, dt: f64, canvas: &mut dyn Canvas) {
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    for &command in &input.commands {
        state.apply_command(command, input.now);
    }
    state.run_entities(input, dt, Some(canvas));
}
