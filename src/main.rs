//! Planet Destroyer entry point
//!
//! On the web the page script owns the canvas and drives a `WebGame` once per
//! animation frame. Natively the game runs headless under a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::prelude::*;

    use planet_destroyer::persistence::{self, LoadOutcome, SaveError};
    use planet_destroyer::platform::{KeyValueStore, LocalStore, MemoryStore, now_seconds};
    use planet_destroyer::sim::{Command, FrameClock, FrameRecorder, Pointer, Snapshot, TickInput, Viewport};
    use planet_destroyer::{GameState, Settings, tick};

    fn alert(message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    fn confirm(message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStore::open() {
            Some(store) => Box::new(store),
            None => {
                log::warn!("LocalStorage unavailable, progress won't be kept");
                Box::new(MemoryStore::new())
            }
        }
    }

    fn parse_command(name: &str, a: u32, b: u32) -> Option<Command> {
        let (a, b) = (a as usize, b as usize);
        Some(match name {
            "play" => Command::Play,
            "open_epoch" => Command::OpenEpoch,
            "open_challenges" => Command::OpenChallenges,
            "start_challenge" => Command::StartChallenge(a),
            "end_challenge" => Command::EndChallenge,
            "new_epoch" => Command::NewEpoch,
            "start_epoch" => Command::StartEpoch,
            "buy_upgrade" => Command::BuyUpgrade(a),
            "buy_epoch_upgrade" => Command::BuyEpochUpgrade(a),
            "fire_launcher" => Command::FireLauncher { layer: a, index: b },
            _ => return None,
        })
    }

    #[wasm_bindgen]
    pub struct WebGame {
        state: GameState,
        settings: Settings,
        store: Box<dyn KeyValueStore>,
        clock: FrameClock,
        input: TickInput,
        recorder: FrameRecorder,
        last_save: f64,
    }

    #[wasm_bindgen]
    impl WebGame {
        #[wasm_bindgen(constructor)]
        pub fn new() -> WebGame {
            let mut store = open_store();
            let settings = Settings::load(store.as_ref());
            let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
            let mut state = GameState::new(seed);
            log::info!("Game initialized with seed: {}", seed);

            match persistence::load_game(store.as_mut(), &mut state, settings.discard_outdated_saves) {
                Ok(LoadOutcome::Loaded) => log::info!("Loaded save at level {}", state.level),
                Ok(_) => {}
                Err(SaveError::VersionMismatch { .. }) => {
                    if confirm("This save is from an older version of the game. Do you want to delete it?") {
                        let _ = store.remove(persistence::SAVE_KEY);
                    }
                }
                Err(e @ SaveError::InvalidEncoding(_)) => alert(&e.to_string()),
                Err(_) => {}
            }

            WebGame {
                state,
                settings,
                store,
                clock: FrameClock::new(),
                input: TickInput::default(),
                recorder: FrameRecorder::new(),
                last_save: now_seconds(),
            }
        }

        /// Canvas size in device pixels and planet scale
        pub fn resize(&mut self, width: f64, height: f64, scale: f64) {
            self.input.viewport = Viewport { width, height, scale };
        }

        pub fn pointer(&mut self, x: f64, y: f64, held: bool) {
            self.input.pointer = Pointer { x, y, held };
        }

        /// Queue a UI command for the next frame. Unknown names are ignored.
        pub fn command(&mut self, name: &str, a: u32, b: u32) -> bool {
            match parse_command(name, a, b) {
                Some(command) => {
                    self.input.commands.push(command);
                    true
                }
                None => {
                    log::warn!("Unknown command: {}", name);
                    false
                }
            }
        }

        /// Call when the window regains focus so the first delta stays small
        pub fn focus(&mut self) {
            self.clock.reset();
        }

        /// Advance one animation frame and return the snapshot as JSON
        pub fn frame(&mut self, time_ms: f64) -> String {
            let dt = self.clock.advance(time_ms / 1000.0);
            self.input.now = now_seconds();
            self.recorder.clear();
            tick(&mut self.state, &self.input, dt, &mut self.recorder);
            self.input.commands.clear();

            if self.settings.auto_save_due(self.input.now - self.last_save) {
                self.save();
            }

            let mut snapshot = Snapshot::capture(&self.state, std::mem::take(&mut self.recorder.sprites));
            snapshot.shake = self.settings.shake_amount(snapshot.shake);
            snapshot.to_json().unwrap_or_else(|e| {
                log::error!("Snapshot serialization failed: {}", e);
                String::from("{}")
            })
        }

        pub fn save(&mut self) {
            self.last_save = now_seconds();
            if let Err(e) = persistence::save_game(self.store.as_mut(), &self.state) {
                log::warn!("Save failed: {}", e);
            }
        }

        /// Save string for manual backup
        pub fn export_save(&self) -> String {
            persistence::SaveData::capture(&self.state).to_base64()
        }

        /// Load a pasted save string; alerts on a bad one
        pub fn import_save(&mut self, text: &str) -> bool {
            match persistence::SaveData::from_base64(text) {
                Ok(data) => {
                    self.state.restore(&data);
                    true
                }
                Err(e) => {
                    alert(&e.to_string());
                    false
                }
            }
        }

        pub fn settings_json(&self) -> String {
            serde_json::to_string(&self.settings).unwrap_or_default()
        }

        pub fn set_settings_json(&mut self, json: &str) -> bool {
            match serde_json::from_str(json) {
                Ok(settings) => {
                    self.settings = settings;
                    self.settings.save(self.store.as_mut());
                    true
                }
                Err(e) => {
                    log::warn!("Rejected settings: {}", e);
                    false
                }
            }
        }
    }

    impl Default for WebGame {
        fn default() -> Self {
            Self::new()
        }
    }

    pub fn init() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }
        log::info!("Planet Destroyer starting...");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::init();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use planet_destroyer::persistence;
    use planet_destroyer::platform::{FileStore, now_seconds};
    use planet_destroyer::sim::{Command, NullCanvas, Pointer, Scene, TickInput, Viewport};
    use planet_destroyer::{GameState, Settings, tick};

    const DT: f64 = 1.0 / 30.0;

    /// Commands a patient player would issue this frame
    fn plan(state: &GameState) -> Vec<Command> {
        let mut commands = Vec::new();
        match state.overlay.scene {
            Scene::Menu | Scene::Challenges => commands.push(Command::Play),
            Scene::Epoch => {
                for (i, u) in state.overlay.epoch_upgrades.items.iter().enumerate() {
                    if u.can_buy(state.epoch.points) {
                        commands.push(Command::BuyEpochUpgrade(i));
                    }
                }
                commands.push(Command::StartEpoch);
            }
            Scene::Game => {
                if state.epoch.can_end(state.level) {
                    commands.push(Command::NewEpoch);
                    return commands;
                }
                let cheapest = state
                    .overlay
                    .upgrades
                    .items
                    .iter()
                    .enumerate()
                    .filter(|(_, u)| u.can_buy(state.score))
                    .min_by(|(_, a), (_, b)| a.cost.total_cmp(&b.cost));
                if let Some((i, _)) = cheapest {
                    commands.push(Command::BuyUpgrade(i));
                }
                for (layer, row) in state.overlay.launchers.layers.iter().enumerate() {
                    for (index, launcher) in row.iter().enumerate() {
                        if launcher.unlocked && launcher.is_ready() {
                            commands.push(Command::FireLauncher { layer, index });
                        }
                    }
                }
            }
        }
        commands
    }

    pub fn run(seconds: f64, data_dir: &str) {
        let mut store = FileStore::new(data_dir);
        let settings = Settings::load(&store);
        let seed = now_seconds().to_bits();
        let mut state = GameState::new(seed);
        log::info!("Game initialized with seed: {}", seed);

        if let Err(e) = persistence::load_game(&mut store, &mut state, settings.discard_outdated_saves) {
            log::warn!("Starting fresh: {}", e);
        }

        let viewport = Viewport::default();
        let frames = (seconds / DT).ceil() as u64;
        let mut game_time = 0.0;
        let mut last_save = 0.0;
        for frame in 0..frames {
            // Click the planet centre now and then to steer rockets
            let pointer = Pointer {
                x: viewport.width / 2.0 + 100.0,
                y: viewport.height / 2.0,
                held: frame % 90 < 3,
            };
            let input = TickInput {
                pointer,
                viewport,
                commands: plan(&state),
                now: now_seconds(),
            };
            tick(&mut state, &input, DT, &mut NullCanvas);
            game_time += DT;

            if settings.auto_save_due(game_time - last_save) {
                last_save = game_time;
                if let Err(e) = persistence::save_game(&mut store, &state) {
                    log::warn!("Auto-save failed: {}", e);
                }
            }
            if frame % (30 * 60) == 0 {
                log::info!(
                    "t={:.0}s level {} score {} epoch {} ({} points)",
                    game_time,
                    state.level,
                    planet_destroyer::format_number(state.score, 0),
                    state.epoch.count,
                    state.epoch.points
                );
            }
        }

        if let Err(e) = persistence::save_game(&mut store, &state) {
            log::error!("Final save failed: {}", e);
        }
        log::info!(
            "Finished at level {} with {}/{} achievements",
            state.level,
            state.achievements.unlocked_count(),
            state.achievements.len()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Planet Destroyer (native) starting...");

    let mut args = std::env::args().skip(1);
    let seconds = args.next().and_then(|s| s.parse::<f64>().ok()).unwrap_or(600.0);
    let data_dir = args.next().unwrap_or_else(|| String::from(".planet-destroyer"));
    autopilot::run(seconds, &data_dir);
}
