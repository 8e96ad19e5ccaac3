//! Game settings and preferences
//!
//! Persisted separately from game saves, as JSON in the key-value store.

use serde::{Deserialize, Serialize};

use crate::platform::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Shake the screen while the planet is exploding
    pub screen_shake: bool,

    // === Saves ===
    /// Seconds between automatic saves, 0 to save only on exit
    pub auto_save_interval: f64,
    /// Delete saves from an older format instead of refusing to load
    pub discard_outdated_saves: bool,

    // === Accessibility ===
    /// Reduced motion (no screen shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            auto_save_interval: 30.0,
            discard_outdated_saves: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "planet_destroyer_settings";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Shake strength to hand the renderer
    pub fn shake_amount(&self, shake: f64) -> f64 {
        if self.effective_screen_shake() { shake } else { 0.0 }
    }

    /// Whether an auto-save is due `elapsed` seconds after the last one
    pub fn auto_save_due(&self, elapsed: f64) -> bool {
        self.auto_save_interval > 0.0 && elapsed >= self.auto_save_interval
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings unavailable: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Failed to save settings: {}", e),
            },
            Err(e) => log::warn!("Failed to serialize settings: {}", e),
        }
    }
}
