//! Save/load persistence
//!
//! Features:
//! - Versioned little-endian binary format
//! - Every read bounds-checked; a bad buffer never touches the live game
//! - Base64 transport in a key-value store
//! - Restore replays every owned effect from defaults

pub mod codec;

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::platform::{KeyValueStore, StorageError};
use crate::progression::ChallengeKind;
use crate::sim::{GameState, RespawnMode};
use codec::{ByteReader, ByteWriter};

pub const SAVE_VERSION: u8 = 1;
/// Storage key of the save string
pub const SAVE_KEY: &str = "save";

/// Upper bound on planet respawns replayed when loading. Higher saved levels
/// keep their level but the planet stops growing here.
const MAX_REPLAYED_GROWTHS: u32 = 100_000;

#[derive(Debug)]
pub enum SaveError {
    /// Ran past the end of the buffer, or met a value that can't be decoded
    Corrupted { offset: usize, len: usize },
    VersionMismatch { found: u8, expected: u8 },
    InvalidEncoding(base64::DecodeError),
    Storage(String),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted { offset, len } => {
                write!(f, "Save is corrupted (offset {} of {} bytes)", offset, len)
            }
            Self::VersionMismatch { found, expected } => {
                write!(f, "Save is from version {}, expected {}", found, expected)
            }
            Self::InvalidEncoding(e) => write!(f, "Invalid save string: {}", e),
            Self::Storage(msg) => write!(f, "Storage unavailable: {}", msg),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEncoding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<base64::DecodeError> for SaveError {
    fn from(e: base64::DecodeError) -> Self {
        Self::InvalidEncoding(e)
    }
}

impl From<StorageError> for SaveError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeRecord {
    pub kind: ChallengeKind,
    pub completed: bool,
    pub completed_time: Option<f64>,
    /// Set while the challenge is running
    pub start_time: Option<f64>,
}

/// Decoded save file. Nothing here is live state.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveData {
    pub level: u32,
    pub score: f64,
    pub upgrades: Vec<u8>,
    pub epoch_upgrades: Vec<u8>,
    pub epoch_count: u32,
    pub epoch_points: f64,
    pub challenges: Vec<ChallengeRecord>,
    /// Index of the running challenge
    pub selected_challenge: Option<usize>,
    /// `(achievement id, unlocked)`
    pub achievements: Vec<(u8, bool)>,
}

fn level_byte(level: u32) -> u8 {
    u8::try_from(level).unwrap_or(u8::MAX)
}

impl SaveData {
    pub fn capture(game: &GameState) -> Self {
        let challenges = game
            .epoch
            .challenges
            .iter()
            .map(|c| ChallengeRecord {
                kind: c.kind,
                completed: c.completed,
                completed_time: c.completed_time,
                start_time: c.start_time,
            })
            .collect();

        Self {
            level: game.level,
            score: game.score,
            upgrades: game.overlay.upgrades.levels().into_iter().map(level_byte).collect(),
            epoch_upgrades: game
                .overlay
                .epoch_upgrades
                .levels()
                .into_iter()
                .map(level_byte)
                .collect(),
            epoch_count: game.epoch.count,
            epoch_points: game.epoch.points,
            challenges,
            selected_challenge: game.epoch.current_challenge,
            achievements: game.achievements.iter().map(|a| (a.id, a.is_unlocked())).collect(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_u8(SAVE_VERSION);
        w.write_u32(self.level);
        w.write_f64(self.score);

        w.write_u8_list(&self.upgrades);
        w.write_u8_list(&self.epoch_upgrades);

        w.write_u32(self.epoch_count);
        w.write_f64(self.epoch_points);
        w.write_u8(self.challenges.len().min(u8::MAX as usize) as u8);
        for record in self.challenges.iter().take(u8::MAX as usize) {
            w.write_u8(record.kind.tag());
            w.write_bool(record.completed);
            if record.completed {
                w.write_f64(record.completed_time.unwrap_or(0.0));
            }
            w.write_bool(record.start_time.is_some());
            if let Some(start) = record.start_time {
                w.write_f64(start);
            }
        }
        w.write_u8(self.selected_challenge.map_or(0, |i| (i + 1).min(u8::MAX as usize) as u8));

        w.write_u8(self.achievements.len().min(u8::MAX as usize) as u8);
        for &(id, unlocked) in self.achievements.iter().take(u8::MAX as usize) {
            w.write_u8(id);
            w.write_bool(unlocked);
        }
        w.into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SaveError> {
        let mut r = ByteReader::new(bytes);
        let version = r.read_u8()?;
        if version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                found: version,
                expected: SAVE_VERSION,
            });
        }

        let level = r.read_u32()?;
        let score = r.read_f64()?;
        let upgrades = r.read_u8_list()?;
        let epoch_upgrades = r.read_u8_list()?;

        let epoch_count = r.read_u32()?;
        let epoch_points = r.read_f64()?;
        let n = r.read_u8()?;
        let mut challenges = Vec::with_capacity(n as usize);
        for _ in 0..n {
            let tag = r.read_u8()?;
            let kind = ChallengeKind::from_tag(tag).ok_or(SaveError::Corrupted {
                offset: r.offset(),
                len: bytes.len(),
            })?;
            let completed = r.read_bool()?;
            let completed_time = if completed { Some(r.read_f64()?) } else { None };
            let start_time = if r.read_bool()? { Some(r.read_f64()?) } else { None };
            challenges.push(ChallengeRecord {
                kind,
                completed,
                completed_time,
                start_time,
            });
        }
        let selected_challenge = match r.read_u8()? {
            0 => None,
            n => Some(n as usize - 1),
        };

        let n = r.read_u8()?;
        let mut achievements = Vec::with_capacity(n as usize);
        for _ in 0..n {
            achievements.push((r.read_u8()?, r.read_bool()?));
        }

        if r.remaining() > 0 {
            log::warn!("Ignoring {} trailing bytes in save", r.remaining());
        }

        Ok(Self {
            level,
            score,
            upgrades,
            epoch_upgrades,
            epoch_count,
            epoch_points,
            challenges,
            selected_challenge,
            achievements,
        })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.encode())
    }

    pub fn from_base64(text: &str) -> Result<Self, SaveError> {
        let bytes = STANDARD.decode(text.trim())?;
        Self::decode(&bytes)
    }
}

impl GameState {
    /// Rebuild the game from a save. Starts from a fresh game with the same
    /// seed and replays every owned effect, so derived multipliers and planet
    /// stats come out the same as when the save was made.
    pub fn restore(&mut self, data: &SaveData) {
        *self = GameState::new(self.seed);

        self.epoch.count = data.epoch_count;
        self.epoch.points = data.epoch_points;

        for record in &data.challenges {
            let Some(challenge) = self.epoch.challenges.iter_mut().find(|c| c.kind == record.kind) else {
                continue;
            };
            challenge.completed = record.completed;
            challenge.completed_time = record.completed_time;
            if record.completed {
                record.kind.on_reward(self);
            }
        }

        for &(id, unlocked) in &data.achievements {
            if !unlocked {
                continue;
            }
            match self.achievements.unlock_id(id) {
                Some(effect) => effect.apply(self),
                None => log::warn!("Unknown achievement id {} in save", id),
            }
        }

        // Epoch upgrades first: they set the cost multiplier score upgrades price with
        for (upgrade, &level) in self.overlay.epoch_upgrades.items.iter_mut().zip(&data.epoch_upgrades) {
            upgrade.level = level as u32;
        }
        self.overlay.epoch_upgrades.replay(&mut self.planet, &mut self.epoch);

        for (upgrade, &level) in self.overlay.upgrades.items.iter_mut().zip(&data.upgrades) {
            let level = level as u32;
            upgrade.level = upgrade.spec.max_level.map_or(level, |max| level.min(max));
        }
        self.overlay.upgrades.replay(&mut self.planet, &mut self.epoch);

        if let Some(index) = data.selected_challenge {
            let start = data.challenges.iter().find_map(|r| {
                let kind = self.epoch.challenges.get(index)?.kind;
                (r.kind == kind).then_some(r.start_time).flatten()
            });
            if let Some(start) = start {
                self.epoch.challenges[index].begin(start);
                self.epoch.current_challenge = Some(index);
                let kind = self.epoch.challenges[index].kind;
                kind.on_start(self);
            }
        }

        self.replay_planet_growth(data.level);
        self.level = data.level;
        self.score = data.score;
        log::info!(
            "Save restored: level {}, epoch {}, {} achievements",
            self.level,
            self.epoch.count,
            self.achievements.unlocked_count()
        );
    }

    /// Grow the planet as many times as it took to reach `level`
    fn replay_planet_growth(&mut self, level: u32) {
        let step = (self.epoch.multipliers.level.round() as u32).max(1);
        let start = self.level;
        let mut growths = level.saturating_sub(start) / step;
        if growths > MAX_REPLAYED_GROWTHS {
            log::warn!(
                "Save level {} needs {} planet growths, replaying only {}",
                level,
                growths,
                MAX_REPLAYED_GROWTHS
            );
            growths = MAX_REPLAYED_GROWTHS;
        }
        for _ in 0..growths.saturating_sub(1) {
            self.respawn_planet(RespawnMode::Partial);
        }
        if growths >= 1 {
            self.respawn_planet(RespawnMode::Restore);
        }
    }
}

/// Result of looking for a save at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    NoSave,
    /// Outdated save removed per settings
    Discarded,
}

/// Load the stored save into `game`. On error `game` is left as it was.
pub fn load_game(
    store: &mut dyn KeyValueStore,
    game: &mut GameState,
    discard_outdated: bool,
) -> Result<LoadOutcome, SaveError> {
    let Some(text) = store.get(SAVE_KEY)? else {
        log::info!("No save found, starting fresh");
        return Ok(LoadOutcome::NoSave);
    };

    match SaveData::from_base64(&text) {
        Ok(data) => {
            game.restore(&data);
            Ok(LoadOutcome::Loaded)
        }
        Err(SaveError::VersionMismatch { found, expected }) if discard_outdated => {
            log::warn!("Discarding save from version {} (current {})", found, expected);
            store.remove(SAVE_KEY)?;
            Ok(LoadOutcome::Discarded)
        }
        Err(e) => {
            log::error!("Failed to load save: {}", e);
            Err(e)
        }
    }
}

pub fn save_game(store: &mut dyn KeyValueStore, game: &GameState) -> Result<(), SaveError> {
    let data = SaveData::capture(game);
    store.set(SAVE_KEY, &data.to_base64())?;
    log::info!("Game saved at level {}", game.level);
    Ok(())
}
