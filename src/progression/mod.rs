//! Long-term progression
//!
//! Everything that survives a planet respawn: epochs, challenges,
//! achievements, purchasable upgrades and the manual rocket launchers.

pub mod achievement;
pub mod challenge;
pub mod epoch;
pub mod launcher;
pub mod upgrade;

pub use achievement::{Achievement, AchievementEffect, Achievements};
pub use challenge::{Challenge, ChallengeKind, ChallengeOutcome};
pub use epoch::{Epoch, Multipliers};
pub use launcher::{LauncherRack, LauncherSpec, RocketLauncher, SpawnModifier};
pub use upgrade::{Currency, Upgrade, UpgradeBoard, UpgradeSpec};
