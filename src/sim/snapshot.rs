//! Render contract
//!
//! The simulation never draws. Each frame every live entity with a visual
//! emits one [`Sprite`] to a [`Canvas`], and [`Snapshot`] summarizes the HUD.
//! Both serialize to JSON for the web front-end.

use glam::DVec2;
use serde::Serialize;

use super::effects::DecorationKind;
use super::overlay::Scene;
use super::planet::PlanetLayer;
use super::rocket::RocketFlags;
use super::state::{Base, GameState, Visual};
use crate::format_number;
use crate::progression::Currency;

/// One drawable thing, in planet-local units unless noted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sprite {
    Planet {
        layers: Vec<PlanetLayer>,
        core_radius: f64,
        scale: f64,
        destroyed: bool,
    },
    /// Aim marker, in device pixels
    Target { pos: DVec2, alpha: f64 },
    Rocket {
        pos: DVec2,
        size: f64,
        angle: f64,
        flags: RocketFlags,
    },
    Hit { pos: DVec2, radius: f64 },
    Explosion { pos: DVec2, radius: f64, alpha: f64 },
    Decoration {
        pos: DVec2,
        size: f64,
        angle: f64,
        decoration: DecorationKind,
    },
    /// HUD layer: scene plus the toast on screen
    Overlay {
        scene: Scene,
        achievement: Option<u8>,
        achievement_alpha: f64,
    },
}

/// Receives sprites in draw order
pub trait Canvas {
    fn draw(&mut self, sprite: &Sprite);
}

/// Canvas that keeps every sprite of the current frame
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub sprites: Vec<Sprite>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
    }
}

impl Canvas for FrameRecorder {
    fn draw(&mut self, sprite: &Sprite) {
        self.sprites.push(sprite.clone());
    }
}

/// Canvas that ignores everything
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn draw(&mut self, _sprite: &Sprite) {}
}

impl Visual {
    /// Build the sprite for an entity, or `None` if it has nothing to show
    pub fn sprite(&self, base: &Base, game: &GameState) -> Option<Sprite> {
        let scale = game.planet.scale;
        match (self, base) {
            (Visual::Planet, Base::Planet) => Some(Sprite::Planet {
                layers: game.planet.layers.clone(),
                core_radius: game.planet.core_radius(),
                scale,
                destroyed: game.planet.destroyed,
            }),
            (Visual::Target, Base::Target) => {
                if game.target.hidden {
                    return None;
                }
                Some(Sprite::Target {
                    pos: game.target.pos,
                    alpha: game.target.alpha(),
                })
            }
            (Visual::Overlay, Base::Overlay) => Some(Sprite::Overlay {
                scene: game.overlay.scene,
                achievement: game.overlay.current_achievement(),
                achievement_alpha: game.overlay.achievement_alpha(),
            }),
            (Visual::Rocket, Base::Rocket(r)) => Some(Sprite::Rocket {
                pos: r.pos,
                size: r.size / scale,
                angle: r.angle,
                flags: r.flags,
            }),
            (Visual::Hit, Base::Hit(h)) => Some(Sprite::Hit {
                pos: h.pos,
                radius: h.size / scale,
            }),
            (Visual::Explosion, Base::Explosion(e)) => Some(Sprite::Explosion {
                pos: e.pos,
                radius: e.size / scale,
                alpha: e.alpha(scale),
            }),
            (Visual::Decoration, Base::Decoration(d)) => Some(Sprite::Decoration {
                pos: d.pos,
                size: d.size / scale,
                angle: d.angle,
                decoration: d.kind,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeView {
    pub name: &'static str,
    pub label: &'static str,
    pub level: u32,
    pub cost: f64,
    pub cost_text: String,
    pub affordable: bool,
    pub maxed: bool,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LauncherView {
    pub layer: usize,
    pub index: usize,
    pub unlocked: bool,
    pub charge: f64,
    pub flags: RocketFlags,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChallengeView {
    pub name: &'static str,
    pub description: &'static str,
    pub reward: &'static str,
    pub running: bool,
    pub completed: bool,
    pub completed_time: Option<f64>,
}

/// HUD summary of the whole game for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub scene: Scene,
    pub score: f64,
    pub score_text: String,
    pub level: u32,
    pub background: String,
    pub shake: f64,
    pub pointer_over_planet: bool,
    pub epoch_points: f64,
    pub epoch_points_text: String,
    pub epoch_count: u32,
    /// Progress toward a one-point epoch in [0, 1]
    pub epoch_progress: f64,
    /// Points a new epoch would award right now
    pub epoch_gain: f64,
    pub in_challenge: bool,
    pub achievement: Option<AchievementToast>,
    pub upgrades: Vec<UpgradeView>,
    pub epoch_upgrades: Vec<UpgradeView>,
    pub launchers: Vec<LauncherView>,
    pub launchers_enabled: bool,
    pub challenges: Vec<ChallengeView>,
    pub dev_console: bool,
    /// Entity sprites in draw order
    pub sprites: Vec<Sprite>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementToast {
    pub name: &'static str,
    pub description: [&'static str; 2],
    pub reward: &'static str,
    pub alpha: f64,
}

impl Snapshot {
    /// Summarize `game`; `sprites` comes from the frame's canvas
    pub fn capture(game: &GameState, sprites: Vec<Sprite>) -> Self {
        let upgrade_views = |board: &crate::progression::UpgradeBoard| -> Vec<UpgradeView> {
            let funds = match board.currency {
                Currency::Score => game.score,
                Currency::EpochPoints => game.epoch.points,
            };
            board
                .items
                .iter()
                .map(|u| UpgradeView {
                    name: u.spec.name,
                    label: u.spec.label,
                    level: u.level,
                    cost: u.cost,
                    cost_text: format_number(u.cost, 0),
                    affordable: u.can_buy(funds),
                    maxed: u.is_maxed(),
                    description: u.describe(&game.planet, &game.epoch),
                })
                .collect()
        };

        let launchers = game
            .overlay
            .launchers
            .layers
            .iter()
            .enumerate()
            .flat_map(|(layer, row)| {
                row.iter().enumerate().map(move |(index, l)| LauncherView {
                    layer,
                    index,
                    unlocked: l.unlocked,
                    charge: l.charge(),
                    flags: l.spec.flags,
                })
            })
            .collect();

        let challenges = game
            .epoch
            .challenges
            .iter()
            .map(|c| ChallengeView {
                name: c.kind.name(),
                description: c.kind.description(),
                reward: c.kind.reward(),
                running: c.is_running(),
                completed: c.completed,
                completed_time: c.completed_time,
            })
            .collect();

        let achievement = game
            .overlay
            .current_achievement()
            .and_then(|id| game.achievements.get(id))
            .map(|a| AchievementToast {
                name: a.spec.name,
                description: a.spec.description,
                reward: a.spec.reward,
                alpha: game.overlay.achievement_alpha(),
            });

        Self {
            scene: game.overlay.scene,
            score: game.score,
            score_text: format_number(game.score, 0),
            level: game.level,
            background: game.background(),
            shake: game.shake,
            pointer_over_planet: game.target.hovered,
            epoch_points: game.epoch.points,
            epoch_points_text: format_number(game.epoch.points, 0),
            epoch_count: game.epoch.count,
            epoch_progress: game.epoch.calculate_progress(game.level),
            epoch_gain: game.epoch.calculate_points(game.level),
            in_challenge: game.epoch.is_in_challenge(),
            achievement,
            upgrades: upgrade_views(&game.overlay.upgrades),
            epoch_upgrades: upgrade_views(&game.overlay.epoch_upgrades),
            launchers,
            launchers_enabled: game.overlay.launchers.enabled,
            challenges,
            dev_console: game.dev_console,
            sprites,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::PlanetHit;

    #[test]
    fn test_recorder_collects_in_order() {
        let mut game = GameState::new(1);
        let mut rec = FrameRecorder::new();
        game.render(&mut rec);

        assert!(matches!(rec.sprites.first(), Some(Sprite::Decoration { .. })));
        assert!(matches!(rec.sprites.last(), Some(Sprite::Overlay { .. })));
        // Hidden target draws nothing
        assert!(!rec.sprites.iter().any(|s| matches!(s, Sprite::Target { .. })));
    }

    #[test]
    fn test_hit_draws_under_explosion() {
        let mut game = GameState::new(2);
        game.spawn_hit(PlanetHit::new(DVec2::new(0.0, 240.0), 20.0));
        let mut rec = FrameRecorder::new();
        game.render(&mut rec);

        let hit = rec.sprites.iter().position(|s| matches!(s, Sprite::Hit { .. }));
        let boom = rec.sprites.iter().position(|s| matches!(s, Sprite::Explosion { .. }));
        assert!(hit < boom);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut game = GameState::new(3);
        game.score = 2_500_000.0;
        let snap = Snapshot::capture(&game, Vec::new());
        assert_eq!(snap.score_text, "2.50e+6");
        assert_eq!(snap.upgrades.len(), 4);
        assert_eq!(snap.epoch_upgrades.len(), 6);
        assert_eq!(snap.launchers.len(), 8);
        assert!(snap.upgrades[0].affordable);

        let json = snap.to_json().unwrap();
        assert!(json.contains("\"scene\":\"Menu\""));
        assert!(json.contains("\"background\":\"#"));
    }

    #[test]
    fn test_sprite_tagging() {
        let sprite = Sprite::Hit {
            pos: DVec2::new(1.0, 2.0),
            radius: 3.0,
        };
        let json = serde_json::to_string(&sprite).unwrap();
        assert!(json.contains("\"kind\":\"hit\""));
    }
}
