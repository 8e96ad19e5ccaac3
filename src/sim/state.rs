//! Game state and orchestration
//!
//! `GameState` owns everything: the entity arena, the planet/target/overlay
//! singletons, progression, and the per-kind entity lists that the planet and
//! rockets iterate. All mutation goes through `&mut GameState`.

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::effects::{Decoration, Explosion, PlanetHit};
use super::entity::{Behavior, EntityId, Order, World};
use super::overlay::{Overlay, Scene};
use super::planet::Planet;
use super::rocket::Rocket;
use super::target::Target;
use crate::consts::*;
use crate::progression::{Achievements, ChallengeKind, ChallengeOutcome, Epoch, SpawnModifier};

/// Simulation/data slot of an entity
#[derive(Debug, Clone)]
pub enum Base {
    /// Marker; data lives in `GameState::planet`
    Planet,
    /// Marker; data lives in `GameState::target`
    Target,
    /// Marker; data lives in `GameState::overlay`
    Overlay,
    Rocket(Rocket),
    Hit(PlanetHit),
    Explosion(Explosion),
    Decoration(Decoration),
}

impl Behavior for Base {
    fn order(&self) -> Order {
        match self {
            Base::Planet => Order::Planet,
            Base::Target => Order::Default,
            Base::Overlay => Order::Overlay,
            Base::Rocket(_) => Order::Rocket,
            Base::Hit(_) => Order::PlanetHit,
            Base::Explosion(_) => Order::Explosion,
            Base::Decoration(_) => Order::Decoration,
        }
    }

    fn simulated(&self) -> bool {
        !matches!(self, Base::Hit(_) | Base::Decoration(_))
    }
}

/// Render slot of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visual {
    Planet,
    Target,
    Overlay,
    Rocket,
    Hit,
    Explosion,
    Decoration,
}

impl Visual {
    fn for_base(base: &Base) -> Self {
        match base {
            Base::Planet => Visual::Planet,
            Base::Target => Visual::Target,
            Base::Overlay => Visual::Overlay,
            Base::Rocket(_) => Visual::Rocket,
            Base::Hit(_) => Visual::Hit,
            Base::Explosion(_) => Visual::Explosion,
            Base::Decoration(_) => Visual::Decoration,
        }
    }
}

/// Complete game state
#[derive(Debug)]
pub struct GameState {
    /// RNG seed the game was created with
    pub seed: u64,
    pub world: World<Base, Visual>,
    pub planet: Planet,
    pub target: Target,
    pub overlay: Overlay,
    pub epoch: Epoch,
    pub achievements: Achievements,
    pub score: f64,
    pub level: u32,
    pub rockets: Vec<EntityId>,
    pub hits: Vec<EntityId>,
    pub explosions: Vec<EntityId>,
    pub decorations: Vec<EntityId>,
    /// Screen shake strength for the renderer
    pub shake: f64,
    /// Set by "The End"; exposes the game object on the web console
    pub dev_console: bool,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a fresh game on the main menu
    pub fn new(seed: u64) -> Self {
        let epoch = Epoch::new();
        let level = epoch.multipliers.level.round() as u32;
        let mut state = Self {
            seed,
            world: World::new(),
            planet: Planet::new(),
            target: Target::new(),
            overlay: Overlay::new(),
            epoch,
            achievements: Achievements::new(),
            score: 0.0,
            level,
            rockets: Vec::new(),
            hits: Vec::new(),
            explosions: Vec::new(),
            decorations: Vec::new(),
            shake: 0.0,
            dev_console: false,
            rng: Pcg32::seed_from_u64(seed),
        };

        state.spawn(Base::Overlay);
        state.spawn(Base::Planet);
        state.spawn(Base::Target);
        state
    }

    /// Add an entity with its matching visual and run its init hook
    pub fn spawn(&mut self, base: Base) -> EntityId {
        let ui = Visual::for_base(&base);
        let id = self.world.spawn(Some(base), Some(ui));
        self.init_entity(id);
        id
    }

    pub fn spawn_rocket(&mut self, rocket: Rocket) -> EntityId {
        self.spawn(Base::Rocket(rocket))
    }

    pub fn spawn_hit(&mut self, hit: PlanetHit) -> EntityId {
        self.spawn(Base::Hit(hit))
    }

    pub fn spawn_explosion(&mut self, pos: DVec2, size: f64, lifetime: f64) -> EntityId {
        self.spawn(Base::Explosion(Explosion::new(pos, size, lifetime)))
    }

    pub fn spawn_decoration(&mut self, decoration: Decoration) -> EntityId {
        self.spawn(Base::Decoration(decoration))
    }

    /// Register a freshly spawned entity in its list and run kind-specific setup
    fn init_entity(&mut self, id: EntityId) {
        let scale = self.planet.scale;
        let hit = match self.world.base_mut(id) {
            Some(Base::Planet) => {
                self.planet.update_colliders();
                self.update_palette();
                self.spawn_decorations();
                return;
            }
            Some(Base::Rocket(_)) => {
                self.rockets.push(id);
                return;
            }
            Some(Base::Explosion(_)) => {
                self.explosions.push(id);
                return;
            }
            Some(Base::Decoration(_)) => {
                self.decorations.push(id);
                return;
            }
            Some(Base::Hit(hit)) => {
                hit.update_collider(scale);
                hit.clone()
            }
            Some(Base::Target) | Some(Base::Overlay) | None => return,
        };

        // Craters flash on impact and may crack the core
        self.hits.push(id);
        self.spawn_explosion(hit.pos, hit.size, EXPLOSION_TIME);
        self.try_destroy_planet(&hit.collider);
    }

    fn clear_list(&mut self, list: Vec<EntityId>) {
        for id in list {
            self.world.destroy(id);
        }
    }

    pub fn clear_rockets(&mut self) {
        let list = std::mem::take(&mut self.rockets);
        self.clear_list(list);
    }

    pub fn clear_hits(&mut self) {
        let list = std::mem::take(&mut self.hits);
        self.clear_list(list);
    }

    pub fn clear_explosions(&mut self) {
        let list = std::mem::take(&mut self.explosions);
        self.clear_list(list);
    }

    pub fn clear_decorations(&mut self) {
        let list = std::mem::take(&mut self.decorations);
        self.clear_list(list);
    }

    pub fn clear_all(&mut self) {
        self.clear_rockets();
        self.clear_hits();
        self.clear_explosions();
        self.clear_decorations();
    }

    /// Start a new run: score, level, planet and score upgrades back to defaults
    pub fn reset(&mut self) {
        self.score = 0.0;
        self.level = self.epoch.multipliers.level.round() as u32;
        self.clear_all();
        self.reset_planet();
        self.overlay.upgrades.reset();
    }

    /// Leave the menu and start playing. A running challenge keeps its handicap.
    pub fn play(&mut self) {
        let handicap = self.epoch.current().map(|c| c.kind);
        self.planet.shoot_rockets = handicap != Some(ChallengeKind::Active);
        self.target.can_click = handicap != Some(ChallengeKind::Offline);
        self.overlay.scene = Scene::Game;
    }

    /// Unlock an achievement by name; toasts it when `show` is set.
    /// Already-unlocked achievements are ignored.
    pub fn unlock_achievement(&mut self, name: &str, show: bool) {
        let Some((id, effect)) = self.achievements.unlock(name) else {
            return;
        };
        log::info!("Achievement unlocked: {}", name);
        if show {
            self.overlay.push_achievement(id);
        }
        effect.apply(self);
    }

    /// Start challenge `index`. Any running challenge is abandoned first.
    pub fn start_challenge(&mut self, index: usize, now: f64) -> bool {
        let Some(kind) = self.epoch.challenges.get(index).map(|c| c.kind) else {
            log::debug!("No challenge at index {}", index);
            return false;
        };
        if self.epoch.current_challenge.is_some() {
            self.end_challenge(false, now);
        }

        self.epoch.challenges[index].begin(now);
        self.epoch.current_challenge = Some(index);
        self.planet.shoot_rockets = true;
        self.target.can_click = true;
        kind.on_start(self);
        self.overlay.scene = Scene::Game;
        log::info!("Challenge started: {}", kind.name());
        true
    }

    /// End the running challenge, rewarding a first completion
    pub fn end_challenge(&mut self, completed: bool, now: f64) {
        let Some(index) = self.epoch.current_challenge.take() else {
            return;
        };
        let Some(challenge) = self.epoch.challenges.get_mut(index) else {
            return;
        };
        let kind = challenge.kind;
        let outcome = challenge.finish(completed, now);
        if outcome == ChallengeOutcome::NotRunning {
            return;
        }

        kind.on_end(self);
        if let ChallengeOutcome::Completed { first_time } = outcome {
            log::info!("Challenge completed: {} (first time: {})", kind.name(), first_time);
            if first_time {
                kind.on_reward(self);
            }
        }
    }

    /// Trade the current level for epoch points and restart the run
    pub fn end_epoch(&mut self, now: f64) {
        if self.epoch.count == 0 {
            self.unlock_achievement("First Epoch", true);
        }
        self.epoch.count += 1;
        let gained = self.epoch.calculate_points(self.level);
        self.epoch.points += gained;
        log::info!(
            "Epoch {} ended at level {}: +{} points ({} total)",
            self.epoch.count,
            self.level,
            gained,
            self.epoch.points
        );

        self.reset();
        if self.epoch.points > 1_000_000.0 {
            self.unlock_achievement("Evolution", true);
        }

        // Resolve the challenge before locking input, so its on_end
        // can't re-enable auto-fire or the target on the epoch screen
        self.end_challenge(true, now);
        self.overlay.scene = Scene::Epoch;
        self.planet.shoot_rockets = false;
        self.target.can_click = false;
    }

    /// Buy one level of score upgrade `index`
    pub fn buy_upgrade(&mut self, index: usize) -> bool {
        let Some(upgrade) = self.overlay.upgrades.get_mut(index) else {
            return false;
        };
        if !upgrade.can_buy(self.score) {
            log::debug!("Can't buy {} (cost {}, score {})", upgrade.spec.name, upgrade.cost, self.score);
            return false;
        }
        self.score -= upgrade.cost;
        upgrade.level_up(&mut self.planet, &mut self.epoch);
        true
    }

    /// Buy one level of epoch upgrade `index` with epoch points
    pub fn buy_epoch_upgrade(&mut self, index: usize) -> bool {
        let Some(upgrade) = self.overlay.epoch_upgrades.get_mut(index) else {
            return false;
        };
        if !upgrade.can_buy(self.epoch.points) {
            log::debug!("Can't buy {} (cost {}, points {})", upgrade.spec.name, upgrade.cost, self.epoch.points);
            return false;
        }
        self.epoch.points -= upgrade.cost;
        upgrade.level_up(&mut self.planet, &mut self.epoch);
        true
    }

    /// Fire a manual launcher if it is unlocked, enabled and reloaded
    pub fn fire_launcher(&mut self, layer: usize, index: usize) -> bool {
        let Some(spec) = self.overlay.launchers.trigger(layer, index) else {
            return false;
        };

        let p = &self.planet;
        let damage = p.rocket_power * spec.damage;
        let speed = p.rocket_speed * spec.speed * self.epoch.multipliers.speed;
        let gravity = p.rocket_gravity * spec.gravity;
        let id = self.spawn_rocket_on_orbit(damage, speed, gravity, true);

        let Some(Base::Rocket(rocket)) = self.world.base_mut(id) else {
            return true;
        };
        rocket.size = spec.size;
        rocket.flags = spec.flags;
        match spec.modifier {
            SpawnModifier::None => {}
            SpawnModifier::Penetration(n) => rocket.penetration = n,
            SpawnModifier::Clones(n) => {
                let template = rocket.clone();
                self.spawn_rocket_clones(&template, n, false);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_singletons() {
        let game = GameState::new(42);
        assert_eq!(game.level, 1);
        assert_eq!(game.score, 0.0);
        assert_eq!(game.overlay.scene, Scene::Menu);
        assert!(!game.planet.shoot_rockets);
        assert!(!game.target.can_click);
        assert!(!game.planet.layers.is_empty());
        assert_eq!(game.decorations.len(), 30);
        assert!(game.rockets.is_empty());
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = GameState::new(9);
        let b = GameState::new(9);
        assert_eq!(a.planet.layers, b.planet.layers);
        assert_eq!(a.planet.palette, b.planet.palette);
    }

    #[test]
    fn test_hit_spawns_explosion() {
        let mut game = GameState::new(1);
        let id = game.spawn_hit(PlanetHit::new(DVec2::new(0.0, 240.0), 20.0));
        assert_eq!(game.hits, vec![id]);
        assert_eq!(game.explosions.len(), 1);
        assert!(!game.planet.destroyed);
    }

    #[test]
    fn test_clear_all_flags_everything() {
        let mut game = GameState::new(1);
        game.spawn_rocket_on_orbit(1.0, 1.0, 0.0, false);
        game.spawn_hit(PlanetHit::new(DVec2::new(0.0, 240.0), 20.0));
        let decoration = game.decorations[0];

        game.clear_all();
        assert!(game.rockets.is_empty() && game.hits.is_empty());
        assert!(game.explosions.is_empty() && game.decorations.is_empty());
        assert!(!game.world.is_alive(decoration));
        assert!(game.world.sweep() > 30);
    }

    #[test]
    fn test_play_enables_input() {
        let mut game = GameState::new(1);
        game.play();
        assert!(game.planet.shoot_rockets);
        assert!(game.target.can_click);
        assert_eq!(game.overlay.scene, Scene::Game);
    }

    #[test]
    fn test_play_keeps_challenge_handicap() {
        let mut game = GameState::new(1);
        game.start_challenge(1, 0.0);
        game.overlay.scene = Scene::Menu;
        game.play();
        assert!(!game.planet.shoot_rockets);
        assert!(game.target.can_click);
    }

    #[test]
    fn test_buy_upgrade_spends_score() {
        let mut game = GameState::new(1);
        game.score = 150.0;
        assert!(game.buy_upgrade(0));
        assert!((game.score - 50.0).abs() < 1e-9);
        assert_eq!(game.overlay.upgrades.items[0].level, 1);
        assert!(!game.buy_upgrade(0), "can't afford the second level");
        assert!(!game.buy_upgrade(17));
    }

    #[test]
    fn test_buy_epoch_upgrade_spends_points() {
        let mut game = GameState::new(1);
        game.epoch.points = 3.0;
        assert!(game.buy_epoch_upgrade(4));
        assert!(game.buy_epoch_upgrade(4));
        assert!(!game.buy_epoch_upgrade(4));
        assert_eq!(game.epoch.points, 0.0);
        assert!((game.epoch.penetration_chance - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_end_epoch_awards_points_and_resets() {
        let mut game = GameState::new(1);
        game.play();
        game.level = 100;
        game.score = 5000.0;
        game.overlay.upgrades.items[0].level = 3;

        game.end_epoch(0.0);
        assert_eq!(game.epoch.count, 1);
        assert_eq!(game.epoch.points, 1.0);
        assert_eq!(game.level, 1);
        assert_eq!(game.score, 0.0);
        assert_eq!(game.overlay.upgrades.items[0].level, 0);
        assert_eq!(game.overlay.scene, Scene::Epoch);
        assert!(!game.planet.shoot_rockets);
        assert!(!game.target.can_click);
        assert!(game.achievements.is_unlocked("First Epoch"));
        assert!((game.epoch.multipliers.reset - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_challenge_reward_at_most_once() {
        let mut game = GameState::new(1);
        // Active: reward halves the interval multiplier
        assert!(game.start_challenge(1, 10.0));
        assert!(!game.planet.shoot_rockets);
        game.level = 100;
        game.end_epoch(20.0);
        assert!(game.epoch.challenges[1].completed);
        assert_eq!(game.epoch.current_challenge, None);
        assert!((game.epoch.multipliers.interval - 0.5).abs() < 1e-12);
        // on_end must not leave auto-fire on for the epoch screen
        assert!(!game.planet.shoot_rockets);

        assert!(game.start_challenge(1, 30.0));
        game.end_epoch(40.0);
        assert!((game.epoch.multipliers.interval - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_abandoned_challenge_gives_nothing() {
        let mut game = GameState::new(1);
        game.start_challenge(2, 0.0);
        assert!((game.epoch.multipliers.speed - 0.1).abs() < 1e-12);
        game.end_challenge(false, 5.0);
        assert!(!game.epoch.challenges[2].completed);
        assert!((game.epoch.multipliers.speed - 1.0).abs() < 1e-12);
        assert_eq!(game.epoch.multipliers.level, 1.0);
    }

    #[test]
    fn test_starting_second_challenge_abandons_first() {
        let mut game = GameState::new(1);
        game.start_challenge(0, 0.0);
        game.start_challenge(1, 1.0);
        assert!(!game.epoch.challenges[0].is_running());
        assert!(game.epoch.challenges[1].is_running());
        // Offline's handicap was lifted
        assert!(game.overlay.launchers.enabled);
        assert_eq!(game.epoch.current_challenge, Some(1));
    }

    #[test]
    fn test_fire_launcher() {
        let mut game = GameState::new(1);
        game.play();
        assert!(!game.fire_launcher(0, 0), "not reloaded yet");
        game.overlay.update(1.0);
        assert!(game.fire_launcher(0, 0));
        assert_eq!(game.rockets.len(), 1);

        let Some(Base::Rocket(r)) = game.world.base(game.rockets[0]) else {
            panic!("rocket missing");
        };
        assert_eq!(r.size, 12.5);
        assert!((r.damage - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_clone_launcher_fans_out() {
        let mut game = GameState::new(1);
        game.play();
        game.overlay.launchers.unlock(1, 1);
        game.overlay.update(10.0);
        assert!(game.fire_launcher(1, 1));
        assert_eq!(game.rockets.len(), 25);
    }
}
