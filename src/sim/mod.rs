//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module draws or touches the
//! platform:
//! - Variable frame step, clamped
//! - Seeded RNG only
//! - Stable iteration order (z-order, then spawn order)

pub mod collision;
pub mod effects;
pub mod entity;
pub mod overlay;
pub mod planet;
pub mod rocket;
pub mod snapshot;
pub mod state;
pub mod target;
pub mod tick;

pub use collision::{Circle, Collider, circle_intersects_circle};
pub use effects::{Decoration, DecorationKind, Explosion, PlanetHit};
pub use entity::{EntityId, Order, World};
pub use overlay::{Overlay, Scene};
pub use planet::{Planet, PlanetLayer, RespawnMode};
pub use rocket::{Rocket, RocketFlags};
pub use snapshot::{Canvas, FrameRecorder, NullCanvas, Snapshot, Sprite};
pub use state::{Base, GameState, Visual};
pub use target::Target;
pub use tick::{Command, FrameClock, Pointer, TickInput, Viewport, tick};
