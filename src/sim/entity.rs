//! Entity runtime
//!
//! A flat arena of entities addressed by generational ids. Each entity has two
//! optional slots: a simulation/data `base` and a render-side `ui`. Entities
//! are never removed mid-frame; `destroy` only raises a flag and the slot is
//! reclaimed at the next `sweep`.

use serde::{Deserialize, Serialize};

/// Generational handle to an entity slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

impl EntityId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}g{}", self.index, self.generation)
    }
}

/// Draw/update order. Lower values run (and paint) first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Order {
    Decoration = 0,
    Planet = 1,
    PlanetHit = 2,
    Default = 3,
    Explosion = 4,
    Rocket = 5,
    Overlay = 6,
}

/// What the arena needs to know about a base component at spawn time
pub trait Behavior {
    /// z-order for the owning entity
    fn order(&self) -> Order;
    /// Whether this kind has a per-frame update
    fn simulated(&self) -> bool;
}

/// A live entity
#[derive(Debug)]
pub struct Entity<B, V> {
    pub order: Order,
    pub destroyed: bool,
    pub base: Option<B>,
    pub ui: Option<V>,
    /// Decided once at spawn from the base kind
    pub simulated: bool,
    seq: u64,
}

#[derive(Debug)]
struct Slot<B, V> {
    generation: u32,
    entity: Option<Entity<B, V>>,
}

/// Arena of entities plus a cached z-ordered id list
#[derive(Debug)]
pub struct World<B, V> {
    slots: Vec<Slot<B, V>>,
    free: Vec<u32>,
    ordered: Vec<EntityId>,
    sorted: bool,
    next_seq: u64,
    live: usize,
}

impl<B: Behavior, V> World<B, V> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            ordered: Vec::new(),
            sorted: true,
            next_seq: 0,
            live: 0,
        }
    }

    /// Insert a new entity. Order and update capability come from the base.
    pub fn spawn(&mut self, base: Option<B>, ui: Option<V>) -> EntityId {
        let (order, simulated) = match &base {
            Some(b) => (b.order(), b.simulated()),
            None => (Order::Default, false),
        };
        let entity = Entity {
            order,
            destroyed: false,
            base,
            ui,
            simulated,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entity = Some(entity);
            EntityId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entity: Some(entity),
            });
            EntityId::new(index, 0)
        };

        self.ordered.push(id);
        self.sorted = false;
        self.live += 1;
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity<B, V>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity<B, V>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    /// Base component of a live entity
    pub fn base(&self, id: EntityId) -> Option<&B> {
        self.get(id).and_then(|e| e.base.as_ref())
    }

    pub fn base_mut(&mut self, id: EntityId) -> Option<&mut B> {
        self.get_mut(id).and_then(|e| e.base.as_mut())
    }

    /// Move the base out of its slot so it can be updated against the rest of
    /// the game. Must be paired with [`World::put_base`].
    pub fn take_base(&mut self, id: EntityId) -> Option<B> {
        self.get_mut(id).and_then(|e| e.base.take())
    }

    pub fn put_base(&mut self, id: EntityId, base: B) {
        if let Some(e) = self.get_mut(id) {
            e.base = Some(base);
        }
    }

    /// Flag an entity for removal at the next sweep
    pub fn destroy(&mut self, id: EntityId) {
        if let Some(e) = self.get_mut(id) {
            e.destroyed = true;
        }
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(|e| !e.destroyed)
    }

    /// Ids of every entity in ascending z-order, spawn order within a layer.
    ///
    /// Returns an owned copy so callers can spawn while walking it.
    pub fn ordered(&mut self) -> Vec<EntityId> {
        if !self.sorted {
            let slots = &self.slots;
            self.ordered.sort_by_key(|id| {
                slots[id.index as usize]
                    .entity
                    .as_ref()
                    .map(|e| (e.order, e.seq))
                    .unwrap_or((Order::Overlay, u64::MAX))
            });
            self.sorted = true;
        }
        self.ordered.clone()
    }

    /// Drop every destroyed entity, clearing its slots. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let mut removed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entity.as_ref().is_some_and(|e| e.destroyed) {
                slot.entity = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                removed += 1;
            }
        }
        if removed > 0 {
            let slots = &self.slots;
            self.ordered.retain(|id| {
                let slot = &slots[id.index as usize];
                slot.generation == id.generation && slot.entity.is_some()
            });
            self.live -= removed;
        }
        removed
    }

    /// Number of entities currently in the arena (destroyed ones included until swept)
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl<B: Behavior, V> Default for World<B, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Dummy {
        Ground,
        Missile(u32),
        Overlay,
    }

    impl Behavior for Dummy {
        fn order(&self) -> Order {
            match self {
                Dummy::Ground => Order::Planet,
                Dummy::Missile(_) => Order::Rocket,
                Dummy::Overlay => Order::Overlay,
            }
        }

        fn simulated(&self) -> bool {
            !matches!(self, Dummy::Ground)
        }
    }

    #[test]
    fn test_spawn_and_lookup() {
        let mut world: World<Dummy, ()> = World::new();
        let a = world.spawn(Some(Dummy::Missile(1)), None);
        let b = world.spawn(Some(Dummy::Ground), Some(()));
        assert_eq!(world.len(), 2);
        assert_eq!(world.base(a), Some(&Dummy::Missile(1)));
        assert!(world.get(a).is_some_and(|e| e.simulated));
        assert!(world.get(b).is_some_and(|e| !e.simulated && e.ui.is_some()));
    }

    #[test]
    fn test_ordered_by_z_then_spawn() {
        let mut world: World<Dummy, ()> = World::new();
        let overlay = world.spawn(Some(Dummy::Overlay), None);
        let r1 = world.spawn(Some(Dummy::Missile(1)), None);
        let ground = world.spawn(Some(Dummy::Ground), None);
        let r2 = world.spawn(Some(Dummy::Missile(2)), None);

        assert_eq!(world.ordered(), vec![ground, r1, r2, overlay]);
    }

    #[test]
    fn test_destroy_is_deferred_until_sweep() {
        let mut world: World<Dummy, ()> = World::new();
        let a = world.spawn(Some(Dummy::Missile(1)), None);
        world.destroy(a);

        assert!(!world.is_alive(a));
        assert!(world.get(a).is_some(), "slot kept until sweep");
        assert_eq!(world.sweep(), 1);
        assert!(world.get(a).is_none());
        assert!(world.ordered().is_empty());
        assert!(world.is_empty());
    }

    #[test]
    fn test_stale_id_after_reuse() {
        let mut world: World<Dummy, ()> = World::new();
        let a = world.spawn(Some(Dummy::Missile(1)), None);
        world.destroy(a);
        world.sweep();

        let b = world.spawn(Some(Dummy::Missile(2)), None);
        assert_eq!(b.index, a.index);
        assert_ne!(b.generation, a.generation);
        assert!(world.get(a).is_none());
        assert_eq!(world.base(b), Some(&Dummy::Missile(2)));

        // Destroying through the stale id must not touch the new occupant
        world.destroy(a);
        assert!(world.is_alive(b));
    }

    #[test]
    fn test_take_and_put_base() {
        let mut world: World<Dummy, ()> = World::new();
        let a = world.spawn(Some(Dummy::Missile(7)), None);
        let mut base = world.take_base(a).unwrap();
        assert!(world.base(a).is_none());
        if let Dummy::Missile(n) = &mut base {
            *n += 1;
        }
        world.put_base(a, base);
        assert_eq!(world.base(a), Some(&Dummy::Missile(8)));
    }

    #[test]
    fn test_spawn_during_walk_not_in_snapshot() {
        let mut world: World<Dummy, ()> = World::new();
        let a = world.spawn(Some(Dummy::Missile(1)), None);
        let snapshot = world.ordered();
        let b = world.spawn(Some(Dummy::Missile(2)), None);
        assert_eq!(snapshot, vec![a]);
        assert_eq!(world.ordered(), vec![a, b]);
    }
}
