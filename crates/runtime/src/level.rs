use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::actor::{Actor, ActorClass, ActorId, ActorIdAllocator, Behavior};
use crate::map::Map;
use crate::math::{Point, Rect, Vec2};
use crate::movement::{self, MoveOutcome};
use crate::sprite::Sprite;
use crate::tileset::{CellFlags, Tileset};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("unknown actor type \"{type_name}\"")]
    UnknownActorType { type_name: String },
    #[error("no map/tileset loaded")]
    LevelNotLoaded,
}

/// Builds one actor kind: the state struct plus the behavior driving
/// it. Runs before the actor enters the live list, so it may read the
/// level (sprite library, map) but not mutate it.
pub type ActorConstructor = Box<dyn Fn(&Level, i32) -> (Actor, Box<dyn Behavior>)>;

/// Name-to-constructor registry used by `spawn_actor` and by map
/// spawn records.
#[derive(Default)]
pub struct ActorFactory {
    constructors: HashMap<String, ActorConstructor>,
}

impl ActorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_name: &str, constructor: ActorConstructor) {
        self.constructors.insert(type_name.to_string(), constructor);
    }

    pub fn constructor(&self, type_name: &str) -> Option<&ActorConstructor> {
        self.constructors.get(type_name)
    }
}

struct Slot {
    id: ActorId,
    actor: Actor,
    behavior: Option<Box<dyn Behavior>>,
    /// Set while the actor's state is lent out to a running hook.
    /// Checked-out slots are invisible to queries and iteration.
    checked_out: bool,
}

/// Owns the loaded map/tileset and every live actor. All mutation of
/// the actor list funnels through here; behaviors get their actor
/// checked out of its slot for the duration of a hook, so they can
/// call back into the level freely.
pub struct Level {
    map: Option<Map>,
    tileset: Option<Tileset>,
    slots: Vec<Slot>,
    pending_destroy: Vec<ActorId>,
    ids: ActorIdAllocator,
    factory: ActorFactory,
    sprites: HashMap<String, Arc<Sprite>>,
    rng: StdRng,
}

impl Level {
    pub fn new(factory: ActorFactory) -> Self {
        Self::with_seed(factory, rand::random())
    }

    /// Like `new` but with a fixed RNG seed, so spawn sampling is
    /// reproducible.
    pub fn with_seed(factory: ActorFactory, seed: u64) -> Self {
        Self {
            map: None,
            tileset: None,
            slots: Vec::new(),
            pending_destroy: Vec::new(),
            ids: ActorIdAllocator::default(),
            factory,
            sprites: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn map(&self) -> Option<&Map> {
        self.map.as_ref()
    }

    pub fn tileset(&self) -> Option<&Tileset> {
        self.tileset.as_ref()
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn add_sprite(&mut self, name: &str, sprite: Arc<Sprite>) {
        self.sprites.insert(name.to_string(), sprite);
    }

    pub fn sprite(&self, name: &str) -> Option<Arc<Sprite>> {
        self.sprites.get(name).cloned()
    }

    /// Installs a map/tileset pair and instantiates its spawn
    /// records. Replaces the whole actor population. Only safe to
    /// call between ticks.
    pub fn load(&mut self, map: Map, tileset: Tileset) -> Result<(), SpawnError> {
        self.slots.clear();
        self.pending_destroy.clear();
        self.map = Some(map);
        self.tileset = Some(tileset);
        self.instantiate_spawns()?;
        info!(
            actor_count = self.slots.len(),
            layer_count = self.map.as_ref().map(Map::layer_count).unwrap_or(0),
            "level_loaded"
        );
        Ok(())
    }

    /// Throws away all live actors and re-instantiates the current
    /// map's spawn records. Only safe to call between ticks.
    pub fn reset(&mut self) -> Result<(), SpawnError> {
        self.slots.clear();
        self.pending_destroy.clear();
        if self.map.is_some() {
            self.instantiate_spawns()?;
        }
        Ok(())
    }

    fn instantiate_spawns(&mut self) -> Result<(), SpawnError> {
        let spawns: Vec<_> = self
            .map
            .as_ref()
            .map(|map| map.spawns().to_vec())
            .unwrap_or_default();
        for spawn in spawns {
            self.spawn_at_cell(&spawn.actor_type, spawn.cell, spawn.layer, spawn.argument)?;
        }
        Ok(())
    }

    /// Creates an actor at a pixel position, runs its `created` hook,
    /// and enters it into the live list.
    pub fn spawn_actor(
        &mut self,
        type_name: &str,
        position: Point,
        layer: usize,
        argument: i32,
    ) -> Result<ActorId, SpawnError> {
        let (mut actor, mut behavior) = match self.factory.constructor(type_name) {
            Some(constructor) => constructor(self, argument),
            None => {
                return Err(SpawnError::UnknownActorType {
                    type_name: type_name.to_string(),
                })
            }
        };
        let id = self.ids.allocate();
        actor.id = id;
        actor.position = position;
        actor.layer = layer;

        // Reserve the slot first so `created` can spawn, query, and
        // destroy; the placeholder stays invisible until restore.
        self.slots.push(Slot {
            id,
            actor: Actor::default(),
            behavior: None,
            checked_out: true,
        });
        behavior.created(&mut actor, self);
        self.restore(id, actor, behavior);
        debug!(actor_type = type_name, actor_id = id.raw(), "actor_spawned");
        Ok(id)
    }

    /// `spawn_actor` with the position given in grid cells. Requires
    /// a loaded tileset for the cell size.
    pub fn spawn_at_cell(
        &mut self,
        type_name: &str,
        cell: Point,
        layer: usize,
        argument: i32,
    ) -> Result<ActorId, SpawnError> {
        let cell_size = match self.tileset.as_ref() {
            Some(tileset) => tileset.cell_size(),
            None => return Err(SpawnError::LevelNotLoaded),
        };
        let position = Point::new(cell.x * cell_size.x, cell.y * cell_size.y);
        self.spawn_actor(type_name, position, layer, argument)
    }

    /// Queues the actor for removal at the start of the next update.
    /// Idempotent; unknown ids are ignored. The slot survives until
    /// its `destroyed` hook runs, but the actor disappears from
    /// queries and rendering immediately.
    pub fn destroy_actor(&mut self, id: ActorId) {
        if self.slot_index(id).is_some() && !self.pending_destroy.contains(&id) {
            self.pending_destroy.push(id);
        }
    }

    pub fn destroy_all_actors(&mut self) {
        let ids: Vec<ActorId> = self.slots.iter().map(|slot| slot.id).collect();
        for id in ids {
            self.destroy_actor(id);
        }
    }

    /// One simulation tick: sweep the destroy queue (running
    /// `destroyed` hooks exactly once), then for every actor that was
    /// live at tick start run its behavior update, integrate its
    /// velocity through the collision resolver, and advance its
    /// animation clock.
    pub fn update(&mut self, dt: f32) {
        self.sweep_destroyed();

        let tick_ids: Vec<ActorId> = self.slots.iter().map(|slot| slot.id).collect();
        for id in tick_ids {
            if self.pending_destroy.contains(&id) {
                continue;
            }
            let (mut actor, mut behavior) = match self.checkout(id) {
                Some(pair) => pair,
                None => continue,
            };
            if actor.running {
                behavior.update(&mut actor, self, dt);
                let delta = actor.velocity * dt;
                let outcome = self.resolve_motion(&mut actor, delta);
                if outcome.blocked_x {
                    behavior.on_blocked_x(&mut actor, self);
                }
                if outcome.blocked_y {
                    behavior.on_blocked_y(&mut actor, self);
                }
                actor.advance_animation(dt);
            }
            self.restore(id, actor, behavior);
        }
    }

    fn sweep_destroyed(&mut self) {
        let mut pending = std::mem::take(&mut self.pending_destroy);
        pending.sort();
        pending.dedup();
        for id in pending {
            let index = match self.slot_index(id) {
                Some(index) => index,
                None => continue,
            };
            let slot = self.slots.remove(index);
            let mut actor = slot.actor;
            if let Some(mut behavior) = slot.behavior {
                behavior.destroyed(&mut actor, self);
            }
        }
    }

    /// Moves an actor through the collision resolver, firing its
    /// blocked hooks. A defensive no-op when the id does not resolve
    /// or no map/tileset is loaded.
    pub fn move_actor(&mut self, id: ActorId, delta: Vec2) -> MoveOutcome {
        if self.map.is_none() || self.tileset.is_none() {
            warn!(actor_id = id.raw(), "level_move_without_loaded_map");
            return MoveOutcome::default();
        }
        let (mut actor, mut behavior) = match self.checkout(id) {
            Some(pair) => pair,
            None => return MoveOutcome::default(),
        };
        let outcome = self.resolve_motion(&mut actor, delta);
        if outcome.blocked_x {
            behavior.on_blocked_x(&mut actor, self);
        }
        if outcome.blocked_y {
            behavior.on_blocked_y(&mut actor, self);
        }
        self.restore(id, actor, behavior);
        outcome
    }

    fn resolve_motion(&self, actor: &mut Actor, delta: Vec2) -> MoveOutcome {
        match (self.map.as_ref(), self.tileset.as_ref()) {
            (Some(map), Some(tileset)) => movement::resolve_move(map, tileset, actor, delta),
            _ => MoveOutcome::default(),
        }
    }

    /// Live actors in insertion order. Skips actors lent out to a
    /// running hook and actors pending destruction.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.slots
            .iter()
            .filter(|slot| !slot.checked_out && !self.pending_destroy.contains(&slot.id))
            .map(|slot| &slot.actor)
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.slots
            .iter()
            .find(|slot| slot.id == id && !slot.checked_out)
            .filter(|slot| !self.pending_destroy.contains(&id))
            .map(|slot| &slot.actor)
    }

    /// Mutable access for the outer layers (input binding writes the
    /// player's velocity here). Not available while the actor is lent
    /// out to a hook.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        if self.pending_destroy.contains(&id) {
            return None;
        }
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id && !slot.checked_out)
            .map(|slot| &mut slot.actor)
    }

    pub fn first_of_class(&self, class: ActorClass) -> Option<&Actor> {
        self.actors().find(|actor| actor.class.intersects(class))
    }

    pub fn actors_of_class(&self, class: ActorClass) -> Vec<&Actor> {
        self.actors()
            .filter(|actor| actor.class.intersects(class))
            .collect()
    }

    pub fn first_behavior<T: Behavior>(&self) -> Option<(&Actor, &T)> {
        self.behaviors_of::<T>().into_iter().next()
    }

    pub fn behaviors_of<T: Behavior>(&self) -> Vec<(&Actor, &T)> {
        self.slots
            .iter()
            .filter(|slot| !slot.checked_out && !self.pending_destroy.contains(&slot.id))
            .filter_map(|slot| {
                let behavior = slot.behavior.as_ref()?.as_any().downcast_ref::<T>()?;
                Some((&slot.actor, behavior))
            })
            .collect()
    }

    /// First live actor other than `exclude` whose world hitbox
    /// overlaps `rect`.
    pub fn first_overlap(&self, rect: Rect, exclude: ActorId) -> Option<&Actor> {
        self.actors()
            .find(|actor| actor.id != exclude && actor.world_hitbox().intersects(&rect))
    }

    /// Flags of every map cell stacked at `cell` on layers at or
    /// below `layer`, merged.
    pub fn combined_cell_flags(&self, cell: Point, layer: usize) -> CellFlags {
        let (map, tileset) = match (self.map.as_ref(), self.tileset.as_ref()) {
            (Some(map), Some(tileset)) => (map, tileset),
            _ => return CellFlags::empty(),
        };
        let mut combined = CellFlags::empty();
        for index in 0..map.layer_count().min(layer + 1) {
            if let Some(cell_index) = map.cell_at(index, cell) {
                combined |= tileset.cell_flags(cell_index);
            }
        }
        combined
    }

    /// Whether an actor may legally be placed on `cell`: walkable
    /// ground with no wall or hazard, and inside the map.
    pub fn cell_allows_occupancy(&self, cell: Point, layer: usize) -> bool {
        match self.map.as_ref() {
            Some(map) if map.in_bounds(cell) => {
                self.combined_cell_flags(cell, layer).allows_occupancy()
            }
            _ => false,
        }
    }

    fn slot_index(&self, id: ActorId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    fn checkout(&mut self, id: ActorId) -> Option<(Actor, Box<dyn Behavior>)> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.id == id && !slot.checked_out)?;
        let behavior = slot.behavior.take()?;
        slot.checked_out = true;
        Some((std::mem::take(&mut slot.actor), behavior))
    }

    fn restore(&mut self, id: ActorId, actor: Actor, behavior: Box<dyn Behavior>) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == id) {
            slot.actor = actor;
            slot.behavior = Some(behavior);
            slot.checked_out = false;
        }
    }
}
