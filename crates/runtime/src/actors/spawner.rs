use std::any::Any;

use rand::Rng;
use tracing::{debug, warn};

use crate::actor::{Actor, ActorClass, Behavior};
use crate::level::Level;
use crate::math::{Point, Rect};

/// Candidate cells sampled per child before giving up on that child.
const RETRY_BUDGET: u32 = 32;

/// Invisible one-shot emitter: on creation it scatters its argument's
/// worth of capsules across legal cells, then goes inert. A crowded
/// map simply yields fewer capsules.
pub struct Spawner {
    count: i32,
}

pub(super) fn construct(_level: &Level, argument: i32) -> (Actor, Box<dyn Behavior>) {
    let actor = Actor::new(ActorClass::empty(), Point::ZERO, Rect::new(0, 0, 0, 0));
    (actor, Box::new(Spawner { count: argument }))
}

impl Spawner {
    fn place_one(&self, actor: &Actor, level: &mut Level) -> bool {
        let (map_size, cell_size) = match (level.map(), level.tileset()) {
            (Some(map), Some(tileset)) => (map.size(), tileset.cell_size()),
            _ => return false,
        };
        if map_size.x <= 0 || map_size.y <= 0 {
            return false;
        }

        for _ in 0..RETRY_BUDGET {
            let cell = {
                let rng = level.rng();
                Point::new(rng.gen_range(0..map_size.x), rng.gen_range(0..map_size.y))
            };
            if !level.cell_allows_occupancy(cell, actor.layer) {
                continue;
            }
            let cell_rect = Rect::new(
                cell.x * cell_size.x,
                cell.y * cell_size.y,
                cell_size.x,
                cell_size.y,
            );
            if level.first_overlap(cell_rect, actor.id).is_some() {
                continue;
            }
            match level.spawn_at_cell("capsule", cell, actor.layer, 0) {
                Ok(_) => return true,
                Err(err) => {
                    warn!(error = %err, "spawner_child_spawn_failed");
                    return false;
                }
            }
        }
        false
    }
}

impl Behavior for Spawner {
    fn created(&mut self, actor: &mut Actor, level: &mut Level) {
        let mut placed = 0;
        for _ in 0..self.count.max(0) {
            if self.place_one(actor, level) {
                placed += 1;
            }
        }
        if placed < self.count {
            debug!(
                requested = self.count,
                placed, "spawner_placement_budget_exhausted"
            );
        }
        actor.visible = false;
        actor.running = false;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
