use std::any::Any;

use tracing::debug;

use crate::actor::{Actor, ActorClass, ActorId, Behavior};
use crate::level::Level;
use crate::math::{Point, Rect};
use crate::tileset::CellFlags;

const HITBOX: Rect = Rect {
    x: 2,
    y: 8,
    w: 12,
    h: 8,
};
const MAX_HEALTH: i32 = 100;
const DAMAGE_PER_SECOND: f32 = 25.0;
const HEAL_PER_SECOND: f32 = 10.0;

/// The player avatar. Velocity is set from outside (input layer);
/// this behavior handles animation choice, terrain damage/healing
/// under the hitbox center, and collecting capsules on contact.
pub struct Player {
    damage_accum: f32,
    heal_accum: f32,
}

pub(super) fn construct(level: &Level, _argument: i32) -> (Actor, Box<dyn Behavior>) {
    let mut actor = Actor::new(ActorClass::PLAYER | ActorClass::SOLID, Point::ZERO, HITBOX);
    actor.sprite = level.sprite("player");
    actor.shadow = true;
    actor.health = MAX_HEALTH;
    actor.play_animation("idle", true);
    (
        actor,
        Box::new(Player {
            damage_accum: 0.0,
            heal_accum: 0.0,
        }),
    )
}

impl Player {
    fn apply_cell_effects(&mut self, actor: &mut Actor, level: &Level, dt: f32) {
        let cell_size = match level.tileset() {
            Some(tileset) => tileset.cell_size(),
            None => return,
        };
        let hitbox = actor.world_hitbox();
        let center = Point::new(hitbox.x + hitbox.w / 2, hitbox.y + hitbox.h / 2);
        let cell = Point::new(
            center.x.div_euclid(cell_size.x),
            center.y.div_euclid(cell_size.y),
        );
        let flags = level.combined_cell_flags(cell, actor.layer);

        if flags.contains(CellFlags::DAMAGING) {
            self.damage_accum += DAMAGE_PER_SECOND * dt;
            let whole = self.damage_accum as i32;
            if whole > 0 {
                self.damage_accum -= whole as f32;
                actor.health = (actor.health - whole).max(0);
            }
        } else {
            self.damage_accum = 0.0;
        }

        if flags.contains(CellFlags::HEALING) {
            self.heal_accum += HEAL_PER_SECOND * dt;
            let whole = self.heal_accum as i32;
            if whole > 0 {
                self.heal_accum -= whole as f32;
                actor.health = (actor.health + whole).min(MAX_HEALTH);
            }
        } else {
            self.heal_accum = 0.0;
        }
    }

    fn collect_capsules(&mut self, actor: &mut Actor, level: &mut Level) {
        let hitbox = actor.world_hitbox();
        let collected: Vec<ActorId> = level
            .actors_of_class(ActorClass::COLLECTIBLE)
            .iter()
            .filter(|other| other.world_hitbox().intersects(&hitbox))
            .map(|other| other.id)
            .collect();
        for id in collected {
            level.destroy_actor(id);
            actor.score += 1;
            debug!(score = actor.score, "player_collected_capsule");
        }
    }
}

impl Behavior for Player {
    fn update(&mut self, actor: &mut Actor, level: &mut Level, dt: f32) {
        if actor.velocity.x != 0.0 || actor.velocity.y != 0.0 {
            actor.play_animation("walk", true);
        } else {
            actor.play_animation("idle", true);
        }
        self.apply_cell_effects(actor, level, dt);
        self.collect_capsules(actor, level);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
