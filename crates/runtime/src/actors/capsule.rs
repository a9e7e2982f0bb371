use std::any::Any;

use crate::actor::{Actor, ActorClass, Behavior};
use crate::level::Level;
use crate::math::{Point, Rect};

const HITBOX: Rect = Rect {
    x: 2,
    y: 2,
    w: 12,
    h: 12,
};
/// Capsules float a little above their spawn cell.
const RAISE_PIXELS: i32 = 4;

/// Collectible pickup. Inert on its own; the player destroys it on
/// contact.
pub struct Capsule;

pub(super) fn construct(level: &Level, _argument: i32) -> (Actor, Box<dyn Behavior>) {
    let mut actor = Actor::new(ActorClass::COLLECTIBLE, Point::ZERO, HITBOX);
    actor.sprite = level.sprite("capsule");
    actor.shadow = true;
    (actor, Box::new(Capsule))
}

impl Behavior for Capsule {
    fn created(&mut self, actor: &mut Actor, _level: &mut Level) {
        actor.position.y -= RAISE_PIXELS;
        actor.play_animation("idle", true);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
