use std::any::Any;
use std::sync::Arc;

use bitflags::bitflags;

use crate::level::Level;
use crate::math::{Point, Rect, Vec2};
use crate::sprite::{Frame, Sprite};

/// Stable handle to a live actor. Ids are never reused within a
/// level, so a stale handle simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct ActorIdAllocator {
    next: u64,
}

impl ActorIdAllocator {
    pub fn allocate(&mut self) -> ActorId {
        let id = ActorId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

bitflags! {
    /// Coarse grouping queried by gameplay code. An actor may belong
    /// to several classes at once.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ActorClass: u8 {
        const SOLID       = 0x01;
        const PLAYER      = 0x02;
        const COLLECTIBLE = 0x04;
    }
}

/// Pure per-actor simulation state. All decision-making lives in the
/// actor's `Behavior`; the level moves this struct around wholesale
/// while a behavior hook runs.
#[derive(Debug, Default)]
pub struct Actor {
    pub id: ActorId,
    pub class: ActorClass,
    /// Top-left anchor in world pixels.
    pub position: Point,
    /// Subpixel motion carried over between ticks, one axis each.
    pub remainder: Vec2,
    /// Pixels per second.
    pub velocity: Vec2,
    hitbox: Rect,
    pub layer: usize,
    pub draw_priority: i32,
    pub sprite: Option<Arc<Sprite>>,
    animation: Option<usize>,
    animation_time: f32,
    animation_looped: bool,
    pub visible: bool,
    pub running: bool,
    pub shadow: bool,
    pub health: i32,
    pub score: i32,
}

impl Actor {
    pub fn new(class: ActorClass, position: Point, hitbox: Rect) -> Self {
        Self {
            class,
            position,
            hitbox,
            visible: true,
            running: true,
            ..Self::default()
        }
    }

    /// The collision footprint, fixed at construction. Local to the
    /// actor's position anchor.
    pub fn hitbox(&self) -> Rect {
        self.hitbox
    }

    /// The footprint in world pixels.
    pub fn world_hitbox(&self) -> Rect {
        self.hitbox.translated(self.position)
    }

    /// Switches to a named animation. The playback timer resets only
    /// when the animation actually changes; re-requesting the current
    /// one keeps its phase. The loop flag is updated either way.
    /// Unknown names stop playback.
    pub fn play_animation(&mut self, name: &str, looped: bool) {
        let index = self
            .sprite
            .as_ref()
            .and_then(|sprite| sprite.animation_named(name));
        if index != self.animation {
            self.animation = index;
            self.animation_time = 0.0;
        }
        self.animation_looped = looped;
    }

    /// Clears playback; `current_frame` returns nothing until the
    /// next `play_animation`.
    pub fn stop_animation(&mut self) {
        self.animation = None;
        self.animation_time = 0.0;
    }

    pub fn advance_animation(&mut self, dt: f32) {
        if self.animation.is_some() {
            self.animation_time += dt;
        }
    }

    pub fn current_animation(&self) -> Option<usize> {
        self.animation
    }

    pub fn current_frame(&self) -> Option<Frame> {
        let sprite = self.sprite.as_ref()?;
        let animation = sprite.animation(self.animation?)?;
        sprite
            .frame_at(animation, self.animation_time, self.animation_looped)
            .copied()
    }
}

/// Per-kind decision logic, held alongside the actor state it drives.
/// Hooks get the actor checked out of the level, so they may call
/// back into `Level` freely; level queries will not see the actor
/// whose hook is running.
pub trait Behavior: Any {
    fn created(&mut self, _actor: &mut Actor, _level: &mut Level) {}

    fn update(&mut self, _actor: &mut Actor, _level: &mut Level, _dt: f32) {}

    fn destroyed(&mut self, _actor: &mut Actor, _level: &mut Level) {}

    /// Called once per resolved move when horizontal stepping hit a
    /// blocking cell. The default kills the axis motion so the
    /// remainder cannot re-trigger next tick.
    fn on_blocked_x(&mut self, actor: &mut Actor, _level: &mut Level) {
        actor.velocity.x = 0.0;
        actor.remainder.x = 0.0;
    }

    fn on_blocked_y(&mut self, actor: &mut Actor, _level: &mut Level) {
        actor.velocity.y = 0.0;
        actor.remainder.y = 0.0;
    }

    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rect;
    use crate::sprite::Animation;

    fn sprite_with_animations(names: &[&str]) -> Arc<Sprite> {
        let frames = vec![
            Frame {
                src: Rect::new(0, 0, 8, 8),
                duration: 0.2,
            };
            names.len()
        ];
        let animations = names
            .iter()
            .enumerate()
            .map(|(i, name)| Animation {
                name: (*name).to_string(),
                first_frame: i,
                frame_count: 1,
            })
            .collect();
        Arc::new(Sprite::new(frames, animations, Vec2::ZERO))
    }

    #[test]
    fn ids_are_never_reused() {
        let mut allocator = ActorIdAllocator::default();
        let a = allocator.allocate();
        let b = allocator.allocate();
        let c = allocator.allocate();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(a.raw() < b.raw() && b.raw() < c.raw());
    }

    #[test]
    fn play_animation_keeps_phase_when_unchanged() {
        let mut actor = Actor::new(ActorClass::PLAYER, Point::ZERO, Rect::new(0, 0, 8, 8));
        actor.sprite = Some(sprite_with_animations(&["idle", "walk"]));

        actor.play_animation("walk", true);
        actor.advance_animation(0.15);
        actor.play_animation("walk", false);
        assert_eq!(actor.animation_time, 0.15);
        assert!(!actor.animation_looped);

        actor.play_animation("idle", true);
        assert_eq!(actor.animation_time, 0.0);
        assert!(actor.animation_looped);
    }

    #[test]
    fn unknown_animation_name_stops_playback() {
        let mut actor = Actor::new(ActorClass::PLAYER, Point::ZERO, Rect::new(0, 0, 8, 8));
        actor.sprite = Some(sprite_with_animations(&["idle"]));

        actor.play_animation("idle", true);
        assert!(actor.current_frame().is_some());
        actor.play_animation("teleport", true);
        assert!(actor.current_frame().is_none());
    }

    #[test]
    fn world_hitbox_follows_position() {
        let mut actor = Actor::new(ActorClass::SOLID, Point::new(10, 20), Rect::new(2, 3, 4, 5));
        assert_eq!(actor.world_hitbox(), Rect::new(12, 23, 4, 5));
        actor.position = Point::new(-1, 0);
        assert_eq!(actor.world_hitbox(), Rect::new(1, 3, 4, 5));
    }

    #[test]
    fn advance_without_animation_is_inert() {
        let mut actor = Actor::new(ActorClass::SOLID, Point::ZERO, Rect::new(0, 0, 8, 8));
        actor.advance_animation(1.0);
        assert!(actor.current_frame().is_none());
    }
}
