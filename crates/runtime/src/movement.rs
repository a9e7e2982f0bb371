use crate::actor::Actor;
use crate::map::Map;
use crate::math::{Point, Rect, Vec2};
use crate::tileset::Tileset;

/// What a resolved move actually did. Blocked axes are ordinary
/// outcomes, not errors; the level fires the behavior's blocked hooks
/// off these flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Whole pixels travelled, per axis.
    pub moved: Point,
    pub blocked_x: bool,
    pub blocked_y: bool,
}

/// Advances the actor by `delta` pixels, one pixel at a time, x before
/// y. The fractional part of `delta` joins the actor's subpixel
/// remainder and is carried to later ticks, so sub-pixel speeds still
/// add up to whole-pixel motion. On the first refused step of an axis
/// the rest of that axis' pixels are discarded.
pub fn resolve_move(map: &Map, tileset: &Tileset, actor: &mut Actor, delta: Vec2) -> MoveOutcome {
    actor.remainder = actor.remainder + delta;
    let step = Point::new(
        actor.remainder.x.trunc() as i32,
        actor.remainder.y.trunc() as i32,
    );
    actor.remainder.x -= step.x as f32;
    actor.remainder.y -= step.y as f32;

    let mut outcome = MoveOutcome::default();

    let sign_x = step.x.signum();
    for _ in 0..step.x.abs() {
        if step_pixel(map, tileset, actor, Point::new(sign_x, 0)) {
            outcome.moved.x += sign_x;
        } else {
            outcome.blocked_x = true;
            break;
        }
    }

    let sign_y = step.y.signum();
    for _ in 0..step.y.abs() {
        if step_pixel(map, tileset, actor, Point::new(0, sign_y)) {
            outcome.moved.y += sign_y;
        } else {
            outcome.blocked_y = true;
            break;
        }
    }

    outcome
}

/// Attempts one single-pixel step along `sign` (a unit axis vector).
/// Commits the new position and returns true, or leaves the actor
/// untouched and returns false.
///
/// A step is refused when the destination hitbox would leave the
/// map's pixel rectangle, or when any blocking cell on a layer at or
/// below the actor's own overlaps the destination. Only the footprint
/// cells on the leading edge of travel are probed; layers are walked
/// nearest-first.
pub fn step_pixel(map: &Map, tileset: &Tileset, actor: &mut Actor, sign: Point) -> bool {
    let current = actor.world_hitbox();
    let destination = current.translated(sign);
    if !map.pixel_rect(tileset).contains_rect(&destination) {
        return false;
    }

    let cell = tileset.cell_size();
    let min_cx = current.x.div_euclid(cell.x);
    let max_cx = (current.right() - 1).div_euclid(cell.x);
    let min_cy = current.y.div_euclid(cell.y);
    let max_cy = (current.bottom() - 1).div_euclid(cell.y);

    // Leading edge: only the footprint column/row facing the travel
    // direction can gain new cell contacts on a one-pixel step.
    let (cx_first, cx_last, cy_first, cy_last) = if sign.x > 0 {
        (max_cx, max_cx, min_cy, max_cy)
    } else if sign.x < 0 {
        (min_cx, min_cx, min_cy, max_cy)
    } else if sign.y > 0 {
        (min_cx, max_cx, max_cy, max_cy)
    } else {
        (min_cx, max_cx, min_cy, min_cy)
    };

    let layers_checked = map.layer_count().min(actor.layer + 1);
    for layer in (0..layers_checked).rev() {
        for cy in cy_first..=cy_last {
            for cx in cx_first..=cx_last {
                let neighbor = Point::new(cx + sign.x, cy + sign.y);
                let index = match map.cell_at(layer, neighbor) {
                    Some(index) => index,
                    None => continue,
                };
                let neighbor_rect = Rect::new(
                    neighbor.x * cell.x,
                    neighbor.y * cell.y,
                    cell.x,
                    cell.y,
                );
                if neighbor_rect.intersects(&destination) && tileset.cell_flags(index).blocks() {
                    return false;
                }
            }
        }
    }

    actor.position = actor.position + sign;
    true
}
