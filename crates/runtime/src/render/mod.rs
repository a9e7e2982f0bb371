//! Software renderer: paints a loaded level into a caller-owned
//! `Pixmap`. No window or GPU surface; the embedding layer decides
//! where the frame goes.

mod pixmap;

pub use pixmap::{Color, Pixmap, PixmapError};

use crate::actor::Actor;
use crate::level::Level;
use crate::math::Point;
use crate::tileset::CellFlags;

const TRANSLUCENT_TINT: Color = [255, 255, 255, 160];
const SHADOW_TINT: Color = [0, 0, 0, 128];
const SHADOW_OFFSET: Point = Point { x: 1, y: 2 };
const HITBOX_OUTLINE: Color = [0, 255, 0, 255];

/// Paints the map layers in stacking order, interleaving each
/// layer's actors between its cell rows. An actor is drawn right after the
/// first row whose bottom edge its feet line (position plus hitbox
/// bottom) has reached, so terrain below an actor's feet paints over
/// it and terrain above paints under it. Within a row actors order
/// by `draw_priority`, ties by spawn order. `offset` is the scroll
/// offset applied to everything drawn.
pub fn render_level(frame: &mut Pixmap, level: &Level, offset: Point, debug_overlay: bool) {
    let (map, tileset) = match (level.map(), level.tileset()) {
        (Some(map), Some(tileset)) => (map, tileset),
        _ => return,
    };
    let cell = tileset.cell_size();
    let size = map.size();
    let last_layer = map.layer_count().saturating_sub(1);

    for (layer_index, layer) in map.layers().iter().enumerate() {
        // Actors beyond the top layer draw with it.
        let mut actors: Vec<&Actor> = level
            .actors()
            .filter(|actor| actor.visible && actor.layer.min(last_layer) == layer_index)
            .collect();
        actors.sort_by_key(|actor| actor.draw_priority);
        let mut drawn = vec![false; actors.len()];

        for row in 0..size.y {
            for col in 0..size.x {
                let index = layer.cells[(row * size.x + col) as usize];
                let src = tileset.cell_src_rect(index);
                let dst = Point::new(col * cell.x + offset.x, row * cell.y + offset.y);
                if tileset.cell_flags(index).contains(CellFlags::TRANSLUCENT) {
                    frame.blit_tinted(tileset.sheet(), src, dst, TRANSLUCENT_TINT);
                } else {
                    frame.blit(tileset.sheet(), src, dst);
                }
            }
            let row_bottom = (row + 1) * cell.y;
            for (slot, actor) in actors.iter().enumerate() {
                if !drawn[slot] && feet_line(actor) <= row_bottom {
                    draw_actor(frame, actor, offset);
                    drawn[slot] = true;
                }
            }
        }
        // Anything with its feet below the last row.
        for (slot, actor) in actors.iter().enumerate() {
            if !drawn[slot] {
                draw_actor(frame, actor, offset);
            }
        }
    }

    if debug_overlay {
        for actor in level.actors() {
            frame.draw_rect_outline(actor.world_hitbox().translated(offset), HITBOX_OUTLINE);
        }
    }
}

fn feet_line(actor: &Actor) -> i32 {
    actor.position.y + actor.hitbox().bottom()
}

fn draw_actor(frame: &mut Pixmap, actor: &Actor, offset: Point) {
    let (sprite, src) = match (actor.sprite.as_ref(), actor.current_frame()) {
        (Some(sprite), Some(current)) => (sprite, current.src),
        _ => return,
    };
    let origin = sprite.origin();
    let dst = Point::new(
        actor.position.x + offset.x - origin.x as i32,
        actor.position.y + offset.y - origin.y as i32,
    );
    if actor.shadow {
        frame.blit_tinted(sprite.sheet(), src, dst + SHADOW_OFFSET, SHADOW_TINT);
    }
    frame.blit(sprite.sheet(), src, dst);
}
