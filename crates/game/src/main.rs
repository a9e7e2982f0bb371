use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use runtime::{
    render_level, ActorClass, ActorFactory, Color, Level, Map, Pixmap, Point, Rect, Sprite,
    Tileset, Vec2,
};

const LEVEL_JSON: &str = include_str!("demo_level.json");
const TICKS: u32 = 240;
const TICK_SECONDS: f32 = 1.0 / 60.0;
const FRAME_WIDTH: u32 = 128;
const FRAME_HEIGHT: u32 = 96;
const OUTPUT_PATH: &str = "demo_frame.png";
const RNG_SEED: u64 = 0xC0FFEE;

/// The pre-parsed handoff an asset pipeline would normally produce.
#[derive(Debug, Deserialize)]
struct LevelDefinition {
    tileset: Tileset,
    map: Map,
    sprites: HashMap<String, Sprite>,
}

fn main() {
    init_tracing();
    info!("=== demo level run ===");

    if let Err(err) = run() {
        error!(error = %err, "demo_run_failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut definition = parse_level_json(LEVEL_JSON)?;
    definition.tileset.bind_sheet(build_terrain_sheet(
        definition.tileset.cell_size(),
        definition.tileset.cell_count(),
    ));

    let mut level = Level::with_seed(ActorFactory::with_builtin_kinds(), RNG_SEED);
    for (name, mut sprite) in definition.sprites {
        sprite.bind_sheet(build_sprite_sheet(&name, &sprite));
        level.add_sprite(&name, Arc::new(sprite));
    }
    level
        .load(definition.map, definition.tileset)
        .map_err(|err| format!("load level: {err}"))?;

    let player = level
        .first_of_class(ActorClass::PLAYER)
        .map(|actor| actor.id)
        .ok_or_else(|| "level has no player spawn".to_string())?;
    if let Some(actor) = level.actor_mut(player) {
        actor.velocity = Vec2::new(30.0, 18.0);
    }

    for _ in 0..TICKS {
        level.update(TICK_SECONDS);
    }

    let survivor = level
        .actor(player)
        .ok_or_else(|| "player was destroyed during the run".to_string())?;
    info!(
        score = survivor.score,
        health = survivor.health,
        x = survivor.position.x,
        y = survivor.position.y,
        "demo_run_finished"
    );

    let mut frame = Pixmap::new(FRAME_WIDTH, FRAME_HEIGHT);
    frame.fill([24, 24, 32, 255]);
    render_level(&mut frame, &level, Point::ZERO, false);
    frame
        .save_png(Path::new(OUTPUT_PATH))
        .map_err(|err| format!("write frame '{OUTPUT_PATH}': {err}"))?;
    info!(path = OUTPUT_PATH, "demo_frame_written");
    Ok(())
}

fn parse_level_json(raw: &str) -> Result<LevelDefinition, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, LevelDefinition>(&mut deserializer) {
        Ok(definition) => Ok(definition),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse level json: {source}"))
            } else {
                Err(format!("parse level json at {path}: {source}"))
            }
        }
    }
}

/// Stand-in terrain art: one flat color per cell index.
fn build_terrain_sheet(cell_size: Point, cell_count: usize) -> Pixmap {
    const CELL_COLORS: [Color; 6] = [
        [0, 0, 0, 0],         // empty
        [92, 148, 92, 255],   // floor
        [72, 72, 88, 255],    // wall
        [188, 80, 48, 255],   // lava
        [80, 140, 188, 255],  // fountain
        [140, 180, 140, 255], // canopy
    ];
    let mut sheet = Pixmap::new(
        cell_size.x as u32 * cell_count as u32,
        cell_size.y as u32,
    );
    for index in 0..cell_count {
        let color = CELL_COLORS[index.min(CELL_COLORS.len() - 1)];
        sheet.fill_rect(
            Rect::new(index as i32 * cell_size.x, 0, cell_size.x, cell_size.y),
            color,
        );
    }
    sheet
}

/// Stand-in actor art: each frame gets a distinct solid block so the
/// walk cycle is visible in the output.
fn build_sprite_sheet(name: &str, sprite: &Sprite) -> Pixmap {
    let base: Color = match name {
        "player" => [232, 196, 96, 255],
        "capsule" => [216, 96, 160, 255],
        _ => [255, 255, 255, 255],
    };
    let (mut width, mut height) = (0, 0);
    for frame in sprite.frames() {
        width = width.max(frame.src.right());
        height = height.max(frame.src.bottom());
    }
    let mut sheet = Pixmap::new(width.max(1) as u32, height.max(1) as u32);
    for (index, frame) in sprite.frames().iter().enumerate() {
        let shade = base.map(|channel| channel.saturating_sub(12 * index as u8));
        let color = [shade[0], shade[1], shade[2], 255];
        sheet.fill_rect(frame.src, color);
    }
    sheet
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
