pub mod actor;
pub mod actors;
pub mod level;
pub mod map;
pub mod math;
pub mod movement;
pub mod render;
pub mod sprite;
pub mod tileset;

pub use actor::{Actor, ActorClass, ActorId, Behavior};
pub use actors::{Capsule, Player, Spawner};
pub use level::{ActorConstructor, ActorFactory, Level, SpawnError};
pub use map::{Map, MapError, MapLayer, Spawn};
pub use math::{Point, Rect, Vec2};
pub use movement::{resolve_move, step_pixel, MoveOutcome};
pub use render::{render_level, Color, Pixmap, PixmapError};
pub use sprite::{Animation, Frame, Sprite};
pub use tileset::{CellFlags, Tileset, TilesetError};
