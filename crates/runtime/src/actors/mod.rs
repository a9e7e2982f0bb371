//! The built-in actor kinds the shipped levels use.

mod capsule;
mod player;
mod spawner;

pub use capsule::Capsule;
pub use player::Player;
pub use spawner::Spawner;

use crate::level::ActorFactory;

impl ActorFactory {
    /// A registry preloaded with `player`, `capsule`, and `spawner`.
    pub fn with_builtin_kinds() -> Self {
        let mut factory = Self::new();
        factory.register("player", Box::new(player::construct));
        factory.register("capsule", Box::new(capsule::construct));
        factory.register("spawner", Box::new(spawner::construct));
        factory
    }
}
